// Server message envelopes
use serde::{Deserialize, Serialize};
use serde_json::Value;

const FLAT_KEYS: [&str; 4] = ["info", "warn", "warning", "error"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Warn,
    Error,
}

impl MessageLevel {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "info" => Some(MessageLevel::Info),
            "warn" | "warning" => Some(MessageLevel::Warn),
            "error" => Some(MessageLevel::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

impl Message {
    pub fn new(level: MessageLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Info, text)
    }

    pub fn warn(text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Warn, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Error, text)
    }
}

/// True when the value is a `{message:{...}}` holder or a flat `{info|warn|error: ...}` map.
pub fn is_message(value: &Value) -> bool {
    match value.as_object() {
        Some(obj) => {
            obj.get("message").is_some_and(Value::is_object)
                || FLAT_KEYS.iter().any(|key| obj.contains_key(*key))
        }
        None => false,
    }
}

/// Flattens either envelope shape into a list of messages, top-level message first.
pub fn messages_from_envelope(value: &Value) -> Vec<Message> {
    let mut messages = Vec::new();
    let Some(obj) = value.as_object() else {
        return messages;
    };

    if let Some(holder) = obj.get("message").and_then(Value::as_object) {
        push_level_text(&mut messages, holder.get("level"), holder.get("text"));
        for key in ["otherMessages", "moreMessages"] {
            if let Some(others) = holder.get(key).and_then(Value::as_array) {
                for other in others {
                    push_level_text(&mut messages, other.get("level"), other.get("text"));
                }
            }
        }
        return messages;
    }

    flat_messages(obj)
}

/// Collects the flat `info`/`warn`/`error` fields of an options map.
pub fn flat_messages(obj: &serde_json::Map<String, Value>) -> Vec<Message> {
    let mut messages = Vec::new();
    for key in FLAT_KEYS {
        if let (Some(level), Some(texts)) = (MessageLevel::from_key(key), obj.get(key)) {
            push_texts(&mut messages, level, texts);
        }
    }
    messages
}

fn push_texts(messages: &mut Vec<Message>, level: MessageLevel, texts: &Value) {
    match texts {
        Value::String(text) => messages.push(Message::new(level, text.clone())),
        Value::Array(items) => messages.extend(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(|text| Message::new(level, text)),
        ),
        _ => {}
    }
}

fn push_level_text(messages: &mut Vec<Message>, level: Option<&Value>, text: Option<&Value>) {
    let level = level
        .and_then(Value::as_str)
        .and_then(MessageLevel::from_key)
        .unwrap_or(MessageLevel::Info);
    if let Some(text) = text.and_then(Value::as_str) {
        messages.push(Message::new(level, text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_holder_with_other_messages() {
        let envelope = json!({
            "message": {
                "level": "warn",
                "text": "Order M1001 is on hold",
                "otherMessages": [{"level": "error", "text": "LSN not found"}]
            }
        });

        assert!(is_message(&envelope));
        assert_eq!(
            messages_from_envelope(&envelope),
            vec![
                Message::warn("Order M1001 is on hold"),
                Message::error("LSN not found")
            ]
        );
    }

    #[test]
    fn test_flat_map_with_lists() {
        let envelope = json!({"info": ["Started", "Queued"], "warning": "Low stock"});

        assert!(is_message(&envelope));
        let messages = messages_from_envelope(&envelope);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], Message::info("Started"));
        assert_eq!(messages[2], Message::warn("Low stock"));
    }

    #[test]
    fn test_non_messages() {
        assert!(!is_message(&json!({"order": "M1001"})));
        assert!(!is_message(&json!("text")));
        assert!(messages_from_envelope(&json!({"message": {"text": null}})).is_empty());
    }
}
