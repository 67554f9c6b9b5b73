// Commands activities hand back to the dashboard session
use super::event::DashboardEvent;
use super::message::{Message, flat_messages};
use super::page::{PageRequest, Params};
use serde_json::Value;

/// Arguments of `finished()`: a bare panel name or an options map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FinishRequest {
    pub panel: Option<String>,
    pub cancel: bool,
    pub messages: Vec<Message>,
}

impl FinishRequest {
    pub fn panel(panel: impl Into<String>) -> Self {
        Self {
            panel: Some(panel.into()),
            ..Default::default()
        }
    }

    /// `"A"` or `{panel: "A", cancel?: bool, info?|warn?|error?: text|[text]}`.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(panel) => Self::panel(panel.clone()),
            Value::Object(obj) => Self {
                panel: obj.get("panel").and_then(Value::as_str).map(str::to_string),
                cancel: obj.get("cancel").and_then(Value::as_bool).unwrap_or(false),
                messages: flat_messages(obj),
            },
            _ => Self::default(),
        }
    }
}

impl From<&str> for FinishRequest {
    fn from(panel: &str) -> Self {
        Self::panel(panel)
    }
}

/// Side effects requested by an activity capability. The session queues them and runs
/// them in order once the capability has returned.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Finished(FinishRequest),
    Load {
        pages: Vec<PageRequest>,
        extra_params: Vec<Params>,
    },
    SendEvent(DashboardEvent),
    DisplayMessages(Vec<Message>),
    CheckUndoActions(Value),
    ClickButton(String),
    Undo,
}

impl SessionCommand {
    pub fn finished(panel: impl Into<String>) -> Self {
        SessionCommand::Finished(FinishRequest::panel(panel))
    }
}
