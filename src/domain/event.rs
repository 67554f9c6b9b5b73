// Application-level events broadcast between panel activities
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const BUTTON_PRESSED: &str = "BUTTON_PRESSED";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl DashboardEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flattened_round_trip_shape() {
        let event: DashboardEvent =
            serde_json::from_value(json!({"type": "ORDER_LSN_CHANGED", "order": "M1001"})).unwrap();
        assert_eq!(event.event_type, "ORDER_LSN_CHANGED");
        assert_eq!(event.field("order"), Some(&json!("M1001")));

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value, json!({"type": "ORDER_LSN_CHANGED", "order": "M1001"}));
    }
}
