// Undo actions returned by the server
use super::event::DashboardEvent;
use serde::{Deserialize, Serialize};

/// One reversal request captured from a server response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoAction {
    /// JSON body of the reversal request, possibly with `&quot;` escaped quotes.
    pub json: String,
    pub uri: String,
    #[serde(default)]
    pub info_msg: Option<String>,
    #[serde(default)]
    pub success_events: Vec<DashboardEvent>,
}

impl UndoAction {
    pub fn request_body(&self) -> String {
        self.json.replace("&quot;", "\"")
    }
}

/// All undo actions from one server response, undone together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UndoBatch {
    pub actions: Vec<UndoAction>,
}

impl UndoBatch {
    pub fn new(actions: Vec<UndoAction>) -> Self {
        Self { actions }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_restores_quotes() {
        let action: UndoAction = serde_json::from_value(json!({
            "uri": "/order/reverseStart",
            "json": "{&quot;order&quot;:&quot;M1001&quot;,&quot;qty&quot;:1.0}",
            "infoMsg": "Reversed start of M1001",
            "successEvents": [{"type": "ORDER_LSN_STATUS_CHANGED", "order": "M1001"}]
        }))
        .unwrap();

        assert_eq!(action.request_body(), r#"{"order":"M1001","qty":1.0}"#);
        assert_eq!(action.success_events[0].event_type, "ORDER_LSN_STATUS_CHANGED");
    }

    #[test]
    fn test_optional_fields_default() {
        let action: UndoAction =
            serde_json::from_value(json!({"uri": "/undo", "json": "{}"})).unwrap();
        assert!(action.info_msg.is_none());
        assert!(action.success_events.is_empty());
    }
}
