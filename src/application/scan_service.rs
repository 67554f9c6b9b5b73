// Scan service - keyboard scan buffer and barcode resolution against the server
use crate::application::dashboard_session::DashboardSession;
use crate::domain::event::DashboardEvent;
use crate::domain::message::{Message, is_message, messages_from_envelope};
use serde::Deserialize;
use serde_json::{Map, Value};

pub const DEFAULT_SCAN_URL: &str = "/scan/scan";
pub const BUTTON_PRESS_ACTION: &str = "BUTTON_PRESS";
pub const UNDO_BUTTON: &str = "_UNDO";
pub const TAB_KEY: &str = "Tab";
const TAB_KEY_CODE: u32 = 9;

/// Collects keys typed outside input fields until a Tab submits them as a barcode.
#[derive(Debug, Default)]
pub struct ScanBuffer {
    data: String,
}

impl ScanBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_press(&mut self, key: &str, in_input: bool) {
        if !in_input {
            self.data.push_str(key);
        }
    }

    /// Returns the buffered barcode (and clears it) when Tab is pressed on a non-empty buffer.
    pub fn key_down(&mut self, key: &str) -> Option<String> {
        if key == TAB_KEY && !self.data.is_empty() {
            Some(std::mem::take(&mut self.data))
        } else {
            None
        }
    }

    /// Text scanned so far, for echoing.
    pub fn echo(&self) -> &str {
        &self.data
    }
}

/// Key reported by a keyboard event, falling back to its character code when the
/// key name is missing or `Unidentified`. Code 9 always resolves to `Tab`.
pub fn resolve_key(key: Option<&str>, which: u32) -> String {
    match key {
        Some(key) if key != "Unidentified" => key.to_string(),
        _ if which == TAB_KEY_CODE => TAB_KEY.to_string(),
        _ => char::from_u32(which).map(String::from).unwrap_or_default(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScanResponse {
    #[serde(default)]
    resolved: bool,
    #[serde(default)]
    barcode: String,
    #[serde(default)]
    message_holder: Option<Value>,
    #[serde(default)]
    scan_actions: Vec<Value>,
}

#[derive(Debug, Clone)]
pub struct ScanService {
    scan_url: String,
    params_to_add: String,
}

impl Default for ScanService {
    fn default() -> Self {
        Self::new(DEFAULT_SCAN_URL, "")
    }
}

impl ScanService {
    /// `params_to_add` is appended verbatim to the scan URL (debug flags).
    pub fn new(scan_url: impl Into<String>, params_to_add: impl Into<String>) -> Self {
        Self {
            scan_url: scan_url.into(),
            params_to_add: params_to_add.into(),
        }
    }

    pub fn scan_request(&self, session: &DashboardSession, barcode: &str) -> Value {
        let mut request = Map::new();
        request.insert("barcode".to_string(), Value::String(barcode.to_string()));
        for params in session.provided_scan_parameters() {
            request.extend(params);
        }
        Value::Object(request)
    }

    pub async fn handle_scan(&self, session: &mut DashboardSession, barcode: &str) {
        session.clear_messages();
        let request = self.scan_request(session, barcode);
        let url = format!("{}{}", self.scan_url, self.params_to_add);
        tracing::debug!("handleScan(): resolving {} via {}", barcode, url);

        let transport = session.transport();
        match transport.post(&url, &request).await {
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(response) => self.handle_scan_response(session, &response).await,
                Err(e) => tracing::warn!("handleScan(): response from {} is not JSON: {}", url, e),
            },
            Err(e) => session.report(e.into()),
        }
    }

    pub async fn handle_scan_response(&self, session: &mut DashboardSession, response: &Value) {
        let Some(raw) = response.get("scanResponse") else {
            if is_message(response) {
                session.display_messages(&messages_from_envelope(response));
            }
            return;
        };
        let scan: ScanResponse = match serde_json::from_value(raw.clone()) {
            Ok(scan) => scan,
            Err(e) => {
                tracing::warn!("handleScanResponse(): ignoring malformed scanResponse: {}", e);
                return;
            }
        };

        if let Some(holder) = &scan.message_holder {
            if !holder["message"]["text"].is_null() {
                session.display_messages(&messages_from_envelope(holder));
            }
        }
        if !scan.resolved {
            session.display_messages(&[Message::error(format!(
                "Could not find barcode {}",
                scan.barcode
            ))]);
        }

        for raw_action in scan.scan_actions {
            let action: DashboardEvent = match serde_json::from_value(raw_action.clone()) {
                Ok(action) => action,
                Err(e) => {
                    tracing::warn!("handleScanResponse(): skipping scan action {}: {}", raw_action, e);
                    continue;
                }
            };
            if action.event_type != BUTTON_PRESS_ACTION {
                session.send_event(action).await;
                continue;
            }
            match action.field("button").and_then(Value::as_str) {
                Some(UNDO_BUTTON) => session.undo_action().await,
                Some(button) => session.click_button(button).await,
                None => tracing::warn!("handleScanResponse(): BUTTON_PRESS without a button"),
            }
        }

        session.check_for_undo_actions(raw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::capability_registry::CapabilityRegistry;
    use crate::application::dashboard_session::SessionSettings;
    use crate::application::test_support::ScriptedTransport;
    use crate::domain::button::ButtonDefinition;
    use crate::domain::message::MessageLevel;
    use crate::domain::panel::PanelDefinition;
    use crate::infrastructure::recording_view::RecordingView;
    use serde_json::json;
    use std::sync::Arc;

    async fn session() -> (DashboardSession, Arc<ScriptedTransport>, RecordingView) {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            "/workCenter",
            r#"{"display": {"view": "workCenter"}, "provideScanParameters": "dashboard.data", "data": {"params": {"order": "M1001", "workCenter": "WC1"}}}"#,
        );
        transport.respond("/order/start", r#"{"execute": "dashboard.finished"}"#);
        let view = RecordingView::new();
        let mut session = DashboardSession::new(
            transport.clone(),
            CapabilityRegistry::with_builtins(),
            Box::new(view.clone()),
            SessionSettings::default(),
        );
        session.define_buttons(vec![
            ButtonDefinition::new("start", "Start", 10).with_activity("A", "/order/start"),
        ]);
        session
            .define_panels_and_load(vec![PanelDefinition::new("A", "/workCenter")])
            .await;
        (session, transport, view)
    }

    #[test]
    fn test_buffer_collects_keys_outside_inputs() {
        let mut buffer = ScanBuffer::new();
        for key in ["M", "1", "0"] {
            buffer.key_press(key, false);
        }
        buffer.key_press("x", true);
        assert_eq!(buffer.echo(), "M10");

        assert_eq!(buffer.key_down("Enter"), None);
        assert_eq!(buffer.key_down("Tab"), Some("M10".to_string()));
        assert_eq!(buffer.echo(), "");
        assert_eq!(buffer.key_down("Tab"), None);
    }

    #[test]
    fn test_resolve_key_falls_back_to_code() {
        assert_eq!(resolve_key(Some("a"), 65), "a");
        assert_eq!(resolve_key(Some("Unidentified"), 65), "A");
        assert_eq!(resolve_key(None, 66), "B");
    }

    #[test]
    fn test_tab_key_code_submits_barcode() {
        let mut buffer = ScanBuffer::new();
        buffer.key_press(&resolve_key(None, 83), false);
        buffer.key_press(&resolve_key(Some("N"), 78), false);

        let tab = resolve_key(None, 9);
        assert_eq!(tab, TAB_KEY);
        assert_eq!(resolve_key(Some("Unidentified"), 9), TAB_KEY);
        assert_eq!(buffer.key_down(&tab), Some("SN".to_string()));
    }

    #[tokio::test]
    async fn test_scan_posts_barcode_with_scan_parameters() {
        let (mut session, transport, _view) = session().await;
        transport.respond_post(
            "/scan/scan",
            r#"{"scanResponse": {"resolved": true, "barcode": "SN1"}}"#,
        );
        let service = ScanService::new(DEFAULT_SCAN_URL, "?debug=true");

        service.handle_scan(&mut session, "SN1").await;

        assert_eq!(
            transport.posts(),
            vec![(
                "/scan/scan?debug=true".to_string(),
                json!({"barcode": "SN1", "order": "M1001", "workCenter": "WC1"})
            )]
        );
    }

    #[tokio::test]
    async fn test_unresolved_scan_shows_error() {
        let (mut session, _transport, view) = session().await;

        ScanService::default()
            .handle_scan_response(
                &mut session,
                &json!({"scanResponse": {
                    "resolved": false,
                    "barcode": "XYZ",
                    "messageHolder": {"message": {"level": "info", "text": null}}
                }}),
            )
            .await;

        assert_eq!(view.messages(), vec![Message::error("Could not find barcode XYZ")]);
    }

    #[tokio::test]
    async fn test_scan_actions_drive_session() {
        let (mut session, transport, view) = session().await;

        ScanService::default()
            .handle_scan_response(
                &mut session,
                &json!({"scanResponse": {
                    "resolved": true,
                    "barcode": "M1001",
                    "messageHolder": {"message": {"level": "info", "text": "Order M1001 started"}},
                    "scanActions": [
                        {"type": "BUTTON_PRESS", "button": "start"},
                        {"type": "ORDER_LSN_CHANGE", "order": "M1001"}
                    ],
                    "undoActions": [{"uri": "/order/reverseStart", "json": "{}"}]
                }}),
            )
            .await;

        assert_eq!(
            transport.get_paths().last().map(String::as_str),
            Some("/order/start")
        );
        let types: Vec<String> = session
            .event_history()
            .into_iter()
            .map(|e| e.event_type)
            .collect();
        assert_eq!(types, vec!["BUTTON_PRESSED", "ORDER_LSN_CHANGE"]);
        assert_eq!(session.undo_depth(), 1);
        assert!(view.undo_enabled());
        assert_eq!(view.messages(), Vec::<Message>::new());
    }

    #[tokio::test]
    async fn test_malformed_scan_action_is_skipped() {
        let (mut session, _transport, view) = session().await;

        ScanService::default()
            .handle_scan_response(
                &mut session,
                &json!({"scanResponse": {
                    "resolved": false,
                    "barcode": "SN9",
                    "scanActions": [
                        {"button": "start"},
                        {"type": "ORDER_LSN_CHANGE", "order": "M1001"}
                    ],
                    "undoActions": [{"uri": "/order/reverseStart", "json": "{}"}]
                }}),
            )
            .await;

        assert_eq!(view.messages(), vec![Message::error("Could not find barcode SN9")]);
        let types: Vec<String> = session
            .event_history()
            .into_iter()
            .map(|e| e.event_type)
            .collect();
        assert_eq!(types, vec!["ORDER_LSN_CHANGE"]);
        assert_eq!(session.undo_depth(), 1);
    }

    #[tokio::test]
    async fn test_undo_button_action_runs_undo() {
        let (mut session, transport, _view) = session().await;
        transport.respond_post("/order/reverseStart", "{}");
        session.check_for_undo_actions(&json!({"undoActions": [{"uri": "/order/reverseStart", "json": "{}"}]}));

        ScanService::default()
            .handle_scan_response(
                &mut session,
                &json!({"scanResponse": {
                    "resolved": true,
                    "scanActions": [{"type": "BUTTON_PRESS", "button": "_UNDO"}]
                }}),
            )
            .await;

        assert_eq!(transport.posts()[0].0, "/order/reverseStart");
        assert_eq!(session.undo_depth(), 0);
    }

    #[tokio::test]
    async fn test_plain_message_response_is_displayed() {
        let (mut session, _transport, view) = session().await;

        ScanService::default()
            .handle_scan_response(&mut session, &json!({"message": {"level": "error", "text": "Scan service down"}}))
            .await;
        ScanService::default()
            .handle_scan_response(&mut session, &json!({"order": "M1"}))
            .await;

        assert_eq!(view.messages(), vec![Message::error("Scan service down")]);
    }

    #[tokio::test]
    async fn test_scan_transport_failure_is_reported() {
        let (mut session, _transport, view) = session().await;

        ScanService::default().handle_scan(&mut session, "SN1").await;

        let messages = view.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].level, MessageLevel::Error);
        assert!(messages[0].text.contains("/scan/scan"));
    }
}
