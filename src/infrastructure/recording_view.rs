// In-memory view model of the dashboard screen
use crate::application::dashboard_view::DashboardView;
use crate::domain::message::{Message, MessageLevel};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub panels: BTreeMap<String, Value>,
    pub render_counts: BTreeMap<String, usize>,
    pub messages: Vec<Message>,
    pub undo_enabled: bool,
}

/// Keeps what the dashboard would show. Clones share the same state, so the session can
/// own one handle while the HTTP layer reads another.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    state: Arc<Mutex<ViewState>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ViewState {
        self.lock().clone()
    }

    pub fn rendered(&self, panel: &str) -> Option<Value> {
        self.lock().panels.get(panel).cloned()
    }

    pub fn render_count(&self, panel: &str) -> usize {
        self.lock().render_counts.get(panel).copied().unwrap_or(0)
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    pub fn undo_enabled(&self) -> bool {
        self.lock().undo_enabled
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DashboardView for RecordingView {
    fn render_panel(&mut self, panel: &str, content: &Value) {
        let mut state = self.lock();
        state.panels.insert(panel.to_string(), content.clone());
        *state.render_counts.entry(panel.to_string()).or_insert(0) += 1;
    }

    fn display_messages(&mut self, messages: &[Message]) {
        for message in messages {
            match message.level {
                MessageLevel::Error => tracing::error!("{}", message.text),
                MessageLevel::Warn => tracing::warn!("{}", message.text),
                MessageLevel::Info => tracing::info!("{}", message.text),
            }
        }
        self.lock().messages.extend_from_slice(messages);
    }

    fn clear_messages(&mut self) {
        self.lock().messages.clear();
    }

    fn set_undo_enabled(&mut self, enabled: bool) {
        self.lock().undo_enabled = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clones_share_state() {
        let view = RecordingView::new();
        let mut handle = view.clone();

        handle.render_panel("A", &json!({"view": "workList"}));
        handle.render_panel("A", &json!({"view": "workList"}));
        handle.display_messages(&[Message::info("Started")]);
        handle.set_undo_enabled(true);

        assert_eq!(view.rendered("A"), Some(json!({"view": "workList"})));
        assert_eq!(view.render_count("A"), 2);
        assert_eq!(view.messages(), vec![Message::info("Started")]);
        assert!(view.undo_enabled());

        handle.clear_messages();
        assert!(view.messages().is_empty());
    }
}
