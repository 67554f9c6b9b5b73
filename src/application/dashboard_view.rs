// View trait for the UI collaborator that renders panels and messages
use crate::domain::message::Message;
use serde_json::Value;

pub trait DashboardView: Send {
    /// Replace a panel's visible content with an activity's render payload.
    fn render_panel(&mut self, panel: &str, content: &Value);

    fn display_messages(&mut self, messages: &[Message]);

    fn clear_messages(&mut self);

    /// Enable or disable the undo affordance.
    fn set_undo_enabled(&mut self, enabled: bool);
}
