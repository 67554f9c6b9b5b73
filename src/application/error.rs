// Dashboard error taxonomy
use crate::application::dashboard_transport::TransportError;
use crate::domain::message::Message;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    #[error("Dashboard function {operation} called with invalid panel \"{panel}\"")]
    InvalidPanel { panel: String, operation: String },

    #[error("{0}")]
    InvalidLoadArgument(String),

    #[error("Invalid activity definition for dashboard. Error: '{reason}' on {locator}. Source: {source_text}")]
    ActivityEvaluation {
        locator: String,
        reason: String,
        source_text: String,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl DashboardError {
    pub fn invalid_panel(panel: Option<&str>, operation: &str) -> Self {
        DashboardError::InvalidPanel {
            panel: panel.unwrap_or("undefined").to_string(),
            operation: operation.to_string(),
        }
    }

    /// How the error is shown in the dashboard's message area.
    pub fn to_message(&self) -> Message {
        Message::error(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_panel_message() {
        let err = DashboardError::invalid_panel(None, "finished()");
        assert_eq!(
            err.to_message().text,
            "Dashboard function finished() called with invalid panel \"undefined\""
        );
    }

    #[test]
    fn test_transport_error_is_transparent() {
        let err: DashboardError = TransportError::Status {
            url: "/undo".to_string(),
            status: 500,
            body: "boom".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Server Request at '/undo' failed with status 500: boom"
        );
    }
}
