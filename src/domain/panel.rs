// Panel domain model
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelDefinition {
    pub name: String,
    pub default_url: String,
}

impl PanelDefinition {
    pub fn new(name: impl Into<String>, default_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_url: default_url.into(),
        }
    }

    /// Name of the per-panel variable the server uses to address this panel's activity.
    pub fn variable(&self) -> String {
        format!("_{}", self.name)
    }
}

/// Whether the panel's last activity rendered content or only executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PanelMode {
    Gui,
    NonGui,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PanelState {
    Empty,
    Loading,
    Displayed,
    Executed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_name() {
        let panel = PanelDefinition::new("A", "/workList");
        assert_eq!(panel.variable(), "_A");
    }

    #[test]
    fn test_mode_serializes_like_wire_names() {
        assert_eq!(serde_json::to_string(&PanelMode::NonGui).unwrap(), "\"NON_GUI\"");
        assert_eq!(serde_json::to_string(&PanelState::Displayed).unwrap(), "\"DISPLAYED\"");
    }
}
