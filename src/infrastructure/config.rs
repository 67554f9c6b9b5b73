use crate::application::dashboard_session::SessionSettings;
use crate::application::event_bus::DEFAULT_EVENT_HISTORY;
use crate::application::scan_service::DEFAULT_SCAN_URL;
use crate::application::undo_stack::DEFAULT_UNDO_STACK_SIZE;
use crate::domain::button::{ButtonActivity, ButtonDefinition};
use crate::domain::page::Params;
use crate::domain::panel::PanelDefinition;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Base URL of the application serving activities, undo and scan requests.
    #[serde(default = "default_upstream")]
    pub upstream: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            upstream: default_upstream(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_page_path")]
    pub page_path: String,
    #[serde(default)]
    pub page_query: Params,
    #[serde(default = "default_undo_stack_size")]
    pub undo_stack_size: usize,
    #[serde(default = "default_event_history_size")]
    pub event_history_size: usize,
    #[serde(default = "default_scan_url")]
    pub scan_url: String,
    #[serde(default)]
    pub scan_params_to_add: String,
    #[serde(default)]
    pub panels: Vec<PanelConfig>,
    #[serde(default)]
    pub buttons: Vec<ButtonConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PanelConfig {
    pub name: String,
    #[serde(default)]
    pub default_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ButtonConfig {
    pub id: String,
    pub label: String,
    pub title: Option<String>,
    pub css: Option<String>,
    pub size: Option<f64>,
    pub sequence: i32,
    #[serde(default)]
    pub activities: Vec<ButtonActivityConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ButtonActivityConfig {
    pub url: String,
    pub panel: String,
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_upstream() -> String {
    "http://localhost:8081".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_page_path() -> String {
    "/dashboard".to_string()
}

fn default_undo_stack_size() -> usize {
    DEFAULT_UNDO_STACK_SIZE
}

fn default_event_history_size() -> usize {
    DEFAULT_EVENT_HISTORY
}

fn default_scan_url() -> String {
    DEFAULT_SCAN_URL.to_string()
}

impl DashboardSettings {
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            page_path: self.page_path.clone(),
            page_query: self.page_query.clone(),
            undo_stack_size: self.undo_stack_size,
            event_history_size: self.event_history_size,
        }
    }

    pub fn panel_definitions(&self) -> Vec<PanelDefinition> {
        self.panels
            .iter()
            .map(|p| PanelDefinition::new(p.name.clone(), p.default_url.clone()))
            .collect()
    }

    pub fn button_definitions(&self) -> Vec<ButtonDefinition> {
        self.buttons.iter().cloned().map(ButtonDefinition::from).collect()
    }
}

impl From<ButtonConfig> for ButtonDefinition {
    fn from(config: ButtonConfig) -> Self {
        let mut button = ButtonDefinition::new(config.id, config.label, config.sequence);
        button.title = config.title;
        button.css = config.css;
        if let Some(size) = config.size {
            button.size = size;
        }
        button.activities = config
            .activities
            .into_iter()
            .map(|a| ButtonActivity {
                url: a.url,
                panel: a.panel,
            })
            .collect();
        button
    }
}

/// Reads `config/dashboard.*`, overlaid by `DASHBOARD__SECTION__KEY` environment variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    load_from(config::File::with_name("config/dashboard"))
}

fn load_from<S>(file: S) -> anyhow::Result<AppConfig>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};
    use serde_json::json;

    const SAMPLE: &str = r#"
        [server]
        upstream = "http://mes.local:8080"

        [dashboard]
        name = "OPERATOR_DEFAULT"
        page_path = "/mes/dashboard"
        undo_stack_size = 4

        [dashboard.page_query]
        workcenter = "WC1"

        [[dashboard.panels]]
        name = "A"
        default_url = "/workList"

        [[dashboard.panels]]
        name = "B"

        [[dashboard.buttons]]
        id = "complete"
        label = "Complete"
        sequence = 20
        activities = [{ url = "/order/complete", panel = "B" }]

        [[dashboard.buttons]]
        id = "start"
        label = "Start"
        title = "Start the order"
        size = 1.5
        sequence = 10
        activities = [{ url = "/order/start", panel = "B" }]
    "#;

    #[test]
    fn test_load_applies_defaults() {
        let config = load_from(File::from_str(SAMPLE, FileFormat::Toml)).unwrap();

        assert_eq!(config.server.listen, "0.0.0.0:8080");
        assert_eq!(config.server.upstream, "http://mes.local:8080");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.dashboard.scan_url, "/scan/scan");
        assert_eq!(config.dashboard.event_history_size, 4);

        let settings = config.dashboard.session_settings();
        assert_eq!(settings.page_path, "/mes/dashboard");
        assert_eq!(settings.undo_stack_size, 4);
        assert_eq!(settings.page_query["workcenter"], json!("WC1"));
    }

    #[test]
    fn test_domain_conversions() {
        let config = load_from(File::from_str(SAMPLE, FileFormat::Toml)).unwrap();

        let panels = config.dashboard.panel_definitions();
        assert_eq!(panels[1], PanelDefinition::new("B", ""));

        let buttons = config.dashboard.button_definitions();
        assert_eq!(buttons[0].id, "complete");
        assert_eq!(buttons[1].title.as_deref(), Some("Start the order"));
        assert_eq!(buttons[1].size, 1.5);
        assert_eq!(buttons[1].page_requests()[0].panel.as_deref(), Some("B"));
        assert_eq!(buttons[0].size, 1.0);
    }
}
