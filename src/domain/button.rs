// Dashboard button domain model
use super::page::PageRequest;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonActivity {
    pub url: String,
    pub panel: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonDefinition {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    pub size: f64,
    pub sequence: i32,
    pub activities: Vec<ButtonActivity>,
}

impl ButtonDefinition {
    pub fn new(id: impl Into<String>, label: impl Into<String>, sequence: i32) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            title: None,
            css: None,
            size: 1.0,
            sequence,
            activities: Vec::new(),
        }
    }

    pub fn with_activity(mut self, panel: impl Into<String>, url: impl Into<String>) -> Self {
        self.activities.push(ButtonActivity {
            url: url.into(),
            panel: panel.into(),
        });
        self
    }

    pub fn page_requests(&self) -> Vec<PageRequest> {
        self.activities
            .iter()
            .map(|a| PageRequest::new(a.panel.clone(), a.url.clone()))
            .collect()
    }
}
