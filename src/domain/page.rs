// Page requests and locator helpers
use serde::Deserialize;
use serde_json::{Map, Value};

/// Named parameters handed to an activity when it is loaded.
pub type Params = Map<String, Value>;

/// One `{url, panel}` entry of a `load()` call or a button definition.
/// A missing panel is kept so the load can report it for that entry alone.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub panel: Option<String>,
}

impl PageRequest {
    pub fn new(panel: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            panel: Some(panel.into()),
        }
    }

    /// Accepts a single page map or an array of page maps.
    pub fn parse_many(input: &Value) -> Result<Vec<PageRequest>, String> {
        match input {
            Value::Object(_) => serde_json::from_value::<PageRequest>(input.clone())
                .map(|page| vec![page])
                .map_err(|e| format!("load() called with invalid map {}: {}", input, e)),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    serde_json::from_value::<PageRequest>(item.clone())
                        .map_err(|e| format!("load() called with invalid map {}: {}", item, e))
                })
                .collect(),
            other => Err(format!("load() called with invalid map {}", other)),
        }
    }
}

/// Appends `name=value` to a locator. Empty locators are returned untouched.
pub fn add_arg_to_uri(uri: &str, name: &str, value: &str) -> String {
    if uri.is_empty() {
        return uri.to_string();
    }
    let separator = if uri.find('?').is_some_and(|idx| idx > 0) {
        '&'
    } else {
        '?'
    };
    format!("{}{}{}={}", uri, separator, name, urlencoding::encode(value))
}

/// Renders a parameter value the way it should appear in a query string.
pub fn param_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
