// Activity descriptors and the records materialized from them
use super::command::SessionCommand;
use super::event::DashboardEvent;
use super::page::Params;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Declarative activity definition returned by the content endpoint.
/// Capability fields name entries in the capability registry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ActivityDescriptor {
    #[serde(default)]
    pub display: Option<Value>,
    #[serde(default)]
    pub execute: Option<String>,
    #[serde(default)]
    pub handle_event: Option<String>,
    #[serde(default)]
    pub provide_parameters: Option<String>,
    #[serde(default)]
    pub provide_scan_parameters: Option<String>,
    #[serde(default)]
    pub post_script: Option<String>,
    #[serde(default)]
    pub cache: bool,
    #[serde(default)]
    pub data: Value,
}

/// What a capability sees of the activity that declared it.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityContext {
    pub panel: String,
    pub url: String,
    pub data: Value,
}

pub type ActionFn = Arc<dyn Fn(&ActivityContext) -> Vec<SessionCommand> + Send + Sync>;
pub type EventHandlerFn =
    Arc<dyn Fn(&ActivityContext, &DashboardEvent) -> Vec<SessionCommand> + Send + Sync>;
pub type ParametersFn = Arc<dyn Fn(&ActivityContext) -> Option<Params> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    Execute,
    HandleEvent,
    ProvideParameters,
    ProvideScanParameters,
    PostScript,
}

#[derive(Clone, Default)]
pub struct Capabilities {
    pub execute: Option<ActionFn>,
    pub handle_event: Option<EventHandlerFn>,
    pub provide_parameters: Option<ParametersFn>,
    pub provide_scan_parameters: Option<ParametersFn>,
    pub post_script: Option<ActionFn>,
}

impl Capabilities {
    pub fn declared(&self) -> Vec<Capability> {
        let mut tags = Vec::new();
        if self.execute.is_some() {
            tags.push(Capability::Execute);
        }
        if self.handle_event.is_some() {
            tags.push(Capability::HandleEvent);
        }
        if self.provide_parameters.is_some() {
            tags.push(Capability::ProvideParameters);
        }
        if self.provide_scan_parameters.is_some() {
            tags.push(Capability::ProvideScanParameters);
        }
        if self.post_script.is_some() {
            tags.push(Capability::PostScript);
        }
        tags
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.declared()).finish()
    }
}

#[derive(Debug, Clone)]
pub struct ActivityRecord {
    pub context: ActivityContext,
    pub display: Option<Value>,
    pub capabilities: Capabilities,
    pub cache: bool,
}

impl ActivityRecord {
    /// Activities without a render payload only execute.
    pub fn is_gui(&self) -> bool {
        self.display.is_some()
    }

    pub fn panel(&self) -> &str {
        &self.context.panel
    }

    pub fn url(&self) -> &str {
        &self.context.url
    }

    pub fn execute(&self) -> Vec<SessionCommand> {
        self.capabilities
            .execute
            .as_ref()
            .map(|f| f(&self.context))
            .unwrap_or_default()
    }

    pub fn post_script(&self) -> Vec<SessionCommand> {
        self.capabilities
            .post_script
            .as_ref()
            .map(|f| f(&self.context))
            .unwrap_or_default()
    }

    /// `None` when the activity declares no event handler.
    pub fn handle_event(&self, event: &DashboardEvent) -> Option<Vec<SessionCommand>> {
        self.capabilities
            .handle_event
            .as_ref()
            .map(|f| f(&self.context, event))
    }

    pub fn provide_parameters(&self) -> Option<Params> {
        self.capabilities
            .provide_parameters
            .as_ref()
            .and_then(|f| f(&self.context))
    }

    pub fn provide_scan_parameters(&self) -> Option<Params> {
        self.capabilities
            .provide_scan_parameters
            .as_ref()
            .and_then(|f| f(&self.context))
    }
}
