// Materializes fetched activity descriptors into activity records
use crate::application::capability_registry::CapabilityRegistry;
use crate::application::error::DashboardError;
use crate::domain::activity::{ActivityContext, ActivityDescriptor, ActivityRecord, Capabilities};

#[derive(Clone)]
pub struct ActivityExecutor {
    registry: CapabilityRegistry,
}

impl ActivityExecutor {
    pub fn new(registry: CapabilityRegistry) -> Self {
        Self { registry }
    }

    /// Parse a raw definition and resolve every capability it names.
    /// Nothing is executed here; the session decides when `execute` runs.
    pub fn materialize(
        &self,
        panel: &str,
        source: &str,
        url: &str,
    ) -> Result<ActivityRecord, DashboardError> {
        let evaluation_error = |reason: String| DashboardError::ActivityEvaluation {
            locator: url.to_string(),
            reason,
            source_text: source.to_string(),
        };

        let descriptor: ActivityDescriptor =
            serde_json::from_str(source).map_err(|e| evaluation_error(e.to_string()))?;

        let capabilities = Capabilities {
            execute: resolve(&descriptor.execute, "execute", |name| self.registry.action(name))
                .map_err(&evaluation_error)?,
            handle_event: resolve(&descriptor.handle_event, "handleEvent", |name| {
                self.registry.event_handler(name)
            })
            .map_err(&evaluation_error)?,
            provide_parameters: resolve(&descriptor.provide_parameters, "provideParameters", |name| {
                self.registry.parameter_provider(name)
            })
            .map_err(&evaluation_error)?,
            provide_scan_parameters: resolve(
                &descriptor.provide_scan_parameters,
                "provideScanParameters",
                |name| self.registry.parameter_provider(name),
            )
            .map_err(&evaluation_error)?,
            post_script: resolve(&descriptor.post_script, "postScript", |name| {
                self.registry.action(name)
            })
            .map_err(&evaluation_error)?,
        };

        tracing::debug!("materialize() loaded {} for panel {}", url, panel);

        Ok(ActivityRecord {
            context: ActivityContext {
                panel: panel.to_string(),
                url: url.to_string(),
                data: descriptor.data,
            },
            display: descriptor.display,
            capabilities,
            cache: descriptor.cache,
        })
    }
}

fn resolve<T>(
    name: &Option<String>,
    field: &str,
    lookup: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, String> {
    match name {
        Some(name) => lookup(name)
            .map(Some)
            .ok_or_else(|| format!("{} refers to unknown capability '{}'", field, name)),
        None => Ok(None),
    }
}
