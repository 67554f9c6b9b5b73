// Registry of named capabilities that activity descriptors refer to
use crate::domain::activity::{ActionFn, ActivityContext, EventHandlerFn, ParametersFn};
use crate::domain::command::SessionCommand;
use crate::domain::event::DashboardEvent;
use crate::domain::message::messages_from_envelope;
use crate::domain::page::Params;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub const FINISHED_ACTION: &str = "dashboard.finished";
pub const SEND_EVENT_ACTION: &str = "dashboard.sendEvent";
pub const MESSAGE_ACTION: &str = "dashboard.message";
pub const DATA_PARAMETERS: &str = "dashboard.data";
pub const FINISH_ON_EVENT: &str = "dashboard.finishOnEvent";

#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    actions: HashMap<String, ActionFn>,
    event_handlers: HashMap<String, EventHandlerFn>,
    parameter_providers: HashMap<String, ParametersFn>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with the generic `dashboard.*` capabilities.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register_action(FINISHED_ACTION, |ctx: &ActivityContext| {
            vec![SessionCommand::finished(ctx.panel.clone())]
        });

        registry.register_action(SEND_EVENT_ACTION, |ctx: &ActivityContext| {
            match serde_json::from_value::<DashboardEvent>(ctx.data["event"].clone()) {
                Ok(event) => vec![SessionCommand::SendEvent(event)],
                Err(e) => {
                    tracing::warn!("{} on {} has no usable data.event: {}", SEND_EVENT_ACTION, ctx.url, e);
                    Vec::new()
                }
            }
        });

        registry.register_action(MESSAGE_ACTION, |ctx: &ActivityContext| {
            let messages = messages_from_envelope(&ctx.data["message"]);
            if messages.is_empty() {
                Vec::new()
            } else {
                vec![SessionCommand::DisplayMessages(messages)]
            }
        });

        registry.register_parameter_provider(DATA_PARAMETERS, |ctx: &ActivityContext| {
            ctx.data.get("params").and_then(Value::as_object).cloned()
        });

        registry.register_event_handler(
            FINISH_ON_EVENT,
            |ctx: &ActivityContext, event: &DashboardEvent| {
                let finish_on = ctx.data.get("finishOn").and_then(Value::as_str);
                if finish_on == Some(event.event_type.as_str()) {
                    vec![SessionCommand::finished(ctx.panel.clone())]
                } else {
                    Vec::new()
                }
            },
        );

        registry
    }

    pub fn register_action<F>(&mut self, name: impl Into<String>, action: F)
    where
        F: Fn(&ActivityContext) -> Vec<SessionCommand> + Send + Sync + 'static,
    {
        self.actions.insert(name.into(), Arc::new(action));
    }

    pub fn register_event_handler<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&ActivityContext, &DashboardEvent) -> Vec<SessionCommand> + Send + Sync + 'static,
    {
        self.event_handlers.insert(name.into(), Arc::new(handler));
    }

    pub fn register_parameter_provider<F>(&mut self, name: impl Into<String>, provider: F)
    where
        F: Fn(&ActivityContext) -> Option<Params> + Send + Sync + 'static,
    {
        self.parameter_providers.insert(name.into(), Arc::new(provider));
    }

    pub fn action(&self, name: &str) -> Option<ActionFn> {
        self.actions.get(name).cloned()
    }

    pub fn event_handler(&self, name: &str) -> Option<EventHandlerFn> {
        self.event_handlers.get(name).cloned()
    }

    pub fn parameter_provider(&self, name: &str) -> Option<ParametersFn> {
        self.parameter_providers.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::command::FinishRequest;
    use crate::domain::message::Message;
    use serde_json::json;

    fn context(data: Value) -> ActivityContext {
        ActivityContext {
            panel: "B".to_string(),
            url: "/order/start".to_string(),
            data,
        }
    }

    #[test]
    fn test_finished_builtin() {
        let registry = CapabilityRegistry::with_builtins();
        let action = registry.action(FINISHED_ACTION).unwrap();

        assert_eq!(
            action(&context(Value::Null)),
            vec![SessionCommand::Finished(FinishRequest::panel("B"))]
        );
    }

    #[test]
    fn test_send_event_builtin() {
        let registry = CapabilityRegistry::with_builtins();
        let action = registry.action(SEND_EVENT_ACTION).unwrap();

        let commands = action(&context(json!({"event": {"type": "ORDER_STARTED", "order": "M1"}})));
        match &commands[..] {
            [SessionCommand::SendEvent(event)] => assert_eq!(event.event_type, "ORDER_STARTED"),
            other => panic!("unexpected commands {:?}", other),
        }
        assert!(action(&context(json!({}))).is_empty());
    }

    #[test]
    fn test_message_builtin() {
        let registry = CapabilityRegistry::with_builtins();
        let action = registry.action(MESSAGE_ACTION).unwrap();

        assert_eq!(
            action(&context(json!({"message": {"info": "Started M1"}}))),
            vec![SessionCommand::DisplayMessages(vec![Message::info("Started M1")])]
        );
    }

    #[test]
    fn test_data_parameters_and_finish_on_event() {
        let registry = CapabilityRegistry::with_builtins();
        let ctx = context(json!({"params": {"order": "M1"}, "finishOn": "ORDER_DONE"}));

        let params = registry.parameter_provider(DATA_PARAMETERS).unwrap()(&ctx).unwrap();
        assert_eq!(params["order"], json!("M1"));

        let handler = registry.event_handler(FINISH_ON_EVENT).unwrap();
        assert!(handler(&ctx, &DashboardEvent::new("OTHER")).is_empty());
        assert_eq!(handler(&ctx, &DashboardEvent::new("ORDER_DONE")).len(), 1);
    }

    #[test]
    fn test_unknown_names() {
        let registry = CapabilityRegistry::new();
        assert!(registry.action(FINISHED_ACTION).is_none());
        assert!(registry.event_handler("missing").is_none());
    }
}
