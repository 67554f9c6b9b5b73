// Event delivery to panel activities and the trailing event history
use crate::domain::activity::ActivityRecord;
use crate::domain::command::SessionCommand;
use crate::domain::event::DashboardEvent;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

pub const DEFAULT_EVENT_HISTORY: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub event: DashboardEvent,
    pub handled_by: usize,
    pub sent_at: DateTime<Utc>,
}

/// Delivers an event to every record that declares a handler, in the order given.
/// Returns the number of handlers invoked and the commands they produced.
pub fn deliver<'a>(
    event: &DashboardEvent,
    records: impl IntoIterator<Item = &'a ActivityRecord>,
) -> (usize, Vec<SessionCommand>) {
    let mut handled = 0;
    let mut commands = Vec::new();
    for record in records {
        if let Some(produced) = record.handle_event(event) {
            tracing::debug!(
                "sendEvent(): Delivering event {} to panel {}. Url: {}",
                event.event_type,
                record.panel(),
                record.url()
            );
            handled += 1;
            commands.extend(produced);
        }
    }
    (handled, commands)
}

/// Bounded history of the most recent events, newest last. Diagnostics only.
#[derive(Debug)]
pub struct EventHistory {
    events: VecDeque<RecordedEvent>,
    capacity: usize,
}

impl EventHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, event: DashboardEvent, handled_by: usize) {
        self.events.push_back(RecordedEvent {
            event,
            handled_by,
            sent_at: Utc::now(),
        });
        while self.events.len() > self.capacity {
            self.events.pop_front();
        }
    }

    pub fn events(&self) -> Vec<DashboardEvent> {
        self.events.iter().map(|r| r.event.clone()).collect()
    }

    pub fn recorded(&self) -> impl Iterator<Item = &RecordedEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for EventHistory {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_HISTORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::activity::{ActivityContext, Capabilities, EventHandlerFn};
    use serde_json::Value;
    use std::sync::Arc;

    fn record(panel: &str, handler: Option<EventHandlerFn>) -> ActivityRecord {
        ActivityRecord {
            context: ActivityContext {
                panel: panel.to_string(),
                url: format!("/{}", panel),
                data: Value::Null,
            },
            display: None,
            capabilities: Capabilities {
                handle_event: handler,
                ..Default::default()
            },
            cache: false,
        }
    }

    #[test]
    fn test_history_keeps_last_four() {
        let mut history = EventHistory::default();
        for i in 1..=6 {
            history.push(DashboardEvent::new(format!("E{}", i)), 0);
        }

        let types: Vec<String> = history.events().into_iter().map(|e| e.event_type).collect();
        assert_eq!(types, vec!["E3", "E4", "E5", "E6"]);
    }

    #[test]
    fn test_deliver_skips_records_without_handler() {
        let handler: EventHandlerFn =
            Arc::new(|ctx, _event| vec![SessionCommand::finished(ctx.panel.clone())]);
        let records = vec![record("A", Some(handler)), record("B", None)];

        let (handled, commands) = deliver(&DashboardEvent::new("PING"), &records);
        assert_eq!(handled, 1);
        assert_eq!(commands, vec![SessionCommand::finished("A")]);
    }
}
