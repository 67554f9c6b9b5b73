// Dashboard session - panel lifecycle, pending activities, events and undo
use crate::application::activity_cache::ActivityCache;
use crate::application::activity_executor::ActivityExecutor;
use crate::application::capability_registry::CapabilityRegistry;
use crate::application::content_fetcher::ContentFetcher;
use crate::application::dashboard_transport::DashboardTransport;
use crate::application::dashboard_view::DashboardView;
use crate::application::error::DashboardError;
use crate::application::event_bus::{self, DEFAULT_EVENT_HISTORY, EventHistory};
use crate::application::pending_queue::PendingQueue;
use crate::application::undo_stack::{DEFAULT_UNDO_STACK_SIZE, UndoStack, collect_undo_actions};
use crate::domain::activity::{ActivityRecord, Capability};
use crate::domain::button::ButtonDefinition;
use crate::domain::command::{FinishRequest, SessionCommand};
use crate::domain::event::{BUTTON_PRESSED, DashboardEvent};
use crate::domain::message::{Message, is_message, messages_from_envelope};
use crate::domain::page::{PageRequest, Params, add_arg_to_uri, param_to_string};
use crate::domain::panel::{PanelDefinition, PanelMode, PanelState};
use crate::domain::undo::UndoAction;
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const UNDO_FALLBACK_MESSAGE: &str = "Undo performed";

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub page_path: String,
    pub page_query: Params,
    pub undo_stack_size: usize,
    pub event_history_size: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            page_path: "/dashboard".to_string(),
            page_query: Params::new(),
            undo_stack_size: DEFAULT_UNDO_STACK_SIZE,
            event_history_size: DEFAULT_EVENT_HISTORY,
        }
    }
}

struct PanelSlot {
    definition: PanelDefinition,
    mode: PanelMode,
    state: PanelState,
    prior_state: PanelState,
    current_url: Option<String>,
    active: Option<ActivityRecord>,
    displaced: Option<ActivityRecord>,
}

impl PanelSlot {
    fn new(definition: PanelDefinition) -> Self {
        Self {
            definition,
            mode: PanelMode::Gui,
            state: PanelState::Empty,
            prior_state: PanelState::Empty,
            current_url: None,
            active: None,
            displaced: None,
        }
    }

    fn begin_loading(&mut self) {
        self.prior_state = self.state;
        self.state = PanelState::Loading;
    }

    fn records(&self) -> impl Iterator<Item = &ActivityRecord> {
        self.active.iter().chain(self.displaced.iter())
    }
}

struct LoadRequest {
    panel: String,
    locator: String,
    extra_params: Vec<Params>,
}

impl LoadRequest {
    fn new(panel: String, locator: String, extra_params: Vec<Params>) -> Self {
        Self {
            panel,
            locator,
            extra_params,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSnapshot {
    pub name: String,
    pub default_url: String,
    pub mode: PanelMode,
    pub state: PanelState,
    pub current_url: Option<String>,
    pub capabilities: Vec<Capability>,
    pub displaced: bool,
    pub pending: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSnapshot {
    pub event: DashboardEvent,
    pub handled_by: usize,
    pub sent_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub panels: Vec<PanelSnapshot>,
    pub buttons: Vec<ButtonDefinition>,
    pub undo_depth: usize,
    pub events: Vec<EventSnapshot>,
    pub cached_activities: usize,
    pub loading_panels: usize,
}

/// One dashboard page view: owns every panel, its activity records and pending queue,
/// plus the activity cache, event history and undo stack.
pub struct DashboardSession {
    panels: Vec<PanelSlot>,
    buttons: Vec<ButtonDefinition>,
    pending: PendingQueue,
    cache: ActivityCache,
    history: EventHistory,
    undo: UndoStack,
    fetcher: ContentFetcher,
    executor: ActivityExecutor,
    view: Box<dyn DashboardView>,
    activity_params: Params,
    commands: VecDeque<SessionCommand>,
}

impl DashboardSession {
    pub fn new(
        transport: Arc<dyn DashboardTransport>,
        registry: CapabilityRegistry,
        view: Box<dyn DashboardView>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            panels: Vec::new(),
            buttons: Vec::new(),
            pending: PendingQueue::new(),
            cache: ActivityCache::new(),
            history: EventHistory::new(settings.event_history_size),
            undo: UndoStack::new(settings.undo_stack_size),
            fetcher: ContentFetcher::new(transport, settings.page_path, settings.page_query),
            executor: ActivityExecutor::new(registry),
            view,
            activity_params: Params::new(),
            commands: VecDeque::new(),
        }
    }

    pub fn define_buttons(&mut self, mut buttons: Vec<ButtonDefinition>) {
        buttons.sort_by_key(|b| b.sequence);
        self.buttons = buttons;
    }

    pub async fn define_panels_and_load(&mut self, panels: Vec<PanelDefinition>) {
        self.panels = panels.into_iter().map(PanelSlot::new).collect();
        self.pending.reset();
        self.reset_to_defaults().await;
    }

    pub async fn reset_to_defaults(&mut self) {
        let requests = self
            .panels
            .iter()
            .map(|slot| {
                LoadRequest::new(
                    slot.definition.name.clone(),
                    slot.definition.default_url.clone(),
                    Vec::new(),
                )
            })
            .collect();
        self.load_panels(requests).await;
        self.drain().await;
    }

    /// Adds a parameter sent to every activity loaded from now on.
    pub fn add_activity_parameter(&mut self, name: impl Into<String>, value: Value) {
        self.activity_params.insert(name.into(), value);
    }

    /// Loads one page map `{url, panel}` or an array of them.
    pub async fn load(&mut self, pages: &Value, extra_params: Vec<Params>) {
        match PageRequest::parse_many(pages) {
            Ok(pages) => self.load_pages(pages, extra_params).await,
            Err(reason) => self.report(DashboardError::InvalidLoadArgument(reason)),
        }
    }

    pub async fn load_pages(&mut self, pages: Vec<PageRequest>, extra_params: Vec<Params>) {
        self.run(SessionCommand::Load {
            pages,
            extra_params,
        })
        .await;
    }

    pub async fn finished(&mut self, request: impl Into<FinishRequest>) {
        self.run(SessionCommand::Finished(request.into())).await;
    }

    pub async fn send_event(&mut self, event: DashboardEvent) {
        self.run(SessionCommand::SendEvent(event)).await;
    }

    /// Presses every button with this id. Unknown ids are ignored.
    pub async fn click_button(&mut self, button_id: &str) {
        self.run(SessionCommand::ClickButton(button_id.to_string())).await;
    }

    pub async fn click_button_at(&mut self, index: usize) {
        self.press_button(index);
        self.drain().await;
    }

    pub async fn undo_action(&mut self) {
        self.run(SessionCommand::Undo).await;
    }

    /// Captures the `undoActions` of a server response as one undo batch.
    pub fn check_for_undo_actions(&mut self, response: &Value) {
        let batch = collect_undo_actions(response);
        if batch.is_empty() {
            return;
        }
        self.view.set_undo_enabled(true);
        self.undo.push(batch);
    }

    /// Posts `data` for an activity, then finishes its panel and processes the response.
    pub async fn post_activity(&mut self, data: &Params, url: &str, panel: &str, other_data: &Params) {
        let mut target = url.to_string();
        for (name, value) in other_data {
            target = add_arg_to_uri(&target, name, &param_to_string(value));
        }

        let transport = self.fetcher.transport();
        match transport.post(&target, &Value::Object(data.clone())).await {
            Ok(text) => {
                self.commands.push_back(SessionCommand::finished(panel));
                match serde_json::from_str::<Value>(&text) {
                    Ok(response) => {
                        if is_message(&response) {
                            self.commands.push_back(SessionCommand::DisplayMessages(
                                messages_from_envelope(&response),
                            ));
                        }
                        self.commands
                            .push_back(SessionCommand::CheckUndoActions(response));
                    }
                    Err(e) => tracing::warn!("postActivity() response from {} is not JSON: {}", target, e),
                }
                self.drain().await;
            }
            Err(e) => self.report(e.into()),
        }
    }

    pub fn display_messages(&mut self, messages: &[Message]) {
        if !messages.is_empty() {
            self.view.display_messages(messages);
        }
    }

    pub fn clear_messages(&mut self) {
        self.view.clear_messages();
    }

    /// `provideParameters` output of every active and displaced activity.
    pub fn current_provided_parameters(&self) -> Vec<Params> {
        self.records()
            .filter_map(ActivityRecord::provide_parameters)
            .collect()
    }

    pub fn provided_scan_parameters(&self) -> Vec<Params> {
        self.records()
            .filter_map(ActivityRecord::provide_scan_parameters)
            .collect()
    }

    pub fn event_history(&self) -> Vec<DashboardEvent> {
        self.history.events()
    }

    pub fn loading_panel_count(&self) -> usize {
        self.fetcher.in_flight().load(Ordering::SeqCst)
    }

    /// Counter of in-flight fetches, readable without holding the session.
    pub fn loading_counter(&self) -> Arc<AtomicUsize> {
        self.fetcher.in_flight()
    }

    pub fn transport(&self) -> Arc<dyn DashboardTransport> {
        self.fetcher.transport()
    }

    pub fn panel_mode(&self, panel: &str) -> Option<PanelMode> {
        self.slot(panel).map(|slot| slot.mode)
    }

    pub fn panel_state(&self, panel: &str) -> Option<PanelState> {
        self.slot(panel).map(|slot| slot.state)
    }

    pub fn active_url(&self, panel: &str) -> Option<String> {
        self.slot(panel)
            .and_then(|slot| slot.active.as_ref())
            .map(|record| record.url().to_string())
    }

    pub fn pending_count(&self, panel: &str) -> usize {
        self.pending.len(panel)
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            panels: self
                .panels
                .iter()
                .map(|slot| PanelSnapshot {
                    name: slot.definition.name.clone(),
                    default_url: slot.definition.default_url.clone(),
                    mode: slot.mode,
                    state: slot.state,
                    current_url: slot.current_url.clone(),
                    capabilities: slot
                        .active
                        .as_ref()
                        .map(|record| record.capabilities.declared())
                        .unwrap_or_default(),
                    displaced: slot.displaced.is_some(),
                    pending: self.pending.peek(&slot.definition.name),
                })
                .collect(),
            buttons: self.buttons.clone(),
            undo_depth: self.undo.len(),
            events: self
                .history
                .recorded()
                .map(|recorded| EventSnapshot {
                    event: recorded.event.clone(),
                    handled_by: recorded.handled_by,
                    sent_at: recorded.sent_at.to_rfc3339(),
                })
                .collect(),
            cached_activities: self.cache.len(),
            loading_panels: self.loading_panel_count(),
        }
    }

    async fn run(&mut self, command: SessionCommand) {
        self.commands.push_back(command);
        self.drain().await;
    }

    /// Commands queued while applying one command are appended and run in turn.
    async fn drain(&mut self) {
        while let Some(command) = self.commands.pop_front() {
            self.apply(command).await;
        }
    }

    async fn apply(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Finished(request) => self.apply_finished(request).await,
            SessionCommand::Load {
                pages,
                extra_params,
            } => self.apply_load(pages, extra_params).await,
            SessionCommand::SendEvent(event) => {
                let follow_up = self.deliver_event(event);
                self.commands.extend(follow_up);
            }
            SessionCommand::DisplayMessages(messages) => self.display_messages(&messages),
            SessionCommand::CheckUndoActions(response) => self.check_for_undo_actions(&response),
            SessionCommand::ClickButton(button_id) => {
                let matching: Vec<usize> = self
                    .buttons
                    .iter()
                    .enumerate()
                    .filter(|(_, b)| b.id == button_id)
                    .map(|(index, _)| index)
                    .collect();
                if matching.is_empty() {
                    tracing::debug!("clickButton(): no button with id {}", button_id);
                }
                for index in matching {
                    self.press_button(index);
                }
            }
            SessionCommand::Undo => self.apply_undo().await,
        }
    }

    fn press_button(&mut self, index: usize) {
        let Some(button) = self.buttons.get(index).cloned() else {
            tracing::debug!("clickButton(): no button at index {}", index);
            return;
        };
        let extra_params = self.current_provided_parameters();
        self.view.clear_messages();

        let event = DashboardEvent::new(BUTTON_PRESSED).with_field(
            "button",
            serde_json::to_value(&button).unwrap_or(Value::Null),
        );
        self.commands.push_back(SessionCommand::Load {
            pages: button.page_requests(),
            extra_params,
        });
        self.commands.push_back(SessionCommand::SendEvent(event));
    }

    async fn apply_load(&mut self, pages: Vec<PageRequest>, extra_params: Vec<Params>) {
        self.pending.forget_extra_params();

        let mut requests = Vec::new();
        for (panel, mut urls) in PendingQueue::group_by_panel(&pages) {
            let panel = match panel {
                Some(name) if self.slot(&name).is_some() => name,
                other => {
                    self.report(DashboardError::invalid_panel(other.as_deref(), "load()"));
                    continue;
                }
            };
            let first = urls.remove(0);
            if !urls.is_empty() {
                self.pending.remember_extra_params(extra_params.clone());
            }
            self.pending.replace(&panel, urls);
            requests.push(LoadRequest::new(panel, first, extra_params.clone()));
        }
        self.load_panels(requests).await;
    }

    async fn apply_finished(&mut self, request: FinishRequest) {
        self.display_messages(&request.messages);

        let Some(slot) = request.panel.as_deref().and_then(|name| self.slot(name)) else {
            self.report(DashboardError::invalid_panel(request.panel.as_deref(), "finished()"));
            return;
        };
        let panel = slot.definition.name.clone();
        let default_url = slot.definition.default_url.clone();
        let mode = slot.mode;

        if request.cancel {
            self.pending.clear(&panel);
            self.load_panels(vec![LoadRequest::new(panel, default_url, Vec::new())])
                .await;
            return;
        }

        if let Some((url, extra_params)) = self.pending.pop(&panel) {
            self.load_panels(vec![LoadRequest::new(panel, url, extra_params)])
                .await;
            return;
        }

        if mode == PanelMode::NonGui {
            tracing::debug!("finished(): panel {} ran a non-GUI activity, nothing to reload", panel);
            return;
        }
        self.load_panels(vec![LoadRequest::new(panel, default_url, Vec::new())])
            .await;
    }

    /// Resolves, fetches (or takes from cache) and materializes one activity per request.
    /// Fetches for different panels run concurrently; results apply in request order.
    async fn load_panels(&mut self, requests: Vec<LoadRequest>) {
        let mut prepared = Vec::new();
        for request in requests {
            if request.locator.is_empty() {
                continue;
            }
            let params = self
                .fetcher
                .build_params(&self.activity_params, &request.extra_params);
            let url = self
                .fetcher
                .build_url(&request.panel, &request.locator, &params);
            let cached = self.cache.get(&url).map(str::to_string);
            if cached.is_some() {
                tracing::trace!("_load(): Using value from cache for url: {}", url);
            }
            if let Some(slot) = self.slot_mut(&request.panel) {
                slot.begin_loading();
            }
            prepared.push((request.panel, url, cached));
        }

        let fetcher = &self.fetcher;
        let results = join_all(prepared.into_iter().map(|(panel, url, cached)| async move {
            let source = match cached {
                Some(source) => Ok((source, true)),
                None => fetcher.fetch(&url).await.map(|source| (source, false)),
            };
            (panel, url, source)
        }))
        .await;

        for (panel, url, source) in results {
            match source {
                Ok((source, from_cache)) => self.apply_source(&panel, &url, &source, from_cache),
                Err(e) => {
                    self.abort_loading(&panel);
                    self.report(e.into());
                }
            }
        }
    }

    fn apply_source(&mut self, panel: &str, url: &str, source: &str, from_cache: bool) {
        tracing::trace!("_load(): loading panel contents for panel {}: {}", panel, source);
        let record = match self.executor.materialize(panel, source, url) {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!("Offending activity source for {}: {}", url, source);
                self.abort_loading(panel);
                self.report(e);
                return;
            }
        };

        if record.cache && !from_cache {
            self.cache.put(url, source);
        }

        if record.is_gui() {
            self.display(record);
        } else {
            self.execute_non_gui(record);
        }
    }

    fn display(&mut self, record: ActivityRecord) {
        let panel = record.panel().to_string();
        if let Some(content) = &record.display {
            self.view.render_panel(&panel, content);
        }
        let post_script = record.post_script();

        if let Some(slot) = self.slot_mut(&panel) {
            slot.mode = PanelMode::Gui;
            slot.state = PanelState::Displayed;
            slot.current_url = Some(record.url().to_string());
            slot.displaced = None;
            slot.active = Some(record);
        }
        self.commands.extend(post_script);
    }

    /// The panel's previous record is displaced while the non-GUI activity runs, then
    /// restored. Events the activity sends are delivered before the restore.
    fn execute_non_gui(&mut self, record: ActivityRecord) {
        let panel = record.panel().to_string();
        let Some(slot) = self.slot_mut(&panel) else {
            return;
        };
        slot.mode = PanelMode::NonGui;
        slot.displaced = slot.active.take();
        slot.active = Some(record.clone());
        tracing::debug!("_load(): Executing {}.execute()", slot.definition.variable());

        let mut produced = record.execute();
        produced.extend(record.post_script());
        let (events, deferred): (Vec<_>, Vec<_>) = produced
            .into_iter()
            .partition(|command| matches!(command, SessionCommand::SendEvent(_)));
        for command in events {
            if let SessionCommand::SendEvent(event) = command {
                let follow_up = self.deliver_event(event);
                self.commands.extend(follow_up);
            }
        }
        self.commands.extend(deferred);

        if let Some(slot) = self.slot_mut(&panel) {
            slot.active = slot.displaced.take();
            slot.state = PanelState::Executed;
        }
    }

    fn abort_loading(&mut self, panel: &str) {
        if let Some(slot) = self.slot_mut(panel) {
            slot.state = slot.prior_state;
        }
    }

    fn deliver_event(&mut self, event: DashboardEvent) -> Vec<SessionCommand> {
        tracing::debug!(
            "sendEvent(): Sending event: {}",
            serde_json::to_string(&event).unwrap_or_default()
        );
        let (handled, commands) = event_bus::deliver(&event, self.records());
        if handled > 0 {
            tracing::debug!("sendEvent(): Sent event to {} handler functions.", handled);
        }
        self.history.push(event, handled);
        commands
    }

    async fn apply_undo(&mut self) {
        if let Some(batch) = self.undo.pop() {
            self.view.clear_messages();

            let mut requests = Vec::new();
            for action in batch.actions {
                match serde_json::from_str::<Value>(&action.request_body()) {
                    Ok(body) => requests.push((action, body)),
                    Err(e) => {
                        tracing::warn!("undoAction(): invalid request body for {}: {}", action.uri, e);
                        self.display_messages(&[Message::error(format!(
                            "Invalid undo request for {}: {}",
                            action.uri, e
                        ))]);
                    }
                }
            }

            let transport = self.fetcher.transport();
            let results = join_all(
                requests
                    .iter()
                    .map(|(action, body)| transport.post(&action.uri, body)),
            )
            .await;

            for ((action, _), result) in requests.into_iter().zip(results) {
                match result {
                    Ok(text) => self.undo_succeeded(action, &text),
                    Err(e) => self.report(e.into()),
                }
            }
        }

        if self.undo.is_empty() {
            self.view.set_undo_enabled(false);
        }
    }

    fn undo_succeeded(&mut self, action: UndoAction, response_text: &str) {
        if let Ok(response) = serde_json::from_str::<Value>(response_text) {
            if is_message(&response) {
                self.display_messages(&messages_from_envelope(&response));
            }
        }
        let text = action
            .info_msg
            .unwrap_or_else(|| UNDO_FALLBACK_MESSAGE.to_string());
        self.display_messages(&[Message::info(text)]);
        self.commands
            .extend(action.success_events.into_iter().map(SessionCommand::SendEvent));
    }

    /// Logs the error and shows it in the message area.
    pub fn report(&mut self, err: DashboardError) {
        tracing::error!("{}", err);
        self.view.display_messages(&[err.to_message()]);
    }

    fn records(&self) -> impl Iterator<Item = &ActivityRecord> {
        self.panels.iter().flat_map(|slot| slot.records())
    }

    fn slot(&self, panel: &str) -> Option<&PanelSlot> {
        self.panels.iter().find(|slot| slot.definition.name == panel)
    }

    fn slot_mut(&mut self, panel: &str) -> Option<&mut PanelSlot> {
        self.panels
            .iter_mut()
            .find(|slot| slot.definition.name == panel)
    }
}
