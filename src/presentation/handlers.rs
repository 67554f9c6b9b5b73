// HTTP request handlers
use crate::application::dashboard_session::{DashboardSession, SessionSnapshot};
use crate::application::scan_service::{TAB_KEY, resolve_key};
use crate::domain::command::FinishRequest;
use crate::domain::event::DashboardEvent;
use crate::domain::page::Params;
use crate::infrastructure::recording_view::ViewState;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::Ordering;

#[derive(Debug, Serialize)]
pub struct DashboardState {
    pub session: SessionSnapshot,
    pub view: ViewState,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingResponse {
    pub loading_panels: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadBody {
    pub pages: Value,
    #[serde(default)]
    pub extra_params: Vec<Params>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostActivityBody {
    pub panel: String,
    pub url: String,
    #[serde(default)]
    pub data: Params,
    #[serde(default)]
    pub other_data: Params,
}

#[derive(Debug, Deserialize)]
pub struct ParameterBody {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Deserialize)]
pub struct ScanBody {
    pub barcode: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyStroke {
    pub key: Option<String>,
    #[serde(default)]
    pub which: u32,
    #[serde(default)]
    pub in_input: bool,
}

#[derive(Debug, Deserialize)]
pub struct KeysBody {
    pub keys: Vec<KeyStroke>,
}

#[derive(Debug, Serialize)]
pub struct KeysResponse {
    pub echo: String,
    pub scanned: Vec<String>,
    pub state: DashboardState,
}

fn dashboard_state(session: &DashboardSession, state: &AppState) -> DashboardState {
    DashboardState {
        session: session.snapshot(),
        view: state.view.snapshot(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<DashboardState> {
    let session = state.session.lock().await;
    Json(dashboard_state(&session, &state))
}

/// In-flight fetch count; does not wait for the session.
pub async fn get_loading(State(state): State<Arc<AppState>>) -> Json<LoadingResponse> {
    Json(LoadingResponse {
        loading_panels: state.loading.load(Ordering::SeqCst),
    })
}

pub async fn load(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoadBody>,
) -> Json<DashboardState> {
    let mut session = state.session.lock().await;
    session.load(&body.pages, body.extra_params).await;
    Json(dashboard_state(&session, &state))
}

/// Accepts a panel name or `{panel, cancel?, info?|warn?|error?}`.
pub async fn finished(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Json<DashboardState> {
    let mut session = state.session.lock().await;
    session.finished(FinishRequest::from_value(&body)).await;
    Json(dashboard_state(&session, &state))
}

pub async fn send_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<DashboardEvent>,
) -> Json<DashboardState> {
    let mut session = state.session.lock().await;
    session.send_event(event).await;
    Json(dashboard_state(&session, &state))
}

pub async fn click_button(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Json<DashboardState> {
    let mut session = state.session.lock().await;
    session.click_button(&id).await;
    Json(dashboard_state(&session, &state))
}

pub async fn click_button_at(
    Path(index): Path<usize>,
    State(state): State<Arc<AppState>>,
) -> Json<DashboardState> {
    let mut session = state.session.lock().await;
    session.click_button_at(index).await;
    Json(dashboard_state(&session, &state))
}

pub async fn post_activity(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PostActivityBody>,
) -> Json<DashboardState> {
    let mut session = state.session.lock().await;
    session
        .post_activity(&body.data, &body.url, &body.panel, &body.other_data)
        .await;
    Json(dashboard_state(&session, &state))
}

/// Adds a parameter sent with every activity loaded afterwards.
pub async fn add_parameter(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ParameterBody>,
) -> Json<DashboardState> {
    let mut session = state.session.lock().await;
    session.add_activity_parameter(body.name, body.value);
    Json(dashboard_state(&session, &state))
}

pub async fn undo(State(state): State<Arc<AppState>>) -> Json<DashboardState> {
    let mut session = state.session.lock().await;
    session.undo_action().await;
    Json(dashboard_state(&session, &state))
}

pub async fn scan(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ScanBody>,
) -> Json<DashboardState> {
    let mut session = state.session.lock().await;
    state.scan.handle_scan(&mut session, &body.barcode).await;
    Json(dashboard_state(&session, &state))
}

/// Feeds keyboard events into the scan buffer; each Tab that completes a barcode scans it.
pub async fn keys(
    State(state): State<Arc<AppState>>,
    Json(body): Json<KeysBody>,
) -> Json<KeysResponse> {
    let (scanned, echo) = {
        let mut buffer = state.scan_buffer.lock().await;
        let mut scanned = Vec::new();
        for stroke in body.keys {
            let key = resolve_key(stroke.key.as_deref(), stroke.which);
            if key == TAB_KEY {
                scanned.extend(buffer.key_down(&key));
            } else {
                buffer.key_press(&key, stroke.in_input);
            }
        }
        (scanned, buffer.echo().to_string())
    };

    let mut session = state.session.lock().await;
    for barcode in &scanned {
        state.scan.handle_scan(&mut session, barcode).await;
    }
    Json(KeysResponse {
        echo,
        scanned,
        state: dashboard_state(&session, &state),
    })
}
