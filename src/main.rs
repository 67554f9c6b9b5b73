// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use tracing_subscriber::EnvFilter;

use crate::application::capability_registry::CapabilityRegistry;
use crate::application::dashboard_session::DashboardSession;
use crate::application::scan_service::ScanService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::http_transport::HttpTransport;
use crate::infrastructure::recording_view::RecordingView;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;
    let dashboard = &config.dashboard;

    // Create transport and view (infrastructure layer)
    let transport = Arc::new(HttpTransport::new(
        config.server.upstream.clone(),
        Duration::from_secs(config.server.request_timeout_secs),
    )?);
    let view = RecordingView::new();

    // Create the session (application layer)
    let mut session = DashboardSession::new(
        transport,
        CapabilityRegistry::with_builtins(),
        Box::new(view.clone()),
        dashboard.session_settings(),
    );
    session.define_buttons(dashboard.button_definitions());
    session
        .define_panels_and_load(dashboard.panel_definitions())
        .await;
    tracing::info!(
        "Dashboard {} ({}) loaded {} panels",
        dashboard.name,
        dashboard.category.as_deref().unwrap_or("uncategorized"),
        dashboard.panels.len()
    );

    let scan = ScanService::new(dashboard.scan_url.clone(), dashboard.scan_params_to_add.clone());
    let state = Arc::new(AppState::new(session, view, scan));

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config.server.listen.parse()?;
    tracing::info!("Starting dashboard-runtime service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
