// Application state for HTTP handlers
use crate::application::dashboard_session::DashboardSession;
use crate::application::scan_service::{ScanBuffer, ScanService};
use crate::infrastructure::recording_view::RecordingView;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::Mutex;

pub struct AppState {
    pub session: Mutex<DashboardSession>,
    pub view: RecordingView,
    /// In-flight fetch counter, read without waiting on the session lock.
    pub loading: Arc<AtomicUsize>,
    pub scan: ScanService,
    pub scan_buffer: Mutex<ScanBuffer>,
}

impl AppState {
    pub fn new(session: DashboardSession, view: RecordingView, scan: ScanService) -> Self {
        let loading = session.loading_counter();
        Self {
            session: Mutex::new(session),
            view,
            loading,
            scan,
            scan_buffer: Mutex::new(ScanBuffer::new()),
        }
    }
}
