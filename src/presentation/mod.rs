// Presentation layer - HTTP bridge onto the dashboard session
pub mod app_state;
pub mod handlers;
pub mod router;
