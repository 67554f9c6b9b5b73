// Infrastructure layer - Configuration and adapters for the outside world
pub mod config;
pub mod http_transport;
pub mod recording_view;
