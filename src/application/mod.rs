// Application layer - Dashboard session and the services around it
pub mod activity_cache;
pub mod activity_executor;
pub mod capability_registry;
pub mod content_fetcher;
pub mod dashboard_session;
pub mod dashboard_transport;
pub mod dashboard_view;
pub mod error;
pub mod event_bus;
pub mod pending_queue;
pub mod scan_service;
pub mod undo_stack;

#[cfg(test)]
pub mod test_support;
