// Domain layer - Dashboard model types
pub mod activity;
pub mod button;
pub mod command;
pub mod event;
pub mod message;
pub mod page;
pub mod panel;
pub mod undo;
