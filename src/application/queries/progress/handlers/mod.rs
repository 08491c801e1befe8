//! Progress Query Handlers

pub mod subscribe_progress_handler;

pub use subscribe_progress_handler::SubscribeProgressHandler;
