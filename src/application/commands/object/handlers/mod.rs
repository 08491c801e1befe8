//! Object Command Handlers

pub mod delete_object_handler;

pub use delete_object_handler::*;
