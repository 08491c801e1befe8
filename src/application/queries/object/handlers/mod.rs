//! Object Query Handlers

pub mod head_object_handler;
pub mod list_objects_handler;

pub use head_object_handler::*;
pub use list_objects_handler::*;
