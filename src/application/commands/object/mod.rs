//! Object Commands - Write operations on artifacts already in the object store

pub mod delete_object;

pub mod handlers;

pub use delete_object::*;
