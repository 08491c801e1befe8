//! S3-compatible object store infrastructure

pub mod adapter;
pub mod key_mapping;

#[cfg(any(test, feature = "test-utils"))]
pub mod fake;

pub use adapter::S3ObjectStoreAdapter;

#[cfg(any(test, feature = "test-utils"))]
pub use fake::FakeObjectStoreAdapter;
