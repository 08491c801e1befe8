//! Progress tracking infrastructure

pub mod channel;
pub mod registry;

pub use channel::{coalescing_channel, CoalescingReceiver, CoalescingSender};
pub use registry::ProgressRegistry;
