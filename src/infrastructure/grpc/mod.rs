//! gRPC server implementation

pub mod composition;
pub mod conversions;
pub mod generated;
pub mod logging;
pub mod server;
pub mod services;
pub mod middleware;

pub use server::*;
pub use services::*;
pub use middleware::*;
pub use logging::*;
pub use conversions::*;
