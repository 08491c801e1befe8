//! Generated protobuf code
//!
//! Populated by `build.rs` from `proto/transfer.proto`. The generated
//! module mirrors the proto package name.

#[allow(clippy::all)]
#[allow(warnings)]
pub mod transfer {
    include!("transfer.rs");
}
