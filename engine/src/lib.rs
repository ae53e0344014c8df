// Engine library root: the price table pipeline and the gRPC service that hosts it.

pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod ordering;
pub mod pipeline;
pub mod services;
pub mod session;

// Generated protobuf code is included by src/services/mod.rs from OUT_DIR.
