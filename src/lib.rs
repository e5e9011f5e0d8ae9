//! idscp-bridge - IDSCP2 connector with a REST ingress
//!
//! This library hosts the routing engine, the introspection services and the
//! IDSCP2/REST listeners used by the `idscp-bridge` binary.

pub mod cli;
pub mod client;
pub mod common;
pub mod engine;
pub mod introspection;
pub mod protocol;
pub mod security;
pub mod server;

pub use common::{
    config::Config,
    error::{Error, Result},
};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
