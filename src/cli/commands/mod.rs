//! CLI command implementations

pub mod config;
pub mod list;
pub mod ping;
pub mod serve;
pub mod version;

use crate::common::error::Result;

/// Common result type for all command operations
pub type CommandResult = Result<()>;
