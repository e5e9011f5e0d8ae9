//! Route and component introspection
//!
//! [`RegistryQueryService`] turns the live state of an
//! [`ApplicationContext`](crate::engine::ApplicationContext) into
//! [`RouteInfo`] / [`ComponentInfo`] snapshots; [`StartupReporter`] prints
//! them once the connector is up.

pub mod models;
pub mod query;
pub mod reporter;

pub use models::{ComponentInfo, RouteInfo};
pub use query::{derive_bundle_name, ComponentNameError, RegistryQueryService, UNKNOWN_STATUS};
pub use reporter::StartupReporter;
