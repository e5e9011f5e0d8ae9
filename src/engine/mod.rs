//! Routing engine model
//!
//! Routing contexts, their route definitions and lifecycle, the component
//! registry, and the application context that exposes them to the
//! introspection layer.

pub mod application;
pub mod component;
pub mod context;
pub mod route;

pub use application::{AppContext, ApplicationContext};
pub use component::{
    ComponentDescriptor, ComponentRegistry, COMMON_CONFIGURATION_BEAN, COMPONENT_BEAN_PREFIX,
};
pub use context::RoutingContext;
pub use route::RouteDefinition;

#[cfg(test)]
pub use application::MockApplicationContext;
