use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::common::error::{Error, Result};

use super::component::{ComponentRegistry, COMMON_CONFIGURATION_BEAN};
use super::context::RoutingContext;

/// What the introspection layer needs from the hosting application.
#[cfg_attr(test, mockall::automock)]
pub trait ApplicationContext: Send + Sync {
    /// Every routing context known to the application, in registration order.
    fn routing_contexts(&self) -> Result<Vec<Arc<RoutingContext>>>;

    /// Names of all component configuration beans.
    fn component_bean_names(&self) -> Vec<String>;
}

/// In-process application context holding routing contexts and components.
#[derive(Debug, Default)]
pub struct AppContext {
    contexts: RwLock<Vec<Arc<RoutingContext>>>,
    components: ComponentRegistry,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a routing context and hand back the shared handle.
    pub fn add_routing_context(&self, context: RoutingContext) -> Result<Arc<RoutingContext>> {
        let context = Arc::new(context);
        self.contexts
            .write()
            .map_err(|_| Error::registry("routing context list is poisoned"))?
            .push(Arc::clone(&context));
        debug!("Registered routing context '{}'", context.name());
        Ok(context)
    }

    /// First routing context with the given name.
    pub fn routing_context(&self, name: &str) -> Option<Arc<RoutingContext>> {
        self.contexts
            .read()
            .ok()?
            .iter()
            .find(|context| context.name() == name)
            .cloned()
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }
}

impl ApplicationContext for AppContext {
    fn routing_contexts(&self) -> Result<Vec<Arc<RoutingContext>>> {
        self.contexts
            .read()
            .map(|contexts| contexts.clone())
            .map_err(|_| Error::registry("routing context list is poisoned"))
    }

    fn component_bean_names(&self) -> Vec<String> {
        std::iter::once(COMMON_CONFIGURATION_BEAN.to_string())
            .chain(self.components.descriptors().iter().map(|d| d.bean_name()))
            .collect()
    }
}
