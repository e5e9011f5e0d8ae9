use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::error::{Error, Result};

/// Prefix shared by every component configuration bean name.
pub const COMPONENT_BEAN_PREFIX: &str = "camel.component";

/// Name of the shared configuration bean every application context publishes.
/// Its prefix carries no component id.
pub const COMMON_CONFIGURATION_BEAN: &str =
    "camel.component-org.apache.camel.spring.boot.ComponentConfigurationPropertiesCommon";

/// Typed description of a registered integration component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    /// Component identifier, e.g. `idscp2` or `rest`.
    pub id: String,
    /// Fully qualified name of the component's configuration type.
    pub configuration_type: String,
    pub description: String,
}

impl ComponentDescriptor {
    pub fn new(id: impl Into<String>, configuration_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            configuration_type: configuration_type.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Configuration bean name, `camel.component.<id>-<configuration_type>`.
    pub fn bean_name(&self) -> String {
        format!("{}.{}-{}", COMPONENT_BEAN_PREFIX, self.id, self.configuration_type)
    }
}

/// Registry of components keyed by id, populated at registration time.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    components: DashMap<String, ComponentDescriptor>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component. Re-registering an id replaces its descriptor.
    ///
    /// Ids must be non-empty, free of whitespace and must not contain `-org`.
    /// The configuration type must live under `org.` so the bean name splits
    /// back into `camel.component.<id>` at its first `-org`.
    pub fn register(&self, descriptor: ComponentDescriptor) -> Result<()> {
        if descriptor.id.is_empty() || descriptor.id.chars().any(char::is_whitespace) {
            return Err(Error::registry(format!(
                "Invalid component id '{}'",
                descriptor.id
            )));
        }
        if descriptor.id.contains("-org") {
            return Err(Error::registry(format!(
                "Component id '{}' must not contain '-org'",
                descriptor.id
            )));
        }

        let bean_name = descriptor.bean_name();
        let head = bean_name.split("-org").next().unwrap_or(bean_name.as_str());
        if head != format!("{}.{}", COMPONENT_BEAN_PREFIX, descriptor.id) {
            return Err(Error::registry(format!(
                "Configuration type '{}' of component '{}' does not yield bean name prefix 'camel.component.{}'",
                descriptor.configuration_type, descriptor.id, descriptor.id
            )));
        }

        debug!("Registering component '{}'", descriptor.id);
        self.components.insert(descriptor.id.clone(), descriptor);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<ComponentDescriptor> {
        self.components.get(id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// All descriptors, ordered by id.
    pub fn descriptors(&self) -> Vec<ComponentDescriptor> {
        let mut descriptors: Vec<ComponentDescriptor> = self
            .components
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        descriptors.sort_by(|a, b| a.id.cmp(&b.id));
        descriptors
    }
}
