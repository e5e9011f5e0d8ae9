use serde::{Deserialize, Serialize};

/// Static definition of one route hosted by a [`RoutingContext`](super::RoutingContext).
///
/// A definition only describes the route. The owning context starts and
/// stops it; the listener serving it marks it `Stopped` when it exits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDefinition {
    /// Route identifier, unique within its context.
    pub id: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Short human label, the scheme of the consuming endpoint (`rest`,
    /// `direct`, ...) rather than the constant `route` a Camel
    /// `RouteDefinition` reports.
    pub short_name: String,
    /// Endpoint URI the route consumes from.
    pub from_uri: String,
}

impl RouteDefinition {
    /// Build a definition; `short_name` is derived from the scheme of `from_uri`.
    pub fn new(id: impl Into<String>, from_uri: impl Into<String>) -> Self {
        let from_uri = from_uri.into();
        let short_name = from_uri
            .split_once(':')
            .map(|(scheme, _)| scheme)
            .unwrap_or(from_uri.as_str())
            .to_string();

        Self {
            id: id.into(),
            description: None,
            short_name,
            from_uri,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = short_name.into();
        self
    }
}
