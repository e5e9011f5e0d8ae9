use serde::{Deserialize, Serialize};

/// Snapshot of one route definition in one routing context.
///
/// Holds no reference back to the engine; query again for fresh values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteInfo {
    pub id: String,
    pub description: Option<String>,
    /// Reserved for a rendered route diagram, always empty.
    pub diagram: String,
    pub short_name: String,
    pub context_name: String,
    /// Uptime of the owning context.
    pub uptime_millis: u64,
    /// Lifecycle status as reported by the context, e.g. `Started`.
    pub status: String,
}

/// Snapshot of one registered component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInfo {
    /// `camel-<id>`
    pub bundle_name: String,
    pub description: String,
}

impl ComponentInfo {
    pub fn new(bundle_name: impl Into<String>) -> Self {
        Self {
            bundle_name: bundle_name.into(),
            description: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_info_json_shape() {
        let info = RouteInfo {
            id: "api-route".to_string(),
            description: None,
            diagram: String::new(),
            short_name: "rest".to_string(),
            context_name: "camel-1".to_string(),
            uptime_millis: 42,
            status: "Started".to_string(),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["shortName"], "rest");
        assert_eq!(json["contextName"], "camel-1");
        assert_eq!(json["uptimeMillis"], 42);
        assert!(json["description"].is_null());
    }

    #[test]
    fn test_component_info_json_shape() {
        let json = serde_json::to_value(ComponentInfo::new("camel-kafka")).unwrap();
        assert_eq!(json["bundleName"], "camel-kafka");
        assert_eq!(json["description"], "");
    }
}
