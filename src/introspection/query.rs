use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::engine::{ApplicationContext, RoutingContext, COMPONENT_BEAN_PREFIX};

use super::models::{ComponentInfo, RouteInfo};

/// Status reported for a route the context has no status for.
pub const UNKNOWN_STATUS: &str = "Unknown";

/// Component bean names that cannot be mapped to a bundle name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComponentNameError {
    #[error("bean name '{0}' does not contain 'camel.component.'")]
    MissingPrefix(String),

    #[error("bean name '{0}' has an empty component id")]
    EmptyId(String),
}

/// Map a component configuration bean name to its bundle name.
///
/// `camel.component.<id>-org...` becomes `camel-<id>`. The shared
/// configuration bean, whose prefix is exactly `camel.component`, maps to
/// `Ok(None)`.
pub fn derive_bundle_name(bean_name: &str) -> Result<Option<String>, ComponentNameError> {
    let head = bean_name.split("-org").next().unwrap_or(bean_name);
    if head == COMPONENT_BEAN_PREFIX {
        return Ok(None);
    }

    let marker = format!("{}.", COMPONENT_BEAN_PREFIX);
    match head.split(marker.as_str()).nth(1) {
        Some("") => Err(ComponentNameError::EmptyId(bean_name.to_string())),
        Some(id) => Ok(Some(format!("camel-{}", id))),
        None => Err(ComponentNameError::MissingPrefix(bean_name.to_string())),
    }
}

/// Read-only queries over the routes and components of an application.
#[derive(Clone)]
pub struct RegistryQueryService {
    context: Arc<dyn ApplicationContext>,
}

impl RegistryQueryService {
    pub fn new(context: Arc<dyn ApplicationContext>) -> Self {
        Self { context }
    }

    /// All route definitions of all routing contexts.
    ///
    /// Contexts are ordered by name (stable, so equal names keep registration
    /// order) and routes by definition order within each context. Failures are
    /// logged and yield an empty result.
    pub fn get_routes(&self) -> Vec<RouteInfo> {
        let mut contexts = match self.context.routing_contexts() {
            Ok(contexts) => contexts,
            Err(e) => {
                error!("Cannot retrieve the list of routing contexts: {}", e);
                return Vec::new();
            }
        };
        contexts.sort_by(|a, b| a.name().cmp(b.name()));

        let mut routes = Vec::new();
        for context in &contexts {
            routes.extend(Self::context_routes(context));
        }

        debug!("Collected {} route(s) from {} context(s)", routes.len(), contexts.len());
        routes
    }

    /// All registered components, skipping the shared configuration bean and
    /// any bean name that does not follow the component naming scheme.
    pub fn list_components(&self) -> Vec<ComponentInfo> {
        self.context
            .component_bean_names()
            .iter()
            .filter_map(|name| match derive_bundle_name(name) {
                Ok(bundle_name) => bundle_name.map(ComponentInfo::new),
                Err(e) => {
                    warn!("Skipping component bean: {}", e);
                    None
                }
            })
            .collect()
    }

    fn context_routes(context: &RoutingContext) -> Vec<RouteInfo> {
        let definitions = match context.route_definitions() {
            Ok(definitions) => definitions,
            Err(e) => {
                error!("Cannot read routes of context '{}': {}", context.name(), e);
                return Vec::new();
            }
        };

        let uptime_millis = context.uptime_millis();
        definitions
            .into_iter()
            .map(|definition| {
                let status = context
                    .route_status(&definition.id)
                    .map(|status| status.to_string())
                    .unwrap_or_else(|| UNKNOWN_STATUS.to_string());

                RouteInfo {
                    id: definition.id,
                    description: definition.description,
                    diagram: String::new(),
                    short_name: definition.short_name,
                    context_name: context.name().to_string(),
                    uptime_millis,
                    status,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::Error;
    use crate::engine::{MockApplicationContext, RouteDefinition, COMMON_CONFIGURATION_BEAN};

    fn context(name: &str, route_ids: &[&str]) -> Arc<RoutingContext> {
        let ctx = RoutingContext::new(name);
        for id in route_ids {
            ctx.add_route(RouteDefinition::new(*id, format!("direct:{}", id))).unwrap();
        }
        Arc::new(ctx)
    }

    fn service_with(mock: MockApplicationContext) -> RegistryQueryService {
        RegistryQueryService::new(Arc::new(mock))
    }

    #[test]
    fn test_derive_bundle_name() {
        assert_eq!(
            derive_bundle_name("camel.component.kafka-org.apache.camel.component").unwrap(),
            Some("camel-kafka".to_string())
        );
        assert_eq!(derive_bundle_name(COMMON_CONFIGURATION_BEAN).unwrap(), None);
        assert_eq!(derive_bundle_name("camel.component").unwrap(), None);
        assert_eq!(
            derive_bundle_name("camel.component.direct").unwrap(),
            Some("camel-direct".to_string())
        );
    }

    #[test]
    fn test_derive_bundle_name_malformed() {
        assert!(matches!(
            derive_bundle_name("spring.datasource-org.springframework.Foo"),
            Err(ComponentNameError::MissingPrefix(_))
        ));
        assert!(matches!(
            derive_bundle_name("camel.component.-org.example.Foo"),
            Err(ComponentNameError::EmptyId(_))
        ));
    }

    #[test]
    fn test_routes_sorted_by_context_name() {
        let mut mock = MockApplicationContext::new();
        mock.expect_routing_contexts()
            .returning(|| Ok(vec![context("B", &["r1"]), context("A", &["r2"])]));

        let routes = service_with(mock).get_routes();
        let pairs: Vec<(&str, &str)> = routes
            .iter()
            .map(|r| (r.context_name.as_str(), r.id.as_str()))
            .collect();
        assert_eq!(pairs, vec![("A", "r2"), ("B", "r1")]);
    }

    #[test]
    fn test_route_fields() {
        let ctx = RoutingContext::new("camel-1");
        ctx.add_route(
            RouteDefinition::new("api-route", "rest:post:/bean").with_description("REST ingress"),
        )
        .unwrap();
        ctx.start().unwrap();
        let ctx = Arc::new(ctx);

        let mut mock = MockApplicationContext::new();
        mock.expect_routing_contexts()
            .returning(move || Ok(vec![Arc::clone(&ctx)]));

        let routes = service_with(mock).get_routes();
        assert_eq!(routes.len(), 1);
        let route = &routes[0];
        assert_eq!(route.id, "api-route");
        assert_eq!(route.description.as_deref(), Some("REST ingress"));
        assert_eq!(route.diagram, "");
        assert_eq!(route.short_name, "rest");
        assert_eq!(route.context_name, "camel-1");
        assert_eq!(route.status, "Started");
    }

    #[test]
    fn test_enumeration_failure_yields_empty() {
        let mut mock = MockApplicationContext::new();
        mock.expect_routing_contexts()
            .times(1)
            .returning(|| Err(Error::registry("engine unavailable")));

        assert!(service_with(mock).get_routes().is_empty());
    }

    #[test]
    fn test_list_components() {
        let mut mock = MockApplicationContext::new();
        mock.expect_component_bean_names().returning(|| {
            vec![
                COMMON_CONFIGURATION_BEAN.to_string(),
                "camel.component.kafka-org.apache.camel.component".to_string(),
                "management.metrics-org.springframework.Metrics".to_string(),
                "camel.component.idscp2-org.example.Idscp2Configuration".to_string(),
            ]
        });

        let bundles: Vec<String> = service_with(mock)
            .list_components()
            .into_iter()
            .map(|c| c.bundle_name)
            .collect();
        assert_eq!(bundles, vec!["camel-kafka", "camel-idscp2"]);
    }

    #[test]
    fn test_list_components_empty() {
        let mut mock = MockApplicationContext::new();
        mock.expect_component_bean_names().returning(Vec::new);
        assert!(service_with(mock).list_components().is_empty());
    }
}
