//! Connector bootstrap
//!
//! [`Connector`] wires the routing context, the component registry, the
//! IDSCP2 listener and the REST ingress together.

pub mod idscp;
pub mod rest;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_rustls::TlsAcceptor;
use tracing::{info, warn};

use crate::common::config::Config;
use crate::common::error::{Error, Result};
use crate::common::types::RouteStatus;
use crate::engine::{AppContext, ComponentDescriptor, RouteDefinition, RoutingContext};
use crate::introspection::{RegistryQueryService, StartupReporter};
use crate::protocol::MessageCodec;
use crate::security::TlsServerConfig;

pub use idscp::{IdscpServer, PongHandler};
pub use rest::GreetingBean;

pub const API_ROUTE_ID: &str = "api-route";
pub const DIRECT_ROUTE_ID: &str = "direct-route";
pub const IDSCP_ROUTE_ID: &str = "idscp2-server";

/// The connector's routing context and component registry.
pub struct Connector {
    config: Config,
    app: Arc<AppContext>,
    context: Arc<RoutingContext>,
}

impl Connector {
    /// Register the routes and components described by `config`. No socket
    /// is bound and no TLS material is read here.
    pub fn new(config: Config) -> Result<Self> {
        let app = Arc::new(AppContext::new());
        let context = app.add_routing_context(RoutingContext::new(config.context.name.clone()))?;

        for definition in route_definitions(&config) {
            context.add_route(definition)?;
        }
        for descriptor in component_descriptors() {
            app.components().register(descriptor)?;
        }

        Ok(Self {
            config,
            app,
            context,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn application_context(&self) -> Arc<AppContext> {
        Arc::clone(&self.app)
    }

    pub fn routing_context(&self) -> Arc<RoutingContext> {
        Arc::clone(&self.context)
    }

    pub fn query_service(&self) -> RegistryQueryService {
        RegistryQueryService::new(self.application_context())
    }

    /// Load the TLS identity and bind both listeners.
    pub async fn bind(self) -> Result<BoundConnector> {
        info!(
            "Loading TLS identity (alias {}) for context '{}'",
            self.config.tls.cert_alias, self.config.context.name
        );
        let acceptor = TlsServerConfig::new(&self.config.tls)?.acceptor();

        let idscp_listener = TcpListener::bind(self.config.idscp_addr())
            .await
            .map_err(|e| Error::network(format!("Failed to bind IDSCP2 listener on {}: {}", self.config.idscp_addr(), e)))?;
        let rest_listener = TcpListener::bind(self.config.rest_addr())
            .await
            .map_err(|e| Error::network(format!("Failed to bind REST listener on {}: {}", self.config.rest_addr(), e)))?;

        Ok(BoundConnector {
            connector: self,
            acceptor,
            idscp_listener,
            rest_listener,
        })
    }

    /// Bind, start, report and serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        self.bind().await?.run(shutdown).await
    }
}

/// A connector whose listeners are bound but not yet serving.
pub struct BoundConnector {
    connector: Connector,
    acceptor: TlsAcceptor,
    idscp_listener: TcpListener,
    rest_listener: TcpListener,
}

impl BoundConnector {
    pub fn idscp_addr(&self) -> Result<SocketAddr> {
        Ok(self.idscp_listener.local_addr()?)
    }

    pub fn rest_addr(&self) -> Result<SocketAddr> {
        Ok(self.rest_listener.local_addr()?)
    }

    pub fn routing_context(&self) -> Arc<RoutingContext> {
        self.connector.routing_context()
    }

    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        let BoundConnector {
            connector,
            acceptor,
            idscp_listener,
            rest_listener,
        } = self;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let query = connector.query_service();

        // ルートはリスナーが処理を始める前にStartedにする
        connector.context.start()?;
        info!("Routing context '{}' started", connector.context.name());

        let idscp_server = IdscpServer::new(
            acceptor,
            Arc::new(PongHandler),
            MessageCodec::new(connector.config.idscp.max_message_size),
        );
        let idscp_task = tokio::spawn(serve_routes(
            connector.routing_context(),
            &[IDSCP_ROUTE_ID],
            idscp_server.serve(idscp_listener, shutdown_rx.clone()),
        ));

        let router = rest::router(&connector.config.rest.base_path, query.clone());
        let mut rest_shutdown = shutdown_rx;
        let rest_task = tokio::spawn(serve_routes(
            connector.routing_context(),
            &[API_ROUTE_ID, DIRECT_ROUTE_ID],
            async move {
                axum::serve(rest_listener, router)
                    .with_graceful_shutdown(async move {
                        let _ = rest_shutdown.changed().await;
                    })
                    .await
            },
        ));

        StartupReporter::new(query).report_to_stdout();

        shutdown.await;
        info!("Shutting down connector");
        let _ = shutdown_tx.send(true);

        match idscp_task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("IDSCP2 listener stopped with error: {}", e),
            Err(e) => warn!("IDSCP2 listener task failed: {}", e),
        }
        match rest_task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("REST listener stopped with error: {}", e),
            Err(e) => warn!("REST listener task failed: {}", e),
        }

        connector.context.stop()?;
        info!("Routing context '{}' stopped", connector.context.name());
        Ok(())
    }
}

/// Drive a listener and mark the routes it serves `Stopped` once it exits.
async fn serve_routes<F, E>(
    context: Arc<RoutingContext>,
    route_ids: &'static [&'static str],
    serving: F,
) -> std::result::Result<(), E>
where
    F: Future<Output = std::result::Result<(), E>>,
{
    let result = serving.await;

    for route_id in route_ids {
        if let Err(e) = context.set_route_status(route_id, RouteStatus::Stopped) {
            warn!("Cannot mark route '{}' stopped: {}", route_id, e);
        }
    }

    result
}

fn route_definitions(config: &Config) -> Vec<RouteDefinition> {
    let base_path = config.rest.base_path.trim_end_matches('/');
    vec![
        RouteDefinition::new(API_ROUTE_ID, format!("rest:post:{}/bean", base_path))
            .with_description("Accepts greeting beans over REST"),
        RouteDefinition::new(DIRECT_ROUTE_ID, "direct:remoteService")
            .with_description("Builds the greeting reply"),
        RouteDefinition::new(
            IDSCP_ROUTE_ID,
            format!("idscp2server://{}", config.idscp_addr()),
        )
        .with_description("Answers IDSCP2 messages with PONG"),
    ]
}

fn component_descriptors() -> Vec<ComponentDescriptor> {
    vec![
        ComponentDescriptor::new(
            "idscp2",
            "org.apache.camel.component.idscp2.springboot.Idscp2ComponentConfiguration",
        )
        .with_description("IDSCP2 server and client endpoints"),
        ComponentDescriptor::new(
            "direct",
            "org.apache.camel.component.direct.springboot.DirectComponentConfiguration",
        )
        .with_description("Synchronous in-process dispatch"),
        ComponentDescriptor::new(
            "rest",
            "org.apache.camel.component.rest.springboot.RestComponentConfiguration",
        )
        .with_description("REST DSL ingress"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspection::derive_bundle_name;

    #[test]
    fn test_connector_registers_routes_and_components() {
        let connector = Connector::new(Config::default()).unwrap();

        let routes = connector.query_service().get_routes();
        let ids: Vec<&str> = routes.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![API_ROUTE_ID, DIRECT_ROUTE_ID, IDSCP_ROUTE_ID]);

        let short_names: Vec<&str> = routes.iter().map(|r| r.short_name.as_str()).collect();
        assert_eq!(short_names, vec!["rest", "direct", "idscp2server"]);
        assert!(routes.iter().all(|r| r.context_name == "camel-1"));
        assert!(routes.iter().all(|r| r.status == "Stopped"));

        let mut bundles: Vec<String> = connector
            .query_service()
            .list_components()
            .into_iter()
            .map(|c| c.bundle_name)
            .collect();
        bundles.sort();
        assert_eq!(bundles, vec!["camel-direct", "camel-idscp2", "camel-rest"]);
    }

    #[test]
    fn test_context_name_from_config() {
        let mut config = Config::default();
        config.context.name = "connector-context".to_string();
        let connector = Connector::new(config).unwrap();

        assert_eq!(connector.routing_context().name(), "connector-context");
        assert_eq!(
            connector.routing_context().route_status(API_ROUTE_ID),
            Some(RouteStatus::Stopped)
        );
    }

    #[test]
    fn test_component_bean_names_round_trip() {
        for descriptor in component_descriptors() {
            assert_eq!(
                derive_bundle_name(&descriptor.bean_name()).unwrap(),
                Some(format!("camel-{}", descriptor.id)),
                "bean name {}",
                descriptor.bean_name()
            );
        }
    }

    #[test]
    fn test_startup_report_of_default_connector() {
        let connector = Connector::new(Config::default()).unwrap();
        let mut out = Vec::new();
        StartupReporter::new(connector.query_service()).report(&mut out);

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Route: rest\n\
             Route: direct\n\
             Route: idscp2server\n\
             Component: camel-direct\n\
             Component: camel-idscp2\n\
             Component: camel-rest\n"
        );
    }

    #[tokio::test]
    async fn test_listener_exit_stops_its_routes() {
        let connector = Connector::new(Config::default()).unwrap();
        let context = connector.routing_context();
        context.start().unwrap();

        let result = serve_routes(Arc::clone(&context), &[IDSCP_ROUTE_ID], async {
            Err::<(), Error>(Error::network("listener closed"))
        })
        .await;
        assert!(result.is_err());

        assert_eq!(context.route_status(IDSCP_ROUTE_ID), Some(RouteStatus::Stopped));
        assert_eq!(context.route_status(API_ROUTE_ID), Some(RouteStatus::Started));
        assert_eq!(context.route_status(DIRECT_ROUTE_ID), Some(RouteStatus::Started));
    }

    #[tokio::test]
    async fn test_bind_fails_without_tls_material() {
        let mut config = Config::default();
        config.tls.cert_file = Some("/nonexistent/server.crt".to_string());
        config.tls.key_file = Some("/nonexistent/server.key".to_string());

        let connector = Connector::new(config).unwrap();
        assert!(matches!(connector.bind().await, Err(Error::Tls(_))));
    }
}
