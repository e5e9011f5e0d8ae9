//! REST ingress and introspection endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::introspection::{ComponentInfo, RegistryQueryService, RouteInfo};

/// JSON payload accepted by the ingress route.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GreetingBean {
    pub id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct RestState {
    query: RegistryQueryService,
}

/// Build the REST router: `POST <base_path>/bean`, `GET /api/routes`,
/// `GET /api/components`.
pub fn router(base_path: &str, query: RegistryQueryService) -> Router {
    let bean_path = format!("{}/bean", base_path.trim_end_matches('/'));

    Router::new()
        .route(&bean_path, post(post_bean))
        .route("/api/routes", get(list_routes))
        .route("/api/components", get(list_components))
        .layer(TraceLayer::new_for_http())
        .with_state(RestState { query })
}

async fn post_bean(Json(bean): Json<GreetingBean>) -> (StatusCode, String) {
    info!(">>> {}", bean.id.map(|id| id.to_string()).unwrap_or_else(|| "null".to_string()));
    info!(">>> {}", bean.name.as_deref().unwrap_or("null"));

    (StatusCode::OK, remote_service(&bean))
}

/// Processor of the `direct-route`: the greeting sent back to the caller.
pub fn remote_service(bean: &GreetingBean) -> String {
    format!("Hello {}", bean.name.as_deref().unwrap_or_default())
}

async fn list_routes(State(state): State<RestState>) -> Json<Vec<RouteInfo>> {
    Json(state.query.get_routes())
}

async fn list_components(State(state): State<RestState>) -> Json<Vec<ComponentInfo>> {
    Json(state.query.list_components())
}
