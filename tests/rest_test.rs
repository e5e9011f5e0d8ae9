//! RESTイングレステスト

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use idscp_bridge::introspection::{ComponentInfo, RouteInfo};
use idscp_bridge::server::{rest, Connector};
use idscp_bridge::Config;
use tower::ServiceExt;

fn app() -> axum::Router {
    let connector = Connector::new(Config::default()).unwrap();
    rest::router(&connector.config().rest.base_path, connector.query_service())
}

fn post_bean(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/camel-example-api/bean")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_post_bean_greets_by_name() {
    let response = app()
        .oneshot(post_bean(r#"{"id": 1, "name": "World"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Hello World");
}

#[tokio::test]
async fn test_post_bean_without_name() {
    let response = app().oneshot(post_bean(r#"{"id": 7}"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Hello ");
}

#[tokio::test]
async fn test_post_bean_rejects_non_json() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/camel-example-api/bean")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("name=World"))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_list_routes_endpoint() {
    let request = Request::builder()
        .uri("/api/routes")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let routes: Vec<RouteInfo> = serde_json::from_str(&body_string(response).await).unwrap();
    let ids: Vec<&str> = routes.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["api-route", "direct-route", "idscp2-server"]);
}

#[tokio::test]
async fn test_list_components_endpoint() {
    let request = Request::builder()
        .uri("/api/components")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let components: Vec<ComponentInfo> =
        serde_json::from_str(&body_string(response).await).unwrap();
    let mut bundles: Vec<String> = components.into_iter().map(|c| c.bundle_name).collect();
    bundles.sort();
    assert_eq!(bundles, vec!["camel-direct", "camel-idscp2", "camel-rest"]);
}
