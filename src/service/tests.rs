//! End-to-end tests driving the transport service against controller trees.

use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use regex::Regex;

use crate::config::RunMode;
use crate::controller::error_handler::ErrorHandler;
use crate::controller::fallback::Fallback;
use crate::controller::method::MethodMap;
use crate::controller::router::{Route, Router};
use crate::controller::static_content::StaticContent;
use crate::core::{Context, ControllerRef, FnController, HttpError};
use crate::service::HttpService;

fn request(method: &str, path: &str) -> http::Request<Full<Bytes>> {
    http::Request::builder()
        .method(method)
        .uri(path)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

async fn body_string(resp: http::Response<Full<Bytes>>) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

fn route(pattern: &str, controller: ControllerRef) -> Route {
    Route {
        pattern: Regex::new(pattern).unwrap(),
        controller,
    }
}

#[tokio::test]
async fn test_single_route_serves_static_content() {
    let root = Router::new(vec![route("foo/", Arc::new(StaticContent::new("hi")))]);
    let service = HttpService::new(Arc::new(root), RunMode::Resilient);

    let resp = service.handle_request(request("GET", "/foo/")).await;
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(body_string(resp).await, "hi");
}

#[tokio::test]
async fn test_unrouted_request_gets_driver_404_page() {
    let root = Router::new(Vec::new());
    let service = HttpService::new(Arc::new(root), RunMode::Resilient);

    let resp = service.handle_request(request("GET", "/nope")).await;
    assert_eq!(resp.status().as_u16(), 404);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/html; charset=utf-8"
    );
    assert!(body_string(resp).await.contains("404 Not Found"));
}

#[tokio::test]
async fn test_error_handler_absorbs_method_not_allowed() {
    let mut map = std::collections::HashMap::new();
    map.insert(http::Method::GET, Arc::new(StaticContent::new("ok")) as ControllerRef);
    let method_map = MethodMap::new(map, None);
    let root = ErrorHandler::new(
        Some(std::collections::HashSet::from([500])),
        Arc::new(method_map),
    );
    let service = HttpService::new(Arc::new(root), RunMode::Resilient);

    // POST is not mapped: 405, absorbed (405 is not in {500}) and rendered.
    let resp = service.handle_request(request("POST", "/")).await;
    assert_eq!(resp.status().as_u16(), 405);
    assert!(body_string(resp).await.contains("405 Method Not Allowed"));
}

#[tokio::test]
async fn test_success_without_finished_response_becomes_504() {
    let root = FnController::new(|_: &mut Context| Ok(()));
    let service = HttpService::new(root, RunMode::Resilient);

    let resp = service.handle_request(request("GET", "/")).await;
    assert_eq!(resp.status().as_u16(), 504);
    assert!(body_string(resp).await.contains("504 Gateway Timeout"));
}

#[tokio::test]
async fn test_controller_panic_becomes_500() {
    let root = FnController::new(|_: &mut Context| panic!("leaf blew up"));
    let service = HttpService::new(root, RunMode::Resilient);

    let resp = service.handle_request(request("GET", "/")).await;
    assert_eq!(resp.status().as_u16(), 500);
    // No internals leak into the body.
    assert!(!body_string(resp).await.contains("leaf blew up"));
}

#[tokio::test]
async fn test_fallback_under_driver_uses_last_error() {
    let first = FnController::new(|_: &mut Context| Err(HttpError::not_found()));
    let second = FnController::new(|_: &mut Context| Err(HttpError::forbidden()));
    let root = Fallback::new(None, vec![first, second]);
    let service = HttpService::new(Arc::new(root), RunMode::Resilient);

    let resp = service.handle_request(request("GET", "/")).await;
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn test_fail_fast_mode_requests_shutdown() {
    let root = FnController::new(|_: &mut Context| Err(HttpError::server_error()));
    let service = HttpService::new(root, RunMode::FailFast);
    let shutdown_rx = service.shutdown_rx();

    let resp = service.handle_request(request("GET", "/")).await;
    assert_eq!(resp.status().as_u16(), 500);
    assert!(shutdown_rx.has_changed().unwrap());
}

#[tokio::test]
async fn test_resilient_mode_keeps_serving() {
    let root = Router::new(vec![route("ok", Arc::new(StaticContent::new("fine")))]);
    let service = HttpService::new(Arc::new(root), RunMode::Resilient);
    let shutdown_rx = service.shutdown_rx();

    let resp = service.handle_request(request("GET", "/missing")).await;
    assert_eq!(resp.status().as_u16(), 404);
    assert!(!shutdown_rx.has_changed().unwrap());

    let resp = service.handle_request(request("GET", "/ok")).await;
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(body_string(resp).await, "fine");
}
