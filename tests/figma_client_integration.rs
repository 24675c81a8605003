//! Integration tests for the Figma REST client against a mock server.

use figma_icons_core::{ApiError, DesignApi, FigmaClient, ImageFormat, NodeType};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;

macro_rules! require_mock_server {
    () => {{
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        mock_server
    }};
}

fn client_for(base: &str) -> FigmaClient {
    FigmaClient::new(base, "figd_test_token").unwrap()
}

#[tokio::test]
async fn test_fetch_document_tree_sends_token_and_parses_tree() {
    let mock_server = require_mock_server!();
    let body = json!({
        "name": "Design System",
        "document": {
            "id": "0:0",
            "name": "Document",
            "type": "DOCUMENT",
            "children": [{
                "id": "0:1",
                "name": "Icons",
                "type": "CANVAS",
                "children": [{
                    "id": "1:1",
                    "name": "Arrows",
                    "type": "FRAME",
                    "children": [
                        {"id": "1:2", "name": "Name=up", "type": "COMPONENT"},
                        {"id": "1:3", "name": "Vector", "type": "VECTOR", "fills": []}
                    ]
                }]
            }]
        }
    });
    Mock::given(method("GET"))
        .and(path("/v1/files/abc123"))
        .and(header("X-Figma-Token", "figd_test_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&format!("{}/v1/", mock_server.uri()));
    let document = client.fetch_document_tree("abc123").await.unwrap();

    assert_eq!(document.node_type, NodeType::Document);
    let page = document.child_named("Icons").unwrap();
    let frame = &page.children[0];
    assert_eq!(frame.node_type, NodeType::Frame);
    assert_eq!(frame.children[0].node_type, NodeType::Component);
    assert_eq!(frame.children[1].node_type, NodeType::Other);
}

#[tokio::test]
async fn test_fetch_document_tree_maps_http_status() {
    let mock_server = require_mock_server!();
    Mock::given(method("GET"))
        .and(path("/v1/files/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = client_for(&format!("{}/v1", mock_server.uri()));
    let err = client.fetch_document_tree("missing").await.unwrap_err();
    assert!(matches!(err, ApiError::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn test_fetch_document_tree_rejects_malformed_body() {
    let mock_server = require_mock_server!();
    Mock::given(method("GET"))
        .and(path("/v1/files/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&format!("{}/v1", mock_server.uri()));
    let err = client.fetch_document_tree("abc").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }));
}

#[tokio::test]
async fn test_resolve_image_urls_sends_ids_and_format() {
    let mock_server = require_mock_server!();
    Mock::given(method("GET"))
        .and(path("/v1/images/abc"))
        .and(query_param("ids", "1:2,1:3"))
        .and(query_param("format", "svg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "err": null,
            "images": {
                "1:2": "https://s3.example.com/1-2.svg",
                "1:3": null
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&format!("{}/v1", mock_server.uri()));
    let ids = vec!["1:2".to_string(), "1:3".to_string()];
    let urls = client
        .resolve_image_urls("abc", &ids, ImageFormat::Svg)
        .await
        .unwrap();

    assert_eq!(
        urls.get("1:2").cloned().flatten().as_deref(),
        Some("https://s3.example.com/1-2.svg")
    );
    assert_eq!(urls.get("1:3"), Some(&None));
}

#[tokio::test]
async fn test_resolve_image_urls_surfaces_api_err_field() {
    let mock_server = require_mock_server!();
    Mock::given(method("GET"))
        .and(path("/v1/images/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "err": "Render timeout",
            "images": {}
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&format!("{}/v1", mock_server.uri()));
    let err = client
        .resolve_image_urls("abc", &["1:2".to_string()], ImageFormat::Svg)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Api { ref message, .. } if message == "Render timeout"));
}

#[test]
fn test_client_rejects_token_with_newline() {
    let err = FigmaClient::new("https://api.figma.com/v1", "bad\ntoken").unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest { .. }));
}
