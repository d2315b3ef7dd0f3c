use std::collections::HashMap;
use std::net::SocketAddr;

use axum::extract::Query;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use hl_client::{NewsClient, NewsClientConfig, MAX_ARTICLES};
use hl_core::{NewsSource, Topic};
use serde_json::json;

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr, topic: Topic) -> NewsClient {
    let config = NewsClientConfig::new(topic)
        .with_endpoint(format!("http://{}/globalNews", addr))
        .with_api_key("test-key");
    NewsClient::new(config).unwrap()
}

async fn articles(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let content_type = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let accept = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok());
    if content_type != Some("application/json") || accept != Some("application/json, text/plain, */*") {
        return (StatusCode::UNSUPPORTED_MEDIA_TYPE, "bad headers").into_response();
    }
    if params.get("apiKey").map(String::as_str) != Some("test-key") {
        return (StatusCode::UNAUTHORIZED, "missing key").into_response();
    }
    let query = params.get("q").cloned().unwrap_or_default();
    let articles: Vec<_> = (0..120)
        .map(|i| {
            json!({
                "source": { "id": null, "name": "Wire" },
                "author": "Desk",
                "title": format!("{} story {}", query, i),
                "urlToImage": null,
                "publishedAt": "2024-10-13T10:00:00Z"
            })
        })
        .collect();
    axum::Json(json!({ "status": "ok", "totalResults": 120, "articles": articles })).into_response()
}

#[tokio::test]
async fn test_fetch_returns_bounded_list() {
    let addr = serve(Router::new().route("/globalNews", post(articles))).await;
    let client = client_for(addr, Topic::preset("tesla").unwrap());

    let fetched = client.fetch().await;
    assert_eq!(fetched.len(), MAX_ARTICLES);
    assert_eq!(fetched[0].display_title(), "tesla story 0");
    assert_eq!(fetched[0].source_name.as_deref(), Some("Wire"));
}

#[tokio::test]
async fn test_server_error_collapses_to_empty() {
    let router = Router::new().route(
        "/globalNews",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let addr = serve(router).await;
    let client = client_for(addr, Topic::default());

    assert!(client.fetch().await.is_empty());
    let err = client.try_fetch().await.unwrap_err();
    assert!(matches!(err, hl_core::Error::Network { status: 500 }));
}

#[tokio::test]
async fn test_malformed_body_collapses_to_empty() {
    let router = Router::new().route("/globalNews", post(|| async { "definitely not json" }));
    let addr = serve(router).await;
    let client = client_for(addr, Topic::default());

    assert!(client.fetch().await.is_empty());
    assert!(matches!(
        client.try_fetch().await,
        Err(hl_core::Error::Serialization(_))
    ));
}

#[tokio::test]
async fn test_unreachable_endpoint_collapses_to_empty() {
    // Bind and drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr, Topic::default());
    assert!(client.fetch().await.is_empty());
    assert!(matches!(client.try_fetch().await, Err(hl_core::Error::Http(_))));
}
