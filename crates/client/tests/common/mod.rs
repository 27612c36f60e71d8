use axum::Router;
use novagen_core::config::GenerationConfig;

/// Credential every fake upstream expects.
pub const TEST_API_KEY: &str = "test-key";

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Generation settings pointing at a fake upstream.
pub fn test_config(base_url: &str) -> GenerationConfig {
    GenerationConfig {
        api_key: Some(TEST_API_KEY.to_string()),
        base_url: base_url.to_string(),
        ..Default::default()
    }
}
