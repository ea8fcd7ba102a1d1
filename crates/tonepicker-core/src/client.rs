use async_trait::async_trait;
use reqwest::{Client, Response};

use crate::ai::TransformResult;
use crate::api::{
    ChangeToneRequest, ErrorBody, HealthResponse, KeyTestResponse, CHANGE_TONE_PATH, HEALTH_PATH,
    TEST_KEY_PATH,
};
use crate::controller::{ApiFailure, ToneApi, FALLBACK_FAILURE_MESSAGE};

/// HTTP client for a running tone server.
#[derive(Clone)]
pub struct ToneClient {
    client: Client,
    base_url: String,
}

impl ToneClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthResponse, ApiFailure> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, HEALTH_PATH))
            .send()
            .await
            .map_err(transport_failure)?;
        parse(response).await
    }

    pub async fn test_key(&self) -> Result<KeyTestResponse, ApiFailure> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, TEST_KEY_PATH))
            .send()
            .await
            .map_err(transport_failure)?;
        parse(response).await
    }
}

#[async_trait]
impl ToneApi for ToneClient {
    async fn change_tone(&self, text: &str, tone: &str) -> Result<TransformResult, ApiFailure> {
        let request = ChangeToneRequest {
            text: text.to_string(),
            tone: tone.to_string(),
        };

        let response = self
            .client
            .post(format!("{}{}", self.base_url, CHANGE_TONE_PATH))
            .json(&request)
            .send()
            .await
            .map_err(transport_failure)?;
        parse(response).await
    }
}

async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiFailure> {
    let status = response.status();
    if status.is_success() {
        return response.json().await.map_err(|err| {
            tracing::warn!(error = %err, "unreadable response from tone server");
            ApiFailure::new(Some(status.as_u16()), FALLBACK_FAILURE_MESSAGE)
        });
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| FALLBACK_FAILURE_MESSAGE.to_string());
    Err(ApiFailure::new(Some(status.as_u16()), message))
}

fn transport_failure(err: reqwest::Error) -> ApiFailure {
    tracing::warn!(error = %err, "tone server request failed");
    ApiFailure::new(None, FALLBACK_FAILURE_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn spawn_stub(router: Router) -> ToneClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        ToneClient::new(&format!("http://{}/", addr))
    }

    #[tokio::test]
    async fn test_change_tone_posts_body_and_reads_result() {
        let router = Router::new().route(
            "/api/change-tone",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body, json!({ "text": "Hey", "tone": "casual-formal" }));
                Json(json!({ "convertedText": "Hello." }))
            }),
        );
        let client = spawn_stub(router).await;

        let result = client.change_tone("Hey", "casual-formal").await.unwrap();
        assert_eq!(result.converted_text, "Hello.");
    }

    #[tokio::test]
    async fn test_error_body_message_is_surfaced_verbatim() {
        let router = Router::new().route(
            "/api/change-tone",
            post(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "error": "Service temporarily unavailable. Please try again later." })),
                )
            }),
        );
        let client = spawn_stub(router).await;

        let failure = client.change_tone("Hey", "casual-formal").await.unwrap_err();
        assert_eq!(failure.status, Some(503));
        assert_eq!(
            failure.message,
            "Service temporarily unavailable. Please try again later."
        );
    }

    #[tokio::test]
    async fn test_error_without_body_uses_fallback_message() {
        let router = Router::new().route(
            "/api/change-tone",
            post(|| async { (StatusCode::BAD_GATEWAY, "gateway down") }),
        );
        let client = spawn_stub(router).await;

        let failure = client.change_tone("Hey", "casual-formal").await.unwrap_err();
        assert_eq!(failure.status, Some(502));
        assert_eq!(failure.message, FALLBACK_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn test_unreachable_server_has_no_status() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = ToneClient::new(&format!("http://{}", addr));

        let failure = client.change_tone("Hey", "casual-formal").await.unwrap_err();
        assert_eq!(failure.status, None);
        assert!(failure.is_retryable());
    }

    #[tokio::test]
    async fn test_health_parses_status_body() {
        let router = Router::new().route(
            "/api/health",
            get(|| async {
                Json(json!({
                    "status": "OK",
                    "timestamp": "2026-01-01T00:00:00Z",
                    "apiKeyConfigured": false,
                    "apiKeyPrefix": "Not configured"
                }))
            }),
        );
        let client = spawn_stub(router).await;

        let health = client.health().await.unwrap();
        assert_eq!(health.status, "OK");
        assert!(!health.api_key_configured);
        assert_eq!(health.api_key_prefix, "Not configured");
    }
}
