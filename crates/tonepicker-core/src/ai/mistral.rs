use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{TransformProvider, TransformResult};
use crate::config::ProviderConfig;
use crate::error::{Result, ToneError};
use crate::tone::ToneDirection;

#[derive(Serialize)]
struct MistralMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct MistralRequest {
    model: String,
    messages: Vec<MistralMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct MistralChoice {
    message: MistralResponseMessage,
}

#[derive(Deserialize)]
struct MistralResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct MistralResponse {
    choices: Vec<MistralChoice>,
}

#[derive(Deserialize)]
struct MistralModel {
    id: String,
}

#[derive(Deserialize)]
struct MistralModelsResponse {
    data: Vec<MistralModel>,
}

/// Builds the single-turn instruction sent to the provider.
pub fn build_prompt(text: &str, direction: ToneDirection) -> String {
    format!(
        "Please convert the following text from a {} tone to a {} tone. \
         Only respond with the converted text, no additional commentary:\n\n\"{}\"",
        direction.from.as_str(),
        direction.to.as_str(),
        text
    )
}

/// Chat-completions client for a Mistral-compatible provider.
#[derive(Clone)]
pub struct MistralClient {
    client: Client,
    config: ProviderConfig,
}

impl MistralClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str> {
        self.config.api_key.as_deref().ok_or_else(|| {
            tracing::warn!("no provider API key configured");
            ToneError::Unauthorized
        })
    }

    pub async fn query(&self, prompt: &str) -> Result<String> {
        let api_key = self.api_key()?;
        let request = MistralRequest {
            model: self.config.model.clone(),
            messages: vec![MistralMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(api_key)
            .header("Content-Type", "application/json")
            .timeout(self.config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(classify_transport)?;

        let response = check_status(response).await?;

        let mistral_response: MistralResponse =
            response.json().await.map_err(classify_transport)?;
        mistral_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| ToneError::Unknown("provider returned no choices".to_string()))
    }

    /// Lists model ids visible to the configured credential.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .get(format!("{}/models", self.config.base_url))
            .bearer_auth(api_key)
            .timeout(self.config.models_timeout)
            .send()
            .await
            .map_err(classify_transport)?;

        let response = check_status(response).await?;

        let models_response: MistralModelsResponse =
            response.json().await.map_err(classify_transport)?;
        Ok(models_response
            .data
            .into_iter()
            .map(|model| model.id)
            .collect())
    }
}

#[async_trait]
impl TransformProvider for MistralClient {
    async fn transform(&self, text: &str, direction: ToneDirection) -> Result<TransformResult> {
        let prompt = build_prompt(text, direction);
        let converted_text = self.query(&prompt).await?;
        Ok(TransformResult { converted_text })
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        MistralClient::list_models(self).await
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(%status, %body, "provider returned an error");
    Err(classify_status(status, &body))
}

fn classify_status(status: StatusCode, body: &str) -> ToneError {
    match status {
        StatusCode::UNAUTHORIZED => ToneError::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => ToneError::RateLimited,
        _ => ToneError::Unknown(format!("provider error {}: {}", status, body)),
    }
}

fn classify_transport(err: reqwest::Error) -> ToneError {
    if err.is_timeout() {
        ToneError::Timeout
    } else if err.is_connect() {
        ToneError::Unreachable
    } else if let Some(status) = err.status() {
        classify_status(status, "")
    } else {
        ToneError::Unknown(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tone::ToneDirectionTable;
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::time::Duration;

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    fn client_for(base_url: String) -> MistralClient {
        MistralClient::new(ProviderConfig {
            base_url,
            api_key: Some("test-key-123456".to_string()),
            timeout: Duration::from_millis(300),
            models_timeout: Duration::from_millis(300),
            ..ProviderConfig::default()
        })
    }

    fn casual_formal() -> ToneDirection {
        ToneDirectionTable::new().resolve("casual-formal").unwrap()
    }

    #[test]
    fn test_prompt_embeds_direction_and_text_verbatim() {
        let prompt = build_prompt("  Hey what's up  ", casual_formal());
        assert!(prompt.contains("from a casual tone to a formal tone"));
        assert!(prompt.contains("no additional commentary"));
        assert!(prompt.ends_with("\"  Hey what's up  \""));
    }

    #[tokio::test]
    async fn test_transform_sends_request_and_trims_reply() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(
                    headers.get("authorization").unwrap(),
                    "Bearer test-key-123456"
                );
                assert_eq!(body["model"], "mistral-small");
                assert_eq!(body["max_tokens"], 2000);
                assert_eq!(body["messages"].as_array().unwrap().len(), 1);
                assert_eq!(body["messages"][0]["role"], "user");
                assert!(body["messages"][0]["content"]
                    .as_str()
                    .unwrap()
                    .contains("Hey what's up"));
                Json(json!({
                    "choices": [
                        { "message": { "content": "\n  Good day, how are you?  \n" } },
                        { "message": { "content": "ignored" } }
                    ]
                }))
            }),
        );
        let client = client_for(spawn_stub(router).await);

        let result = client.transform("Hey what's up", casual_formal()).await.unwrap();
        assert_eq!(result.converted_text, "Good day, how are you?");
    }

    async fn transform_against_status(status: AxumStatus) -> ToneError {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(move || async move { (status, "nope") }),
        );
        let client = client_for(spawn_stub(router).await);
        client.transform("hi", casual_formal()).await.unwrap_err()
    }

    #[tokio::test]
    async fn test_status_classification() {
        assert_eq!(
            transform_against_status(AxumStatus::UNAUTHORIZED).await,
            ToneError::Unauthorized
        );
        assert_eq!(
            transform_against_status(AxumStatus::TOO_MANY_REQUESTS).await,
            ToneError::RateLimited
        );
        assert!(matches!(
            transform_against_status(AxumStatus::BAD_GATEWAY).await,
            ToneError::Unknown(_)
        ));
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({ "choices": [] }))
            }),
        );
        let client = client_for(spawn_stub(router).await);

        let err = client.transform("hi", casual_formal()).await.unwrap_err();
        assert_eq!(err, ToneError::Timeout);
    }

    #[tokio::test]
    async fn test_refused_connection_is_unreachable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = client_for(format!("http://{}/v1", addr));

        let err = client.transform("hi", casual_formal()).await.unwrap_err();
        assert_eq!(err, ToneError::Unreachable);
    }

    #[tokio::test]
    async fn test_empty_choices_is_unknown() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        let client = client_for(spawn_stub(router).await);

        let err = client.transform("hi", casual_formal()).await.unwrap_err();
        assert!(matches!(err, ToneError::Unknown(_)));
    }

    #[tokio::test]
    async fn test_missing_key_is_unauthorized_without_request() {
        let client = MistralClient::new(ProviderConfig {
            base_url: "http://127.0.0.1:1/v1".to_string(),
            api_key: None,
            ..ProviderConfig::default()
        });

        let err = client.transform("hi", casual_formal()).await.unwrap_err();
        assert_eq!(err, ToneError::Unauthorized);
        assert_eq!(client.list_models().await.unwrap_err(), ToneError::Unauthorized);
    }

    #[tokio::test]
    async fn test_list_models_returns_ids() {
        let router = Router::new().route(
            "/v1/models",
            get(|| async {
                Json(json!({
                    "data": [ { "id": "mistral-small" }, { "id": "mistral-large" } ]
                }))
            }),
        );
        let client = client_for(spawn_stub(router).await);

        let models = client.list_models().await.unwrap();
        assert_eq!(models, vec!["mistral-small", "mistral-large"]);
    }
}
