//! Tone server HTTP layer.
//!
//! Routes are thin: they hand the request to [`ToneTransformationService`]
//! and map any [`ToneError`] to a status code and an `{ error }` body.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use tower_http::cors::CorsLayer;

use tonepicker_core::api::{
    ChangeToneRequest, ErrorBody, HealthResponse, KeyTestResponse, CHANGE_TONE_PATH, HEALTH_PATH,
    TEST_KEY_PATH,
};
use tonepicker_core::{
    Config, MistralClient, ToneDirectionTable, ToneError, ToneTransformationService,
    TransformCache, TransformProvider, TransformResult,
};

/// Application state shared across request handlers
#[derive(Clone)]
pub struct AppState {
    service: Arc<ToneTransformationService>,
    provider: Arc<dyn TransformProvider>,
    api_key_prefix: Option<String>,
}

impl AppState {
    pub fn new(
        service: Arc<ToneTransformationService>,
        provider: Arc<dyn TransformProvider>,
        api_key_prefix: Option<String>,
    ) -> Self {
        Self {
            service,
            provider,
            api_key_prefix,
        }
    }

    /// Wires the Mistral client, cache and tone table from configuration.
    pub fn from_config(config: &Config) -> Self {
        let provider: Arc<dyn TransformProvider> = Arc::new(MistralClient::new(config.provider()));
        let cache = Arc::new(TransformCache::new(config.cache_ttl()));
        let service = Arc::new(ToneTransformationService::new(
            ToneDirectionTable::new(),
            cache,
            provider.clone(),
        ));
        Self::new(service, provider, config.api_key_prefix())
    }

    pub fn service(&self) -> &ToneTransformationService {
        &self.service
    }

    pub fn provider(&self) -> Arc<dyn TransformProvider> {
        self.provider.clone()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(CHANGE_TONE_PATH, post(change_tone))
        .route(HEALTH_PATH, get(health))
        .route(TEST_KEY_PATH, get(test_key))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// A [`ToneError`] rendered as an HTTP response.
pub struct ApiError(pub ToneError);

impl From<ToneError> for ApiError {
    fn from(err: ToneError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

async fn change_tone(
    State(state): State<AppState>,
    payload: Result<Json<ChangeToneRequest>, JsonRejection>,
) -> Result<Json<TransformResult>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(%rejection, "rejected change-tone body");
        ToneError::EmptyInput
    })?;

    match state.service.handle(&request.text, &request.tone).await {
        Ok(result) => Ok(Json(result)),
        Err(err) => {
            if err.is_client_error() {
                tracing::debug!(error = %err, tone = %request.tone, "invalid change-tone request");
            } else {
                tracing::error!(error = ?err, "change-tone failed");
            }
            Err(ApiError(err))
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        api_key_configured: state.api_key_prefix.is_some(),
        api_key_prefix: state
            .api_key_prefix
            .clone()
            .unwrap_or_else(|| "Not configured".to_string()),
    })
}

async fn test_key(State(state): State<AppState>) -> Response {
    match state.provider.list_models().await {
        Ok(models) => Json(KeyTestResponse {
            status: "API key is valid".to_string(),
            models,
        })
        .into_response(),
        Err(ToneError::Unauthorized) => {
            tracing::warn!("API key test rejected");
            error_response(
                StatusCode::UNAUTHORIZED,
                "Invalid API key. The provided key is not authorized.",
            )
        }
        Err(err) => {
            tracing::error!(error = ?err, "API key test failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to test API key")
        }
    }
}

/// Lists models once in the background and logs whether the key works.
pub fn spawn_key_check(provider: Arc<dyn TransformProvider>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("Testing API key...");
        match provider.list_models().await {
            Ok(models) => tracing::info!(models = %models.join(", "), "API key is valid"),
            Err(err) => tracing::warn!(error = ?err, "API key test failed"),
        }
    })
}
