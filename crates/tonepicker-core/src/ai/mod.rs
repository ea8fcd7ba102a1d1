pub mod mistral;

pub use mistral::MistralClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tone::ToneDirection;

/// Output of a tone transformation. Cached and fresh results are identical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    pub converted_text: String,
}

/// External language-model provider.
///
/// Implementations classify every failure into [`crate::ToneError`] and
/// return text with surrounding whitespace trimmed. No retries.
#[async_trait]
pub trait TransformProvider: Send + Sync {
    async fn transform(&self, text: &str, direction: ToneDirection) -> Result<TransformResult>;

    async fn list_models(&self) -> Result<Vec<String>>;
}
