use std::sync::Arc;

use tracing::instrument;

use crate::ai::{TransformProvider, TransformResult};
use crate::cache::{CacheKey, TransformCache};
use crate::error::{Result, ToneError};
use crate::tone::ToneDirectionTable;

/// Validates a tone request, serves it from the cache when possible and
/// otherwise calls the provider.
///
/// Concurrent identical misses are not coalesced: both reach the provider and
/// the last write wins.
pub struct ToneTransformationService {
    table: ToneDirectionTable,
    cache: Arc<TransformCache>,
    provider: Arc<dyn TransformProvider>,
}

impl ToneTransformationService {
    pub fn new(
        table: ToneDirectionTable,
        cache: Arc<TransformCache>,
        provider: Arc<dyn TransformProvider>,
    ) -> Self {
        Self {
            table,
            cache,
            provider,
        }
    }

    pub fn cache(&self) -> &TransformCache {
        &self.cache
    }

    pub fn provider(&self) -> &dyn TransformProvider {
        self.provider.as_ref()
    }

    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn handle(&self, text: &str, tone: &str) -> Result<TransformResult> {
        if text.trim().is_empty() || tone.is_empty() {
            return Err(ToneError::EmptyInput);
        }
        let direction = self.table.resolve(tone)?;

        let key = CacheKey::new(text, tone);
        if let Some(entry) = self.cache.get(&key) {
            tracing::debug!("cache hit");
            return Ok(TransformResult {
                converted_text: entry.converted_text,
            });
        }

        tracing::debug!(
            from = direction.from.as_str(),
            to = direction.to.as_str(),
            "cache miss, calling provider"
        );
        let result = self.provider.transform(text, direction).await.map_err(|err| {
            tracing::error!(error = ?err, "provider transform failed");
            err
        })?;

        self.cache.put(key, result.converted_text.clone());
        Ok(result)
    }
}
