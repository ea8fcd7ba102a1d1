pub mod ai;
pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod logging;
pub mod service;
pub mod tone;

// Re-export main types for convenience
pub use ai::{MistralClient, TransformProvider, TransformResult};
pub use cache::{CacheEntry, CacheKey, Clock, SystemClock, TransformCache};
pub use client::ToneClient;
pub use config::{Config, ProviderConfig};
pub use controller::{ActionError, ApiFailure, RequestController, RequestPhase, ToneApi};
pub use error::ToneError;
pub use history::HistoryStack;
pub use service::ToneTransformationService;
pub use tone::{Tone, ToneDirection, ToneDirectionTable};
