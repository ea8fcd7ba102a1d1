//! Client-side session orchestration.
//!
//! A [`RequestController`] owns one session's [`HistoryStack`] and allows at
//! most one tone change in flight. While a change is pending every other
//! action is refused with [`ActionError::Busy`]; a failed change leaves the
//! history exactly as it was.

use async_trait::async_trait;
use thiserror::Error;

use crate::ai::TransformResult;
use crate::history::HistoryStack;
use crate::service::ToneTransformationService;

pub const EMPTY_TEXT_MESSAGE: &str = "Please enter some text first";
pub const FALLBACK_FAILURE_MESSAGE: &str = "Failed to change tone. Please try again.";

/// A failed tone change as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiFailure {
    /// HTTP status, or None when no response was received.
    pub status: Option<u16>,
    pub message: String,
}

impl ApiFailure {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// True when trying the same request again later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self.status, None | Some(408) | Some(429) | Some(503))
    }
}

impl From<crate::ToneError> for ApiFailure {
    fn from(err: crate::ToneError) -> Self {
        Self::new(Some(err.status_code()), err.to_string())
    }
}

/// Transport used by the controller to reach the tone service.
#[async_trait]
pub trait ToneApi: Send + Sync {
    async fn change_tone(&self, text: &str, tone: &str) -> Result<TransformResult, ApiFailure>;
}

#[async_trait]
impl ToneApi for ToneTransformationService {
    async fn change_tone(&self, text: &str, tone: &str) -> Result<TransformResult, ApiFailure> {
        self.handle(text, tone).await.map_err(ApiFailure::from)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Idle,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("A tone change is already in progress")]
    Busy,

    #[error("{}", EMPTY_TEXT_MESSAGE)]
    EmptyText,

    #[error(transparent)]
    Request(#[from] ApiFailure),
}

/// Ticket for the one in-flight tone change. Only
/// [`RequestController::begin_transform`] creates one.
#[derive(Debug)]
pub struct PendingTransform {
    text: String,
    tone: String,
}

impl PendingTransform {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tone(&self) -> &str {
        &self.tone
    }
}

pub struct RequestController<A> {
    api: A,
    history: HistoryStack,
    phase: RequestPhase,
    error: Option<String>,
}

impl<A: ToneApi> RequestController<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            history: HistoryStack::new(),
            phase: RequestPhase::Idle,
            error: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn current_text(&self) -> &str {
        self.history.current()
    }

    pub fn phase(&self) -> RequestPhase {
        self.phase
    }

    pub fn is_pending(&self) -> bool {
        self.phase == RequestPhase::Pending
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn can_undo(&self) -> bool {
        !self.is_pending() && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        !self.is_pending() && self.history.can_redo()
    }

    fn ensure_idle(&self) -> Result<(), ActionError> {
        match self.phase {
            RequestPhase::Idle => Ok(()),
            RequestPhase::Pending => Err(ActionError::Busy),
        }
    }

    pub fn edit(&mut self, text: impl Into<String>) -> Result<(), ActionError> {
        self.ensure_idle()?;
        self.history.push(text);
        self.error = None;
        Ok(())
    }

    pub fn undo(&mut self) -> Result<&str, ActionError> {
        self.ensure_idle()?;
        self.error = None;
        Ok(self.history.undo())
    }

    pub fn redo(&mut self) -> Result<&str, ActionError> {
        self.ensure_idle()?;
        self.error = None;
        Ok(self.history.redo())
    }

    /// Pushes an empty snapshot, so a reset can itself be undone.
    pub fn reset(&mut self) -> Result<(), ActionError> {
        self.edit(String::new())
    }

    /// Clears the displayed error. Does not retry anything.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Moves Idle -> Pending and captures the text to transform. The ticket
    /// must be handed back to [`RequestController::finish_transform`]; until
    /// then every other action is refused.
    pub fn begin_transform(&mut self, tone: &str) -> Result<PendingTransform, ActionError> {
        self.ensure_idle()?;
        let text = self.history.current();
        if text.trim().is_empty() {
            self.error = Some(EMPTY_TEXT_MESSAGE.to_string());
            return Err(ActionError::EmptyText);
        }

        let pending = PendingTransform {
            text: text.to_string(),
            tone: tone.to_string(),
        };
        self.phase = RequestPhase::Pending;
        self.error = None;
        tracing::debug!(tone, "tone change started");
        Ok(pending)
    }

    /// Moves Pending -> Idle. Success pushes the converted text; failure only
    /// records the message.
    pub fn finish_transform(
        &mut self,
        pending: PendingTransform,
        outcome: Result<TransformResult, ApiFailure>,
    ) -> Result<(), ActionError> {
        self.phase = RequestPhase::Idle;
        match outcome {
            Ok(result) => {
                tracing::debug!(tone = %pending.tone, "tone change finished");
                self.history.push(result.converted_text);
                Ok(())
            }
            Err(failure) => {
                tracing::warn!(tone = %pending.tone, status = ?failure.status, "tone change failed");
                self.error = Some(failure.message.clone());
                Err(ActionError::Request(failure))
            }
        }
    }

    /// Runs a whole tone change against the current text.
    ///
    /// Dropping the returned future mid-request returns the controller to
    /// Idle with the history untouched.
    pub async fn transform(&mut self, tone: &str) -> Result<(), ActionError> {
        let pending = self.begin_transform(tone)?;
        let outcome = {
            let _idle_on_drop = PhaseReset(&mut self.phase);
            self.api.change_tone(pending.text(), pending.tone()).await
        };
        self.finish_transform(pending, outcome)
    }
}

/// Puts the phase back to Idle when dropped.
struct PhaseReset<'a>(&'a mut RequestPhase);

impl Drop for PhaseReset<'_> {
    fn drop(&mut self) {
        *self.0 = RequestPhase::Idle;
    }
}
