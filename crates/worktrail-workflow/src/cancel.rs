//! Racing model round trips against a cancellation token.

use tokio_util::sync::CancellationToken;
use worktrail_llm::{CompletionRequest, CompletionResponse, LlmBackend};

use crate::{Result, WorkflowError};

/// Run one completion, giving up as soon as `cancel` fires.
///
/// The in-flight request (and any retries the backend is doing) is dropped
/// on cancellation.
pub(crate) async fn complete_or_cancel(
    backend: &dyn LlmBackend,
    request: CompletionRequest,
    cancel: &CancellationToken,
) -> Result<CompletionResponse> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(WorkflowError::Cancelled),
        response = backend.complete(request) => Ok(response?),
    }
}
