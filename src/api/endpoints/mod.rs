//! HTTP endpoint handlers.
//!
//! Handlers stay thin: parse the form, hand the CPU work to a blocking
//! task, shape the response. Business logic lives in the crate root modules.

pub mod health;
pub mod page;
pub mod preview;
pub mod registration;
pub mod report;

use crate::api::error::ApiError;
use crate::api::form::ProcessingForm;
use crate::request::{process, Processed};

/// Decode a form and run the transforms off the async runtime.
pub(crate) async fn process_form(
    form: ProcessingForm,
    max_upload_bytes: u64,
) -> Result<Processed, ApiError> {
    tokio::task::spawn_blocking(move || -> Result<Processed, ApiError> {
        let request = form.into_request(max_upload_bytes)?;
        Ok(process(request)?)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Processing task failed: {e}")))?
}
