//! PDF report download.

use axum::extract::{Multipart, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::api::endpoints::process_form;
use crate::api::error::ApiError;
use crate::api::form::read_form;
use crate::api::types::AppState;
use crate::report::{Report, PDF_MIME};

/// `POST /api/report`: process the form and stream back the PDF as an
/// attachment named after the registration number.
pub async fn download(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let request_id = Uuid::new_v4();
    let form = read_form(multipart).await?;
    let processed = process_form(form, state.config.max_upload_bytes).await?;

    let builder = state.report_builder();
    let report = tokio::task::spawn_blocking(move || builder.build(&processed.report_content()))
        .await
        .map_err(|e| ApiError::Internal(format!("Report task failed: {e}")))??;

    tracing::info!(
        %request_id,
        pages = report.page_count,
        "Report served"
    );
    pdf_response(report)
}

fn pdf_response(report: Report) -> Result<Response, ApiError> {
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        report.file_name
    ))
    .map_err(|e| ApiError::Internal(format!("Invalid file name header: {e}")))?;

    Ok((
        [
            (CONTENT_TYPE, HeaderValue::from_static(PDF_MIME)),
            (CONTENT_DISPOSITION, disposition),
        ],
        report.bytes,
    )
        .into_response())
}
