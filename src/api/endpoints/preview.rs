//! On-screen preview of the Result Set.

use axum::extract::{Multipart, State};
use axum::Json;
use base64::Engine;
use uuid::Uuid;

use crate::api::endpoints::process_form;
use crate::api::error::ApiError;
use crate::api::form::read_form;
use crate::api::types::{AppState, PreviewItem, PreviewResponse};
use crate::request::Processed;
use crate::upload::encode_png;

/// `POST /api/preview`: run the selected operations and return each result
/// as a base64 PNG, in checklist order.
pub async fn render(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PreviewResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    let form = read_form(multipart).await?;
    let processed = process_form(form, state.config.max_upload_bytes).await?;

    let response = tokio::task::spawn_blocking(move || to_preview(&processed))
        .await
        .map_err(|e| ApiError::Internal(format!("Preview task failed: {e}")))??;

    tracing::info!(%request_id, results = response.results.len(), "Preview rendered");
    Ok(Json(response))
}

fn to_preview(processed: &Processed) -> Result<PreviewResponse, ApiError> {
    let engine = base64::engine::general_purpose::STANDARD;
    let results = processed
        .results
        .iter()
        .map(|(operation, image)| -> Result<PreviewItem, ApiError> {
            let png = encode_png(image)?;
            Ok(PreviewItem {
                operation,
                width: image.width(),
                height: image.height(),
                png_base64: engine.encode(png),
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(PreviewResponse {
        mode: if processed.inputs.is_pair() {
            "pair"
        } else {
            "single"
        },
        parameter: processed.parameter,
        results,
    })
}
