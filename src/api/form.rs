//! Multipart form parsing for the preview and report endpoints.
//!
//! Fields: `name`, `registration`, `image`, `image2` (optional),
//! `operation` (repeatable, or comma-separated), `select_all`, `value`,
//! `weight`. Unknown fields are ignored. A file field with an empty body is
//! treated as absent, which is what browsers send for an untouched input.

use axum::body::Bytes;
use axum::extract::Multipart;
use axum::http::StatusCode;

use crate::api::error::ApiError;
use crate::models::{Inputs, Operation, OperationSelection, Parameter};
use crate::request::ProcessingRequest;
use crate::upload::{decode_upload, UploadError};

/// Raw form fields as received, before any decoding.
#[derive(Debug, Default)]
pub struct ProcessingForm {
    pub name: String,
    pub registration: String,
    pub image: Option<Bytes>,
    pub image2: Option<Bytes>,
    pub operations: Vec<String>,
    pub select_all: bool,
    pub value: Option<String>,
    pub weight: Option<String>,
}

/// Drain the multipart stream into a `ProcessingForm`.
pub async fn read_form(mut multipart: Multipart) -> Result<ProcessingForm, ApiError> {
    let mut form = ProcessingForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" | "image2" => {
                let bytes = field.bytes().await.map_err(multipart_error)?;
                let slot = if name == "image" {
                    &mut form.image
                } else {
                    &mut form.image2
                };
                *slot = (!bytes.is_empty()).then_some(bytes);
            }
            "name" => form.name = field.text().await.map_err(multipart_error)?,
            "registration" => form.registration = field.text().await.map_err(multipart_error)?,
            "operation" => {
                let text = field.text().await.map_err(multipart_error)?;
                form.operations.extend(
                    text.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                );
            }
            "select_all" => {
                let text = field.text().await.map_err(multipart_error)?;
                form.select_all = is_truthy(&text);
            }
            "value" => form.value = non_blank(field.text().await.map_err(multipart_error)?),
            "weight" => form.weight = non_blank(field.text().await.map_err(multipart_error)?),
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

impl ProcessingForm {
    /// Decode uploads and parse the operation list and parameter.
    pub fn into_request(self, max_upload_bytes: u64) -> Result<ProcessingRequest, ApiError> {
        let first = self.image.ok_or(UploadError::Empty)?;
        let first = decode_upload(&first, max_upload_bytes)?;
        let inputs = match self.image2 {
            Some(second) => Inputs::Pair {
                first,
                second: decode_upload(&second, max_upload_bytes)?,
            },
            None => Inputs::Single(first),
        };

        let operations = self
            .operations
            .iter()
            .map(|s| s.parse::<Operation>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        let mut selection = OperationSelection::only(operations);
        selection.select_all = self.select_all;

        let parameter = parse_parameter(
            inputs.is_pair(),
            self.value.as_deref(),
            self.weight.as_deref(),
        )?;

        Ok(ProcessingRequest {
            name: self.name,
            registration: self.registration,
            inputs,
            selection,
            parameter,
        })
    }
}

/// Scalar in single-image mode, weight in two-image mode; the other field is
/// ignored. A missing field means "use the default".
fn parse_parameter(
    pair: bool,
    value: Option<&str>,
    weight: Option<&str>,
) -> Result<Option<Parameter>, ApiError> {
    if pair {
        weight
            .map(|raw| {
                raw.trim()
                    .parse::<f32>()
                    .map(Parameter::Weight)
                    .map_err(|_| {
                        ApiError::validation(
                            "INVALID_PARAMETER",
                            "Weight must be a number between 0.0 and 1.0",
                        )
                    })
            })
            .transpose()
    } else {
        value
            .map(|raw| {
                raw.trim().parse::<u8>().map(Parameter::Scalar).map_err(|_| {
                    ApiError::validation(
                        "INVALID_PARAMETER",
                        "Value must be a whole number between 0 and 255",
                    )
                })
            })
            .transpose()
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "on" | "true" | "1" | "yes"
    )
}

fn non_blank(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(format!("Malformed form data: {}", err.body_text()))
    }
}
