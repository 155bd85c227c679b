//! Shared types for the HTTP layer.

use std::sync::Arc;

use serde::Serialize;

use crate::config::ServerConfig;
use crate::models::{Operation, Parameter};
use crate::report::ReportBuilder;

/// Shared, read-only context for all routes. No per-request state lives
/// here; each request owns its own buffers and scratch paths.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn report_builder(&self) -> ReportBuilder {
        ReportBuilder::new(self.config.jpeg_quality)
    }
}

/// `GET /api/registration` response.
#[derive(Debug, Serialize)]
pub struct RegistrationCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One previewed result.
#[derive(Debug, Serialize)]
pub struct PreviewItem {
    pub operation: Operation,
    pub width: u32,
    pub height: u32,
    pub png_base64: String,
}

/// `POST /api/preview` response, items in checklist order.
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub mode: &'static str,
    pub parameter: Parameter,
    pub results: Vec<PreviewItem>,
}
