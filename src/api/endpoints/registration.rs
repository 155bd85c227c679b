//! Inline registration number check, called as the user types.

use axum::extract::Query;
use axum::Json;
use serde::Deserialize;

use crate::api::types::RegistrationCheck;
use crate::registration::check_registration;

#[derive(Debug, Deserialize)]
pub struct RegistrationQuery {
    #[serde(default)]
    pub value: String,
}

/// `GET /api/registration?value=2023-AG-0001`
pub async fn check(Query(query): Query<RegistrationQuery>) -> Json<RegistrationCheck> {
    let check = match check_registration(&query.value) {
        Ok(()) => RegistrationCheck {
            valid: true,
            message: None,
        },
        Err(e) => RegistrationCheck {
            valid: false,
            message: Some(e.to_string()),
        },
    };
    Json(check)
}
