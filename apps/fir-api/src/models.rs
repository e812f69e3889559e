//! Request and response bodies

use fir_pdf::{FirForm, FirLayout};
use serde::{Deserialize, Serialize};

use crate::config::Mode;
use crate::error::ApiError;

/// Informational response for `GET /`
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub mode: Mode,
}

/// OAuth2 password-grant style login form
///
/// Extra fields such as `grant_type` or `scope` are accepted and ignored.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub extracted_text: String,
}

/// Raw `/generate/` form; presence is checked against the active layout
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerateForm {
    pub fir_no: Option<String>,
    pub fir_date: Option<String>,
    pub section: Option<String>,
    pub victim_name: Option<String>,
    pub fraud_amount: Option<String>,
    pub complaint_text: Option<String>,
}

impl GenerateForm {
    /// Check required fields for `layout`; values themselves are not validated
    pub fn into_fir_form(self, layout: FirLayout) -> Result<FirForm, ApiError> {
        fn required(value: Option<String>, name: &'static str) -> Result<String, ApiError> {
            value.ok_or(ApiError::MissingField(name))
        }

        let (fir_date, section) = if layout.uses_date_and_section() {
            (
                Some(required(self.fir_date, "fir_date")?),
                Some(required(self.section, "section")?),
            )
        } else {
            (self.fir_date, self.section)
        };

        Ok(FirForm {
            fir_no: required(self.fir_no, "fir_no")?,
            fir_date,
            section,
            victim_name: required(self.victim_name, "victim_name")?,
            fraud_amount: required(self.fraud_amount, "fraud_amount")?,
            complaint_text: required(self.complaint_text, "complaint_text")?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub download_link: String,
}

/// Upper bound for `GET /audit?limit=`
pub const MAX_AUDIT_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    #[serde(default = "default_audit_limit")]
    pub limit: i64,
}

fn default_audit_limit() -> i64 {
    50
}

impl AuditQuery {
    /// Requested row count clamped to `1..=MAX_AUDIT_LIMIT`
    pub fn effective_limit(&self) -> i64 {
        self.limit.clamp(1, MAX_AUDIT_LIMIT)
    }
}
