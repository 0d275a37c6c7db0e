//! Typed outcome of a bulk policy/rule upload.
//!
//! Only maps an already-received status and body; there is no transport here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Counts reported by a successful upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkUploadResult {
    pub total_policies: u64,
    pub new_policies: u64,
    pub modified_policies: u64,
    pub total_rules: u64,
    pub new_rules: u64,
    pub modified_rules: u64,
}

/// Structured error payload returned with a bad request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkUploadResponse {
    Ok(BulkUploadResult),
    BadRequest(ApiError),
    InternalServerError,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unexpected status code {0}")]
    UnexpectedStatus(u16),

    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl BulkUploadResponse {
    /// Map a status code and body to the matching outcome.
    ///
    /// - `200` → `Ok` with the decoded result
    /// - `400` → `BadRequest` with the decoded error payload
    /// - `500` → `InternalServerError`, body ignored
    /// - anything else → [`UploadError::UnexpectedStatus`]
    pub fn from_parts(status: u16, body: &[u8]) -> Result<Self, UploadError> {
        match status {
            200 => Ok(Self::Ok(serde_json::from_slice(body)?)),
            400 => Ok(Self::BadRequest(serde_json::from_slice(body)?)),
            500 => Ok(Self::InternalServerError),
            other => Err(UploadError::UnexpectedStatus(other)),
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            Self::Ok(_) => 200,
            Self::BadRequest(_) => 400,
            Self::InternalServerError => 500,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

impl std::fmt::Display for BulkUploadResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok(result) => write!(
                f,
                "[POST /upload][200] bulkUploadOK {} policies, {} rules",
                result.total_policies, result.total_rules
            ),
            Self::BadRequest(err) => write!(f, "[POST /upload][400] bulkUploadBadRequest {}", err.message),
            Self::InternalServerError => write!(f, "[POST /upload][500] bulkUploadInternalServerError"),
        }
    }
}
