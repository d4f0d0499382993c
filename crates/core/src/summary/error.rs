//! Summary error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use reimburse_shared::AppError;
use reimburse_shared::types::SummaryId;

use crate::permission::Role;
use crate::store::StoreError;

/// Errors that can occur while generating or reading summaries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryError {
    /// Summary not found.
    #[error("Summary {0} not found")]
    NotFound(SummaryId),

    /// Explicit window with start after end.
    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange {
        /// Requested start.
        start: DateTime<Utc>,
        /// Requested end.
        end: DateTime<Utc>,
    },

    /// Actor may not read the requested summaries.
    #[error("Role {role} may not view other users' summaries")]
    Forbidden {
        /// Role of the actor.
        role: Role,
    },

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SummaryError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::InvalidRange { .. } => 400,
            Self::Forbidden { .. } => 403,
            Self::Store(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidRange { .. } => "INVALID_RANGE",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

impl From<SummaryError> for AppError {
    fn from(err: SummaryError) -> Self {
        match err {
            SummaryError::NotFound(_) => Self::NotFound(err.to_string()),
            SummaryError::InvalidRange { .. } => Self::Validation(err.to_string()),
            SummaryError::Forbidden { .. } => Self::Forbidden(err.to_string()),
            SummaryError::Store(store) => store.into(),
        }
    }
}
