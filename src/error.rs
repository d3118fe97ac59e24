use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::{database::StoreError, frame::Frame, profile::ProfileLookupError};

pub const GENERIC_ERROR: &str = "Error processing your request";

/// The curated cast could not be identified from the frame payload.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidTarget {
    #[error("Invalid Cast ID")]
    MissingCastFid,

    #[error("Invalid Cast Hash")]
    MissingCastHash,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error(transparent)]
    InvalidTarget(#[from] InvalidTarget),

    #[error("Profile lookup failed: {0}")]
    ProfileLookup(#[from] ProfileLookupError),

    #[error("Store failed: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    /// Text shown on the error frame.
    pub fn message(&self) -> String {
        match self {
            AppError::MalformedPayload => self.to_string(),
            AppError::InvalidTarget(target) => target.to_string(),
            AppError::ProfileLookup(_) | AppError::Store(_) => GENERIC_ERROR.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::MalformedPayload | AppError::InvalidTarget(_) => warn!("{self}"),
            AppError::ProfileLookup(_) => warn!("Error handling curate-frame: {self}"),
            AppError::Store(_) => error!("Error handling curate-frame: {self}"),
        }

        // Frame hosts only display 200 responses, so failures render as a card.
        Frame::error(self.message()).into_response()
    }
}
