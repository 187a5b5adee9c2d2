use std::time::Duration;

use thiserror::Error;

/// Terminal conditions of the cover pipeline.
///
/// Size rejections from the upload endpoint are not represented here on
/// their own: they only drive the ladder forward and surface as
/// [`CoverError::LadderExhausted`] once every ceiling has been tried.
#[derive(Debug, Error)]
pub enum CoverError {
    /// Source image bytes could not be fetched
    #[error("Failed to download image: {0}")]
    Download(String),

    /// Source image bytes could not be parsed into a raster
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// The codec failed to produce an artifact
    #[error("JPEG encoding failed: {0}")]
    Encode(String),

    #[error("Invalid size ceiling: {ceiling_kb} KB")]
    InvalidCeiling { ceiling_kb: u32 },

    #[error("Invalid ceiling ladder: {0}")]
    InvalidLadder(String),

    /// Even the lowest quality level does not fit the ceiling
    #[error(
        "Budget of {ceiling_kb} KB is unreachable, smallest encoding is {smallest_bytes} bytes"
    )]
    BudgetUnreachable { ceiling_kb: u32, smallest_bytes: usize },

    /// The endpoint refused the upload for a reason other than payload size
    #[error("Upload rejected with status {status}: {message}")]
    UploadRejected { status: u16, message: String },

    #[error("Upload transport failed: {0}")]
    Transport(String),

    #[error("Upload attempt at {ceiling_kb} KB timed out after {timeout:?}")]
    AttemptTimedOut { ceiling_kb: u32, timeout: Duration },

    /// The walk was abandoned while an encode was still running
    #[error("Encoding was cancelled")]
    Cancelled,

    #[error("Deadline passed after {attempts} upload attempt(s)")]
    DeadlineExceeded { attempts: usize },

    #[error("All {attempts} ceilings were rejected, last status {last_status}")]
    LadderExhausted { attempts: usize, last_status: u16 },
}

impl CoverError {
    /// HTTP status the backend answers with for this condition.
    pub fn status_code(&self) -> u16 {
        match self {
            CoverError::Download(_) => 502,
            CoverError::Decode(_) => 422,
            CoverError::Encode(_) => 500,
            CoverError::InvalidCeiling { .. } | CoverError::InvalidLadder(_) => 400,
            CoverError::BudgetUnreachable { .. } => 422,
            CoverError::UploadRejected { status, .. } => *status,
            CoverError::Transport(_) => 502,
            CoverError::AttemptTimedOut { .. }
            | CoverError::DeadlineExceeded { .. }
            | CoverError::Cancelled => 504,
            CoverError::LadderExhausted { last_status, .. } => *last_status,
        }
    }
}
