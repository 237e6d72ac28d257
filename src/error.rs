//! Error taxonomy shared by the kernels, the codec and the harness.
//!
//! Every failure is synchronous and deterministic: bad input, bad options
//! or bad paths. Nothing here is worth retrying.

use std::path::PathBuf;

/// Errors produced by this crate.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// Buffer dimensions disagree with its data, or the image is empty.
    #[error("invalid pixel buffer: {0}")]
    InvalidBuffer(String),

    /// A filter mode or execution path name that is not recognised.
    #[error("unsupported mode `{0}`")]
    UnsupportedMode(String),

    /// Kernel parameters outside their allowed range.
    #[error("invalid filter options: {0}")]
    InvalidOptions(String),

    #[error("cannot read image {}: {reason}", path.display())]
    UnreadableFile { path: PathBuf, reason: String },

    #[error("cannot write image {}: {reason}", path.display())]
    UnwritableTarget { path: PathBuf, reason: String },

    /// Two images that must share a size do not.
    #[error("dimension mismatch: {left_width}x{left_height} vs {right_width}x{right_height}")]
    DimensionMismatch {
        left_width: u32,
        left_height: u32,
        right_width: u32,
        right_height: u32,
    },

    /// A harness plan that cannot be read or parsed.
    #[error("invalid plan: {0}")]
    Plan(String),
}

pub type Result<T> = std::result::Result<T, FilterError>;

impl FilterError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        FilterError::UnreadableFile {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn unwritable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        FilterError::UnwritableTarget {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failure() {
        let err = FilterError::UnsupportedMode("sepia".into());
        assert_eq!(err.to_string(), "unsupported mode `sepia`");

        let err = FilterError::DimensionMismatch {
            left_width: 2,
            left_height: 3,
            right_width: 4,
            right_height: 5,
        };
        assert_eq!(err.to_string(), "dimension mismatch: 2x3 vs 4x5");
    }

    #[test]
    fn test_path_errors_include_path() {
        let err = FilterError::unreadable("/nope/a.png", "not found");
        assert!(err.to_string().contains("/nope/a.png"));
        assert!(err.to_string().contains("not found"));
    }
}
