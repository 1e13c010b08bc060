use std::fmt;

use thiserror::Error;

use crate::pager::Direction;

#[derive(Error, Debug)]
pub enum PagewiseError {
    #[error("data source error: {0}")]
    Source(String),

    #[error("fetch timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("invalid cursor '{0}'")]
    InvalidCursor(String),

    #[error("invalid page size {0}: must be greater than zero")]
    InvalidPageSize(usize),

    #[error("invalid sort order '{0}': expected asc or desc")]
    InvalidSortOrder(String),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("pager task has shut down")]
    PagerClosed,
}

pub type Result<T> = std::result::Result<T, PagewiseError>;

/// Category of a failed fetch, shown next to the message so the UI can
/// decide how to present the retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Source,
    Timeout,
    InvalidCursor,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Source => write!(f, "source"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::InvalidCursor => write!(f, "invalid cursor"),
        }
    }
}

/// A failed page fetch, annotated with the navigation direction that issued it.
///
/// Recoverable: the session keeps its position and cursor history, so a retry
/// resumes from the same point.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{direction} fetch failed ({kind}): {message}")]
pub struct FetchFailure {
    pub direction: Direction,
    pub kind: FailureKind,
    pub message: String,
}

impl FetchFailure {
    /// Wrap a crate error raised while fetching in the given direction.
    pub fn from_error(direction: Direction, error: &PagewiseError) -> Self {
        let (kind, message) = match error {
            PagewiseError::Timeout { .. } => (FailureKind::Timeout, error.to_string()),
            PagewiseError::InvalidCursor(_) => (FailureKind::InvalidCursor, error.to_string()),
            PagewiseError::Source(msg) => (FailureKind::Source, msg.clone()),
            other => (FailureKind::Source, other.to_string()),
        };
        Self {
            direction,
            kind,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_message_is_kept_verbatim() {
        let err = PagewiseError::Source("connection reset".to_string());
        let failure = FetchFailure::from_error(Direction::Next, &err);
        assert_eq!(failure.kind, FailureKind::Source);
        assert_eq!(failure.message, "connection reset");
        assert_eq!(
            failure.to_string(),
            "next fetch failed (source): connection reset"
        );
    }

    #[test]
    fn test_timeout_maps_to_timeout_kind() {
        let err = PagewiseError::Timeout { seconds: 5 };
        let failure = FetchFailure::from_error(Direction::Initial, &err);
        assert_eq!(failure.kind, FailureKind::Timeout);
        assert_eq!(failure.message, "fetch timed out after 5 seconds");
    }
}
