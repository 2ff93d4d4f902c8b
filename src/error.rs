//! Error types / 错误类型

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or querying the index / 索引构建与查询错误
///
/// Every variant is terminal for the current invocation; nothing here is retried.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Config(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("index storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("corrupt postings in index: {0}")]
    Postings(#[from] serde_json::Error),

    #[error("failed to walk {}: {message}", path.display())]
    Traversal { path: PathBuf, message: String },

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("cancelled")]
    Cancelled,

    #[error("failed to write results: {0}")]
    Output(#[from] std::io::Error),
}

/// Result alias for docsearch operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn traversal(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Error::Traversal {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Whether this error came from the storage layer / 是否为存储层错误
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Storage(_) | Error::Postings(_))
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
        Error::traversal(path, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidQuery("nothing to search".to_string());
        assert_eq!(err.to_string(), "invalid query: nothing to search");

        let err = Error::traversal("notes/a.md", "permission denied");
        assert_eq!(err.to_string(), "failed to walk notes/a.md: permission denied");
    }

    #[test]
    fn test_storage_kind() {
        assert!(Error::Storage(sqlx::Error::PoolClosed).is_storage());
        assert!(!Error::Cancelled.is_storage());
        assert!(!Error::NotFound("42".to_string()).is_storage());
    }
}
