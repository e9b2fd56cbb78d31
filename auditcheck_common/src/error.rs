use crate::types::Source;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported file type: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Invalid key column '{column}': not present in source {side}")]
    InvalidKey { column: String, side: Source },

    #[error("No key columns given")]
    NoKeys,

    #[error("Invalid compare column '{column}': not present in source {side}")]
    InvalidCompareColumn { column: String, side: Source },

    #[error("Malformed input {}: {message}", .path.display())]
    MalformedInput { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AuditError {
    pub fn malformed(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        AuditError::MalformedInput {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AuditError::UnsupportedFormat(PathBuf::from("data.txt"));
        assert_eq!(err.to_string(), "Unsupported file type: data.txt");

        let err = AuditError::InvalidKey {
            column: "id".to_string(),
            side: Source::B,
        };
        assert_eq!(
            err.to_string(),
            "Invalid key column 'id': not present in source B"
        );

        let err = AuditError::malformed("a.csv", "found record with 3 fields");
        assert_eq!(err.to_string(), "Malformed input a.csv: found record with 3 fields");
    }
}
