use std::path::PathBuf;

/// Failure of a backing file or of an access into a store's records.
#[derive(thiserror::Error, Debug)]
pub enum DataStoreError {
    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No record at index {index} (store holds {len} records)")]
    OutOfBounds { index: usize, len: usize },
}

impl DataStoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A problem with a single line (or a single field of a line) of a store file.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Expected {expected} fields but found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("Field '{field}': '{value}' is not a valid number")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Field '{field}': '{value}' is not a valid date")]
    InvalidDate { field: &'static str, value: String },

    #[error("Field '{field}': '{value}' is not a valid boolean")]
    InvalidBool { field: &'static str, value: String },

    #[error("Field '{field}': '{value}' is not a known value")]
    InvalidVariant { field: &'static str, value: String },
}
