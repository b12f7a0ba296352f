use thiserror::Error;

use crate::parse::ParseError;

/// Unified error type covering parsing, JSON, and I/O.
///
/// Returned by the file and JSON loaders such as
/// [`DegreeAudit::from_file()`](crate::DegreeAudit::from_file) and
/// [`PrereqIndex::from_file()`](crate::PrereqIndex::from_file).
#[derive(Debug, Error)]
pub enum CourseMatchError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Serialize(#[from] crate::serial::SerializeError),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Deserialize(#[from] crate::serial::DeserializeError),
}
