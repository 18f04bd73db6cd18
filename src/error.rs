//! Error types shared across the cube engine.
//!
//! Errors are serialized as tagged JSON objects so that a consuming front end
//! (or a log sink) can discriminate on `kind` without parsing the message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cube engine error taxonomy.
///
/// Uses an internally-tagged representation (`#[serde(tag = "kind")]`) so each
/// variant serializes to a JSON object with a `kind` discriminator.
///
/// # Examples
///
/// ```rust
/// use hsicube::error::CubeError;
///
/// let error = CubeError::IndexOutOfRange {
///     message: "band 12 exceeds 8 bands".to_string(),
/// };
///
/// // Serializes to: { "kind": "IndexOutOfRange", "message": "..." }
/// ```
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CubeError {
    /// Interleave tag is not one of `bip`, `bil`, `bsq`.
    #[error("unsupported interleave: {message}")]
    UnsupportedInterleave { message: String },

    /// The location URL scheme has no registered byte source.
    #[error("unsupported source scheme: {message}")]
    UnsupportedScheme { message: String },

    /// Geometry/offsets are inconsistent with the byte source's length.
    #[error("corrupt descriptor: {message}")]
    CorruptDescriptor { message: String },

    /// The byte source could not be mapped (e.g. file too large to address).
    #[error("out of resources: {message}")]
    OutOfResources { message: String },

    /// A pixel/band/line/sample/flat index fell outside the cube's geometry.
    #[error("index out of range: {message}")]
    IndexOutOfRange { message: String },

    /// Propagated failure from the byte source or a sink.
    #[error("io error: {message}")]
    IoError { message: String },
}

impl From<std::io::Error> for CubeError {
    fn from(error: std::io::Error) -> Self {
        CubeError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for CubeError {
    fn from(error: serde_json::Error) -> Self {
        CubeError::CorruptDescriptor {
            message: error.to_string(),
        }
    }
}

/// Convert a `CubeError` into a JSON string, e.g. for a command boundary.
///
/// Falls back to the `Display` output if serialization itself fails.
impl From<CubeError> for String {
    fn from(error: CubeError) -> Self {
        serde_json::to_string(&error).unwrap_or_else(|_| error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CubeError::IndexOutOfRange {
            message: "test error".to_string(),
        };

        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains(r#""kind":"IndexOutOfRange"#));
        assert!(json.contains(r#""message":"test error"#));
    }

    #[test]
    fn test_error_deserialization() {
        let json = r#"{"kind":"UnsupportedInterleave","message":"xyz"}"#;
        let error: CubeError = serde_json::from_str(json).unwrap();

        match error {
            CubeError::UnsupportedInterleave { message } => {
                assert_eq!(message, "xyz");
            }
            _ => panic!("wrong error variant"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cube_error: CubeError = io_error.into();

        match cube_error {
            CubeError::IoError { message } => {
                assert!(message.contains("file not found"));
            }
            _ => panic!("wrong error variant"),
        }
    }
}
