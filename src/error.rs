//! Unified error handling for the track-editor library.
//!
//! Missing targets and empty ranges are not errors: editing operations report them
//! through `None`, empty or zero results. This type covers the fallible boundaries
//! only (document parsing and validation, elevation lookup, use after clear).

/// Unified error type for track-editor operations.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    /// Document is structurally invalid (missing fields, wrong shape)
    #[error("Invalid document: {message}")]
    InvalidDocument { message: String },

    /// Coordinate and timestamp arrays are not parallel
    #[error("Document has {coordinates} coordinates but {timestamps} timestamps")]
    LengthMismatch {
        coordinates: usize,
        timestamps: usize,
    },

    /// Geometry type cannot be represented as a track
    #[error("Unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Elevation collaborator failed or returned a malformed result
    #[error("Elevation lookup failed: {message}")]
    ElevationLookup { message: String },

    /// Facade was cleared and has no document left to synchronize
    #[error("Track has been cleared")]
    Cleared,
}

/// Result type alias for track-editor operations.
pub type Result<T> = std::result::Result<T, TrackError>;

/// Extension trait for converting Option to TrackError.
pub trait OptionExt<T> {
    /// Convert Option to Result with an invalid document error.
    fn ok_or_invalid_document(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_invalid_document(self, message: &str) -> Result<T> {
        self.ok_or_else(|| TrackError::InvalidDocument {
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrackError::LengthMismatch {
            coordinates: 3,
            timestamps: 2,
        };
        assert!(err.to_string().contains("3 coordinates"));
        assert!(err.to_string().contains("2 timestamps"));
    }

    #[test]
    fn test_option_ext() {
        let none: Option<i32> = None;
        let result = none.ok_or_invalid_document("missing geometry");
        assert!(matches!(result, Err(TrackError::InvalidDocument { .. })));
        assert!(Some(1).ok_or_invalid_document("unused").is_ok());
    }

    #[test]
    fn test_json_error_converts() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: TrackError = parse.unwrap_err().into();
        assert!(matches!(err, TrackError::Json(_)));
    }
}
