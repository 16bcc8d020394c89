use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettlementError {
    // Config-related errors
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    SerializationFailed(#[from] toml::ser::Error),

    #[error("Failed to deserialize config: {0}")]
    DeserializationFailed(#[from] toml::de::Error),

    #[error("Config file not found at path: {path}")]
    ConfigFileNotFound { path: PathBuf },

    #[error("Invalid generation config: {reason}")]
    InvalidConfig { reason: String },

    // Terrain-related errors
    #[error("Invalid height field: {reason}")]
    InvalidHeightField { reason: String },

    #[error("Image encoding or decoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type alias for all fallible operations
pub type SettlementResult<T> = Result<T, SettlementError>;

/// Flattens a `validator` report into a single `field: message` line.
pub(crate) fn describe_validation(errors: &validator::ValidationErrors) -> String {
    let mut details: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            format!("{field}: {}", messages.join(", "))
        })
        .collect();

    // nested structs report through `errors()` rather than `field_errors()`
    for (field, kind) in errors.errors() {
        if let validator::ValidationErrorsKind::Struct(inner) = kind {
            let inner = describe_validation(inner);
            details.extend(inner.split("; ").map(|line| format!("{field}.{line}")));
        }
    }

    details.sort();
    details.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settlement_error_display() {
        let err = SettlementError::InvalidHeightField {
            reason: "resolution must be at least 2".to_string(),
        };
        assert!(err.to_string().contains("Invalid height field"));

        let err = SettlementError::ConfigFileNotFound {
            path: PathBuf::from("/tmp/generation.toml"),
        };
        assert_eq!(
            err.to_string(),
            "Config file not found at path: /tmp/generation.toml"
        );
    }
}
