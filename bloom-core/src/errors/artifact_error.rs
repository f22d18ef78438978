//! Artifact I/O errors.

/// Errors raised while reading or writing GeoJSON artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Failed to read artifact {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("Failed to write artifact {path}: {message}")]
    WriteFailed { path: String, message: String },

    #[error("Malformed artifact {path}: {message}")]
    Malformed { path: String, message: String },
}
