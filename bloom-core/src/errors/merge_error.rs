//! Merge errors.

use super::ArtifactError;

/// Errors that abort a time-series merge.
///
/// Deletion failures during cleanup are deliberately not represented here:
/// they are reported per file on the merge report and never abort the merge.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("AOI directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No daily artifacts found for AOI '{aoi}' in {path}")]
    NoDailyArtifacts { aoi: String, path: String },

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),
}
