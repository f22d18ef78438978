//! Merge of daily artifacts into one time-series artifact.
//!
//! The merger discovers `{aoi}_hotspots_YYYY-MM-DD.geojson` files, stitches
//! their features into a single FeatureCollection in chronological order,
//! writes an audit copy next to the dailies and a publish copy for
//! consumers, validates both, and only then deletes the dailies. Deletion
//! is best-effort; a file that cannot be removed is reported, never fatal.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use bloom_core::config::{BloomConfig, OutputConfig};
use bloom_core::errors::{ArtifactError, MergeError};

use crate::artifact;

/// Outcome of one merge, including the cleanup tally.
#[derive(Debug)]
pub struct MergeReport {
    /// Number of daily artifacts merged.
    pub merged_files: usize,
    /// Features in the merged artifact.
    pub total_features: usize,
    /// Audit copy, next to the daily artifacts.
    pub audit_path: PathBuf,
    /// Consumer-facing copy in the publish directory.
    pub publish_path: PathBuf,
    /// Daily artifacts removed after validation.
    pub deleted: Vec<PathBuf>,
    /// Daily artifacts that survived cleanup, with the failure reason.
    pub delete_failures: Vec<(PathBuf, String)>,
}

/// Merges an AOI's daily artifacts into the time-series artifact.
#[derive(Debug, Clone)]
pub struct TimeSeriesMerger {
    output: OutputConfig,
}

impl TimeSeriesMerger {
    pub fn new(config: &BloomConfig) -> Self {
        Self {
            output: config.output.clone(),
        }
    }

    /// Merge all daily artifacts for `aoi`.
    ///
    /// Any unreadable or malformed daily aborts the merge before anything
    /// is written or deleted. Dailies are removed only after both output
    /// copies exist and validate.
    pub fn merge(&self, aoi: &str) -> Result<MergeReport, MergeError> {
        let dir = self.output.aoi_dir(aoi);
        if !dir.is_dir() {
            return Err(MergeError::DirectoryNotFound {
                path: dir.display().to_string(),
            });
        }

        let daily_paths = discover_daily_artifacts(&dir, aoi)?;
        if daily_paths.is_empty() {
            return Err(MergeError::NoDailyArtifacts {
                aoi: aoi.to_string(),
                path: dir.display().to_string(),
            });
        }

        tracing::info!(aoi, files = daily_paths.len(), "merging daily artifacts");

        // Read everything up front; a single bad daily aborts the merge.
        let mut crs: Option<Value> = None;
        let mut features: Vec<Value> = Vec::new();
        for path in &daily_paths {
            let collection = artifact::read_feature_collection(path)?;
            if crs.is_none() {
                crs = collection.get("crs").filter(|v| !v.is_null()).cloned();
            }
            let file_date = artifact::date_from_filename(path);
            for feature in artifact::features(&collection) {
                features.push(with_date(feature.clone(), file_date.as_deref()));
            }
        }

        let merged = json!({
            "type": "FeatureCollection",
            "name": format!("{aoi}_hotspots_timeseries"),
            "crs": crs.unwrap_or_else(artifact::default_crs),
            "features": features
        });
        let total_features = artifact::features(&merged).len();

        let filename = artifact::timeseries_artifact_name(aoi);
        let audit_path = dir.join(&filename);
        let publish_path = self.output.effective_publish_dir().join(&filename);

        artifact::write_feature_collection(&audit_path, &merged)?;
        artifact::write_feature_collection(&publish_path, &merged)?;
        validate_written(&audit_path, total_features)?;
        validate_written(&publish_path, total_features)?;

        // Both copies are on disk and valid; the dailies are now redundant.
        let (deleted, delete_failures) = delete_dailies(daily_paths);

        tracing::info!(
            aoi,
            features = total_features,
            deleted = deleted.len(),
            delete_failures = delete_failures.len(),
            audit = %audit_path.display(),
            publish = %publish_path.display(),
            "merge complete"
        );

        Ok(MergeReport {
            merged_files: deleted.len() + delete_failures.len(),
            total_features,
            audit_path,
            publish_path,
            deleted,
            delete_failures,
        })
    }
}

/// Find daily artifacts for one AOI, sorted chronologically (the ISO date
/// suffix makes lexicographic order chronological).
fn discover_daily_artifacts(dir: &Path, aoi: &str) -> Result<Vec<PathBuf>, MergeError> {
    let pattern = format!(
        "{}/{}_hotspots_????-??-??.geojson",
        glob::Pattern::escape(&dir.display().to_string()),
        glob::Pattern::escape(aoi)
    );
    let entries = glob::glob(&pattern).map_err(|e| {
        MergeError::Artifact(ArtifactError::ReadFailed {
            path: dir.display().to_string(),
            message: e.to_string(),
        })
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => {
                return Err(MergeError::Artifact(ArtifactError::ReadFailed {
                    path: e.path().display().to_string(),
                    message: e.to_string(),
                }))
            }
        }
    }
    paths.sort();
    Ok(paths)
}

/// Remove merged daily artifacts, best-effort.
///
/// A path that cannot be removed is reported with its failure reason and
/// never stops the remaining deletions.
fn delete_dailies(paths: Vec<PathBuf>) -> (Vec<PathBuf>, Vec<(PathBuf, String)>) {
    let mut deleted = Vec::new();
    let mut failures = Vec::new();
    for path in paths {
        match std::fs::remove_file(&path) {
            Ok(()) => deleted.push(path),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to delete daily artifact");
                failures.push((path, e.to_string()));
            }
        }
    }
    (deleted, failures)
}

/// Back-fill a feature's `properties.date` from the filename when absent.
/// Features that already carry a date keep it untouched.
fn with_date(mut feature: Value, file_date: Option<&str>) -> Value {
    let Some(date) = file_date else {
        return feature;
    };
    if let Some(props) = feature.get_mut("properties").and_then(Value::as_object_mut) {
        let missing = match props.get("date") {
            None | Some(Value::Null) => true,
            Some(_) => false,
        };
        if missing {
            props.insert("date".to_string(), Value::String(date.to_string()));
        }
    }
    feature
}

/// Read a just-written artifact back and check the feature count.
fn validate_written(path: &Path, expected_features: usize) -> Result<(), MergeError> {
    let value = artifact::read_feature_collection(path)?;
    let found = artifact::features(&value).len();
    if found != expected_features {
        return Err(MergeError::Artifact(ArtifactError::Malformed {
            path: path.display().to_string(),
            message: format!("expected {expected_features} features, found {found}"),
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_date_backfills_missing() {
        let feature = json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [105.0, 22.8]},
            "properties": {"bloom_probability": 0.9}
        });
        let out = with_date(feature, Some("2025-10-15"));
        assert_eq!(out["properties"]["date"], "2025-10-15");
    }

    #[test]
    fn test_with_date_backfills_null() {
        let feature = json!({"properties": {"date": null}});
        let out = with_date(feature, Some("2025-10-16"));
        assert_eq!(out["properties"]["date"], "2025-10-16");
    }

    #[test]
    fn test_with_date_keeps_existing() {
        let feature = json!({"properties": {"date": "2025-01-01"}});
        let out = with_date(feature, Some("2025-10-16"));
        assert_eq!(out["properties"]["date"], "2025-01-01");
    }

    #[test]
    fn test_blocked_deletion_is_reported_not_fatal() {
        let root = tempfile::TempDir::new().unwrap();
        let removable = root.path().join("AOI_hotspots_2025-10-15.geojson");
        std::fs::write(&removable, "{}").unwrap();
        // remove_file refuses a directory, standing in for a locked file.
        let blocked = root.path().join("AOI_hotspots_2025-10-16.geojson");
        std::fs::create_dir(&blocked).unwrap();

        let (deleted, failures) = delete_dailies(vec![removable.clone(), blocked.clone()]);
        assert_eq!(deleted, vec![removable.clone()]);
        assert!(!removable.exists());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, blocked);
        assert!(!failures[0].1.is_empty());
        assert!(blocked.exists());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let mut config = BloomConfig::default();
        config.output.hotspots_dir = Some(PathBuf::from("/nonexistent/hotspots"));
        let merger = TimeSeriesMerger::new(&config);
        assert!(matches!(
            merger.merge("AOI"),
            Err(MergeError::DirectoryNotFound { .. })
        ));
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let root = tempfile::TempDir::new().unwrap();
        let mut config = BloomConfig::default();
        config.output = OutputConfig::rooted_at(root.path());
        std::fs::create_dir_all(config.output.aoi_dir("AOI")).unwrap();
        let merger = TimeSeriesMerger::new(&config);
        assert!(matches!(
            merger.merge("AOI"),
            Err(MergeError::NoDailyArtifacts { .. })
        ));
    }
}
