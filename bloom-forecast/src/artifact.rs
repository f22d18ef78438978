//! GeoJSON artifact reading and writing.
//!
//! Daily artifacts are self-contained FeatureCollections keyed by AOI and
//! date: `{AOI}_hotspots_{YYYY-MM-DD}.geojson`. The read path keeps
//! features as raw `serde_json` values so merging preserves every original
//! attribute untouched.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde_json::{json, Map, Value};

use bloom_core::errors::ArtifactError;
use bloom_core::types::HotspotRecord;

/// Default coordinate-reference block for newly written artifacts.
/// Merged artifacts carry the source block through instead.
pub fn default_crs() -> Value {
    json!({
        "type": "name",
        "properties": {
            "name": "urn:ogc:def:crs:OGC:1.3:CRS84"
        }
    })
}

/// Daily artifact filename for one AOI and date.
pub fn daily_artifact_name(aoi: &str, date: NaiveDate) -> String {
    format!("{aoi}_hotspots_{date}.geojson")
}

/// Filename of the merged time-series artifact for one AOI.
pub fn timeseries_artifact_name(aoi: &str) -> String {
    format!("{aoi}_hotspots_timeseries.geojson")
}

/// Extract the `YYYY-MM-DD` date from a daily artifact filename.
pub fn date_from_filename(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let candidate = stem.rsplit('_').next()?;
    NaiveDate::parse_from_str(candidate, "%Y-%m-%d").ok()?;
    Some(candidate.to_string())
}

/// JSON number, or null for non-finite values (NaN from a failed Gi* batch).
fn num_or_null(v: f64) -> Value {
    serde_json::Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

/// Feature properties for one record: the full Hotspot Record schema plus
/// the `date` string.
fn record_properties(r: &HotspotRecord) -> Map<String, Value> {
    let mut props = Map::new();
    props.insert("lon".into(), num_or_null(r.lon));
    props.insert("lat".into(), num_or_null(r.lat));
    props.insert("bloom_probability".into(), num_or_null(r.bloom_probability));
    props.insert("date".into(), Value::String(r.date.format("%Y-%m-%d").to_string()));
    props.insert("gi_star_z".into(), num_or_null(r.gi_star_z));
    props.insert("gi_star_p".into(), num_or_null(r.gi_star_p));
    props.insert("gi_star_significant".into(), Value::Bool(r.gi_star_significant));
    props.insert("hotspot_type".into(), Value::String(r.hotspot_type.as_str().to_string()));
    props.insert("cluster_id".into(), Value::Number(r.cluster_id.into()));
    props.insert("is_noise".into(), Value::Bool(r.is_noise));
    props.insert("combined_score".into(), num_or_null(r.combined_score));
    props.insert(
        "hotspot_rank".into(),
        r.hotspot_rank.map(|n| Value::Number(n.into())).unwrap_or(Value::Null),
    );
    props
}

/// Build the FeatureCollection value for one day's records.
pub fn daily_feature_collection(aoi: &str, date: NaiveDate, records: &[HotspotRecord]) -> Value {
    let features: Vec<Value> = records
        .iter()
        .map(|r| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [r.lon, r.lat]
                },
                "properties": Value::Object(record_properties(r))
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "name": format!("{aoi}_hotspots_{date}"),
        "crs": default_crs(),
        "features": features
    })
}

/// Write a daily artifact into `dir`, creating the directory if needed.
/// Returns the written path.
pub fn write_daily_artifact(
    dir: &Path,
    aoi: &str,
    date: NaiveDate,
    records: &[HotspotRecord],
) -> Result<PathBuf, ArtifactError> {
    let path = dir.join(daily_artifact_name(aoi, date));
    let collection = daily_feature_collection(aoi, date, records);
    write_feature_collection(&path, &collection)?;
    Ok(path)
}

/// Serialize a FeatureCollection value to `path` (pretty-printed, like the
/// downstream consumers expect).
pub fn write_feature_collection(path: &Path, collection: &Value) -> Result<(), ArtifactError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ArtifactError::WriteFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    }
    let content =
        serde_json::to_string_pretty(collection).map_err(|e| ArtifactError::WriteFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    std::fs::write(path, content).map_err(|e| ArtifactError::WriteFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Read a FeatureCollection as a raw JSON value.
pub fn read_feature_collection(path: &Path) -> Result<Value, ArtifactError> {
    let content = std::fs::read_to_string(path).map_err(|e| ArtifactError::ReadFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|e| ArtifactError::Malformed {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    if value.get("features").and_then(Value::as_array).is_none() {
        return Err(ArtifactError::Malformed {
            path: path.display().to_string(),
            message: "missing 'features' array".to_string(),
        });
    }
    Ok(value)
}

/// Features array of a collection value read by `read_feature_collection`.
pub fn features(collection: &Value) -> &[Value] {
    collection
        .get("features")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use bloom_core::types::PointPrediction;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 15).unwrap()
    }

    fn record(prob: f64) -> HotspotRecord {
        HotspotRecord::from_prediction(&PointPrediction {
            lon: 105.0,
            lat: 22.8,
            bloom_probability: prob,
            date: date(),
        })
    }

    #[test]
    fn test_naming_convention() {
        assert_eq!(
            daily_artifact_name("Ha_Giang_TamGiacMach", date()),
            "Ha_Giang_TamGiacMach_hotspots_2025-10-15.geojson"
        );
        assert_eq!(
            timeseries_artifact_name("Ha_Giang_TamGiacMach"),
            "Ha_Giang_TamGiacMach_hotspots_timeseries.geojson"
        );
    }

    #[test]
    fn test_date_from_filename() {
        let p = PathBuf::from("out/Ha_Giang_hotspots_2025-10-15.geojson");
        assert_eq!(date_from_filename(&p).unwrap(), "2025-10-15");
        let bad = PathBuf::from("out/Ha_Giang_hotspots_timeseries.geojson");
        assert_eq!(date_from_filename(&bad), None);
    }

    #[test]
    fn test_nan_serializes_as_null() {
        let r = record(0.9); // fresh records carry NaN z/p
        let props = record_properties(&r);
        assert_eq!(props["gi_star_z"], Value::Null);
        assert_eq!(props["gi_star_p"], Value::Null);
        assert_eq!(props["hotspot_rank"], Value::Null);
        assert_eq!(props["bloom_probability"], json!(0.9));
    }

    #[test]
    fn test_collection_shape() {
        let collection = daily_feature_collection("AOI", date(), &[record(0.8)]);
        assert_eq!(collection["type"], "FeatureCollection");
        assert_eq!(collection["name"], "AOI_hotspots_2025-10-15");
        assert_eq!(
            collection["crs"]["properties"]["name"],
            "urn:ogc:def:crs:OGC:1.3:CRS84"
        );
        let feats = features(&collection);
        assert_eq!(feats.len(), 1);
        assert_eq!(feats[0]["geometry"]["coordinates"][0], json!(105.0));
        assert_eq!(feats[0]["properties"]["date"], "2025-10-15");
    }

    #[test]
    fn test_write_and_read_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_daily_artifact(dir.path(), "AOI", date(), &[record(0.8)]).unwrap();
        let value = read_feature_collection(&path).unwrap();
        assert_eq!(features(&value).len(), 1);
    }

    #[test]
    fn test_malformed_artifact_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.geojson");
        std::fs::write(&path, "{\"type\": \"FeatureCollection\"}").unwrap();
        assert!(matches!(
            read_feature_collection(&path),
            Err(ArtifactError::Malformed { .. })
        ));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = read_feature_collection(Path::new("/nonexistent/x.geojson")).unwrap_err();
        match err {
            ArtifactError::ReadFailed { path, .. } => assert!(path.contains("x.geojson")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
