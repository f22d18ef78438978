//! Output location configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where artifacts are written.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory for per-AOI hotspot artifacts. Default: `outputs/hotspots`.
    pub hotspots_dir: Option<PathBuf>,
    /// Publish directory for the consumer-facing merged artifact. Default: `web`.
    pub publish_dir: Option<PathBuf>,
}

impl OutputConfig {
    /// Effective hotspots root, defaulting to `outputs/hotspots`.
    pub fn effective_hotspots_dir(&self) -> PathBuf {
        self.hotspots_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("outputs").join("hotspots"))
    }

    /// Effective publish directory, defaulting to `web`.
    pub fn effective_publish_dir(&self) -> PathBuf {
        self.publish_dir.clone().unwrap_or_else(|| PathBuf::from("web"))
    }

    /// Directory holding one AOI's daily artifacts.
    pub fn aoi_dir(&self, aoi: &str) -> PathBuf {
        self.effective_hotspots_dir().join(aoi)
    }
}

impl OutputConfig {
    /// Rebase both directories under `root` (used by tests and embedders).
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            hotspots_dir: Some(root.join("outputs").join("hotspots")),
            publish_dir: Some(root.join("web")),
        }
    }
}
