use std::path::{Path, PathBuf};

use tracing::debug;

use super::{DeviceTarget, FactBundle, FactsProvider};
use crate::error::CoreError;

/// Reads one JSON fact bundle per device from `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct FileFactsProvider {
    dir: PathBuf,
}

impl FileFactsProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Bundle path for a device name.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

impl FactsProvider for FileFactsProvider {
    async fn collect(&self, target: &DeviceTarget) -> Result<FactBundle, CoreError> {
        let path = self.path_for(&target.name);
        debug!(device = %target.name, path = %path.display(), "reading facts");

        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| CoreError::Facts {
                device: target.name.clone(),
                message: format!("{}: {e}", path.display()),
            })?;

        serde_json::from_str(&contents).map_err(|e| CoreError::Facts {
            device: target.name.clone(),
            message: format!("{}: {e}", path.display()),
        })
    }
}
