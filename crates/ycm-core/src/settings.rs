use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::Result;

pub const SETTINGS_FILE_NAME: &str = "ycm-bridge.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Explicit interpreter for the completion server. Skips discovery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_to_python_27: Option<PathBuf>,

    /// Commands tried on `PATH`, in order, when no explicit path is set.
    #[serde(default = "default_python_candidates")]
    pub python_candidates: Vec<String>,
}

fn default_python_candidates() -> Vec<String> {
    vec!["python2".to_string(), "python".to_string()]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            path_to_python_27: None,
            python_candidates: default_python_candidates(),
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&data)?;
        Ok(settings)
    }

    /// Write settings as YAML, replacing `path` atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let dir = path.parent().unwrap_or(Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(data.as_bytes())?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}
