//! Optional `tfla.toml` in the input directory

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tfla_parser::terraform::DEFAULT_SKIP_DIRS;
use tfla_render::{ColorBy, Layout};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "tfla.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings for one run. Every field has a default; command-line flags take
/// precedence over the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TflaConfig {
    pub include_resources: bool,
    pub layout: Layout,
    pub color_by: ColorBy,
    /// Directory names skipped during discovery.
    pub skip_dirs: Vec<String>,
}

impl Default for TflaConfig {
    fn default() -> Self {
        TflaConfig {
            include_resources: false,
            layout: Layout::default(),
            color_by: ColorBy::default(),
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Load `tfla.toml` from `input_root`. A missing file yields the defaults.
pub fn load_config(input_root: &Path) -> Result<TflaConfig, ConfigError> {
    let path = input_root.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(TflaConfig::default());
    }

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let config = toml::from_str::<TflaConfig>(&content)
        .map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
    tracing::debug!("Loaded {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config(temp_dir.path()).unwrap();
        assert_eq!(config, TflaConfig::default());
        assert_eq!(config.skip_dirs, vec![".terraform".to_string()]);
    }

    #[test]
    fn test_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "include_resources = true\ncolor_by = \"environment\"\n",
        )
        .unwrap();

        let config = load_config(temp_dir.path()).unwrap();
        assert!(config.include_resources);
        assert_eq!(config.color_by, ColorBy::Environment);
        assert_eq!(config.layout, Layout::Hierarchical);
        assert_eq!(config.skip_dirs, vec![".terraform".to_string()]);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "layout = \"circular\"\n").unwrap();

        let err = load_config(temp_dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
