//! Runtime configuration loading

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{LossCutError, LossCutResult};

fn default_keyframe_cut() -> bool {
    true
}

/// Settings loadable from a TOML file; command-line flags override them
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory holding engine binaries in per-OS subdirectories
    #[serde(default)]
    pub tool_dir: Option<PathBuf>,

    /// Default output directory
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Snap cuts to keyframes by default
    #[serde(default = "default_keyframe_cut")]
    pub keyframe_cut: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool_dir: None,
            output_dir: None,
            keyframe_cut: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> LossCutResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| LossCutError::InvalidConfig {
            message: format!("{}: {}", path.display(), e),
        })?;
        toml::from_str(&text).map_err(|e| LossCutError::InvalidConfig {
            message: format!("{}: {}", path.display(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.tool_dir, None);
        assert!(config.keyframe_cut);
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tool_dir = \"/opt/engine\"").unwrap();
        writeln!(file, "keyframe_cut = false").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.tool_dir, Some(PathBuf::from("/opt/engine")));
        assert!(!config.keyframe_cut);
        assert_eq!(config.output_dir, None);
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tool_dir = [nonsense").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, LossCutError::InvalidConfig { .. }));
    }
}
