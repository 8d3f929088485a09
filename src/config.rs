use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level configuration loaded from benchsheet.toml.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SheetConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub rows: RowsConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Directory holding the benchmark artifacts (not searched recursively).
    pub dir: PathBuf,
    /// Extension of massif snapshot files, without the dot.
    pub massif_suffix: String,
    /// Any extension containing this substring is a timing file.
    pub timing_marker: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RowsConfig {
    /// Run keys containing this (case-sensitive) marker are in `strings` mode.
    pub strings_marker: String,
}

// --- Default implementations ---

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("out"),
            massif_suffix: "massif".to_string(),
            timing_marker: "time".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("results.csv"),
        }
    }
}

impl Default for RowsConfig {
    fn default() -> Self {
        Self {
            strings_marker: "STRINGS".to_string(),
        }
    }
}

/// Load config from `path`, or defaults when the file is absent.
///
/// An unreadable or malformed file is logged and replaced by defaults.
pub fn load_config(path: &Path) -> SheetConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!("failed to parse {}: {e}", path.display());
                SheetConfig::default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => SheetConfig::default(),
        Err(e) => {
            tracing::warn!("failed to read {}: {e}", path.display());
            SheetConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let cfg = SheetConfig::default();
        assert_eq!(cfg.input.dir, PathBuf::from("out"));
        assert_eq!(cfg.input.massif_suffix, "massif");
        assert_eq!(cfg.input.timing_marker, "time");
        assert_eq!(cfg.output.path, PathBuf::from("results.csv"));
        assert_eq!(cfg.rows.strings_marker, "STRINGS");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let cfg = load_config(&dir.path().join("benchsheet.toml"));
        assert_eq!(cfg, SheetConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("benchsheet.toml");
        std::fs::write(
            &path,
            "[input]\ndir = \"runs\"\n\n[rows]\nstrings_marker = \"STR\"\n",
        )
        .unwrap();
        let cfg = load_config(&path);
        assert_eq!(cfg.input.dir, PathBuf::from("runs"));
        assert_eq!(cfg.input.massif_suffix, "massif");
        assert_eq!(cfg.rows.strings_marker, "STR");
        assert_eq!(cfg.output.path, PathBuf::from("results.csv"));
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("benchsheet.toml");
        std::fs::write(&path, "[input\ndir = ").unwrap();
        assert_eq!(load_config(&path), SheetConfig::default());
    }
}
