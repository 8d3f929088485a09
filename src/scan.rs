//! Input directory scan: classify benchmark artifacts by file extension.
//!
//! `<run key>.massif` files go to the peak-memory extractor and any
//! extension containing the timing marker (`.time`, `.runtime`, `.times`, ...) goes
//! to the timing extractor. Everything else is ignored.
use crate::config::InputConfig;
use std::path::{Path, PathBuf};

/// Which extractor an artifact is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Massif,
    Timing,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            ArtifactKind::Massif => "massif",
            ArtifactKind::Timing => "timing",
        })
    }
}

/// A classified input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
    /// File name without its last extension.
    pub run_key: String,
}

/// Classify a single path by its last extension. Returns `None` for paths
/// that are not benchmark artifacts.
pub fn classify(path: &Path, rules: &InputConfig) -> Option<Artifact> {
    let extension = path.extension()?.to_str()?;
    let kind = if extension == rules.massif_suffix {
        ArtifactKind::Massif
    } else if extension.contains(&rules.timing_marker) {
        ArtifactKind::Timing
    } else {
        return None;
    };
    let run_key = path.file_stem()?.to_str()?.to_string();
    Some(Artifact {
        path: path.to_path_buf(),
        kind,
        run_key,
    })
}

/// List the artifacts directly inside `dir`, sorted by file name.
///
/// Subdirectories are not descended into. Entries that are not regular
/// files are skipped even if their names match.
pub fn scan_dir(dir: &Path, rules: &InputConfig) -> std::io::Result<Vec<Artifact>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() {
            tracing::debug!(path = %path.display(), "skipping non-file entry");
            continue;
        }
        paths.push(path);
    }
    paths.sort();

    let mut artifacts = Vec::with_capacity(paths.len());
    for path in paths {
        match classify(&path, rules) {
            Some(artifact) => artifacts.push(artifact),
            None => tracing::debug!(path = %path.display(), "ignoring unrecognized file"),
        }
    }
    Ok(artifacts)
}
