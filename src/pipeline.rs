//! The full run: scan the input directory, extract every artifact, group by
//! run key, build rows and write the CSV. Any extraction failure aborts the
//! run before the output file is touched.

use crate::aggregate::Aggregator;
use crate::config::SheetConfig;
use crate::massif::{self, MassifError};
use crate::report;
use crate::row::{self, Row, RowError};
use crate::scan::{self, Artifact, ArtifactKind};
use crate::timing::{self, TimingError};
use std::path::{Path, PathBuf};

/// Outcome of a completed run.
#[derive(Debug)]
pub struct Summary {
    pub massif_files: usize,
    pub timing_files: usize,
    pub rows: usize,
    pub output: PathBuf,
}

/// Read and extract every artifact into an aggregator.
pub fn collect(artifacts: &[Artifact]) -> Result<Aggregator, RunError> {
    let mut agg = Aggregator::new();
    for artifact in artifacts {
        let text = std::fs::read_to_string(&artifact.path).map_err(|e| RunError::Io {
            path: artifact.path.clone(),
            source: e,
        })?;
        match artifact.kind {
            ArtifactKind::Massif => {
                let bytes = massif::peak_mem(&text).map_err(|e| RunError::Massif {
                    path: artifact.path.clone(),
                    source: e,
                })?;
                tracing::debug!(run_key = %artifact.run_key, bytes, "peak memory");
                agg.record_peak_mem(&artifact.run_key, bytes);
            }
            ArtifactKind::Timing => {
                let sample = timing::parse_timing(&text).map_err(|e| RunError::Timing {
                    path: artifact.path.clone(),
                    source: e,
                })?;
                tracing::debug!(
                    run_key = %artifact.run_key,
                    real = sample.real,
                    user = sample.user,
                    sys = sample.sys,
                    "timing sample"
                );
                agg.record_timing(&artifact.run_key, sample);
            }
        }
    }
    tracing::debug!(runs = agg.len(), "aggregated artifacts");
    Ok(agg)
}

/// One row per run key, in first-seen order.
pub fn build_rows(agg: Aggregator, strings_marker: &str) -> Result<Vec<Row>, RunError> {
    agg.into_runs()
        .into_iter()
        .map(|(run_key, bag)| {
            row::build_row(&run_key, &bag, strings_marker)
                .map_err(|e| RunError::Row { run_key, source: e })
        })
        .collect()
}

/// Scan only; used by `--dry-run`.
pub fn plan(config: &SheetConfig) -> Result<Vec<Artifact>, RunError> {
    scan::scan_dir(&config.input.dir, &config.input).map_err(|e| RunError::Io {
        path: config.input.dir.clone(),
        source: e,
    })
}

pub fn run(config: &SheetConfig) -> Result<Summary, RunError> {
    let artifacts = plan(config)?;
    let massif_files = count_kind(&artifacts, ArtifactKind::Massif);
    let timing_files = count_kind(&artifacts, ArtifactKind::Timing);
    tracing::info!(
        dir = %config.input.dir.display(),
        massif_files,
        timing_files,
        "scanned input directory"
    );

    let agg = collect(&artifacts)?;
    let rows = build_rows(agg, &config.rows.strings_marker)?;
    write_output(&config.output.path, &rows)?;
    tracing::info!(rows = rows.len(), path = %config.output.path.display(), "wrote results");

    Ok(Summary {
        massif_files,
        timing_files,
        rows: rows.len(),
        output: config.output.path.clone(),
    })
}

fn write_output(path: &Path, rows: &[Row]) -> Result<(), RunError> {
    report::write_csv(path, rows).map_err(|e| RunError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn count_kind(artifacts: &[Artifact], kind: ArtifactKind) -> usize {
    artifacts.iter().filter(|a| a.kind == kind).count()
}

#[derive(Debug)]
pub enum RunError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Massif {
        path: PathBuf,
        source: MassifError,
    },
    Timing {
        path: PathBuf,
        source: TimingError,
    },
    Row {
        run_key: String,
        source: RowError,
    },
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Io { path, .. } => write!(f, "I/O error on {}", path.display()),
            RunError::Massif { path, .. } => {
                write!(f, "failed to extract peak memory from {}", path.display())
            }
            RunError::Timing { path, .. } => {
                write!(f, "failed to extract timings from {}", path.display())
            }
            RunError::Row { run_key, .. } => write!(f, "cannot build row for run {run_key:?}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Io { source, .. } => Some(source),
            RunError::Massif { source, .. } => Some(source),
            RunError::Timing { source, .. } => Some(source),
            RunError::Row { source, .. } => Some(source),
        }
    }
}
