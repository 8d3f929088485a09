mod aggregate;
mod config;
mod massif;
mod pipeline;
mod report;
mod row;
mod scan;
mod timing;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Collect massif snapshots and `time` outputs from repeated benchmark runs
/// into one CSV row per run configuration.
#[derive(Parser, Debug)]
#[command(name = "benchsheet", version, about)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "benchsheet.toml")]
    config: PathBuf,

    /// Directory holding the .massif and .time files (overrides config)
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// CSV file to write (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Run-key substring that marks strings-mode runs (overrides config)
    #[arg(long)]
    strings_marker: Option<String>,

    /// List the classified input files and resolved settings, don't extract or write
    #[arg(long)]
    dry_run: bool,

    /// Extra logging (skipped files, per-file values)
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }

    /// Apply command-line overrides on top of the loaded config.
    fn apply(&self, cfg: &mut config::SheetConfig) {
        if let Some(dir) = &self.input_dir {
            cfg.input.dir = dir.clone();
        }
        if let Some(path) = &self.output {
            cfg.output.path = path.clone();
        }
        if let Some(marker) = &self.strings_marker {
            cfg.rows.strings_marker = marker.clone();
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .init();

    tracing::debug!(?cli, "parsed CLI arguments");

    let mut cfg = config::load_config(&cli.config);
    cli.apply(&mut cfg);

    if cli.dry_run {
        return dry_run(&cfg);
    }

    match pipeline::run(&cfg) {
        Ok(summary) => {
            println!(
                "done! wrote {} rows to {} ({} massif, {} timing files)",
                summary.rows,
                summary.output.display(),
                summary.massif_files,
                summary.timing_files
            );
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e),
    }
}

fn dry_run(cfg: &config::SheetConfig) -> ExitCode {
    println!("Input directory: {}", cfg.input.dir.display());
    println!(
        "Massif extension: .{}   timing marker: {:?}",
        cfg.input.massif_suffix, cfg.input.timing_marker
    );
    println!("Strings marker: {:?}", cfg.rows.strings_marker);
    println!("Output: {}", cfg.output.path.display());

    match pipeline::plan(cfg) {
        Ok(artifacts) => {
            for a in &artifacts {
                println!("  {:<7} {:<24} {}", a.kind, a.run_key, a.path.display());
            }
            println!("Dry run: {} files classified, nothing written.", artifacts.len());
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e),
    }
}

/// Log the error and its causes once (the subscriber writes to stderr),
/// then fail the process.
fn report_error(e: &dyn std::error::Error) -> ExitCode {
    tracing::error!("{}", error_chain(e));
    ExitCode::FAILURE
}

/// `outer: cause: root cause` on one line.
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    message
}
