use crate::core::config::{Config, DEFAULT_INPUT_FILE, DEFAULT_PROCESSES, DEFAULT_RAW_DIR};
use crate::core::download::Fetcher;
use crate::core::extract::ExtractPolicy;
use crate::core::manifest::Manifest;
use crate::core::pool::Dispatcher;
use crate::core::report::RunReport;
use crate::error::{Result, ShardError};
use clap::Args;
use std::path::PathBuf;
use tracing::{info, warn};

/// Flags shared by both binaries.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Number of parallel workers used for downloading and extracting files
    #[clap(long, default_value_t = DEFAULT_PROCESSES, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    pub processes: usize,
    /// Path to the manifest containing file names and URLs
    #[clap(long = "input_file", default_value = DEFAULT_INPUT_FILE)]
    pub input_file: PathBuf,
    /// Directory to store downloaded archives
    #[clap(long = "raw_dir", default_value = DEFAULT_RAW_DIR)]
    pub raw_dir: PathBuf,
    /// Attempt every entry and report failures at the end instead of stopping at the first
    #[clap(long)]
    pub keep_going: bool,
    /// Write a JSON summary of the run to this path
    #[clap(long)]
    pub report: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Only log warnings and errors
    #[clap(short, long)]
    pub quiet: bool,
}

impl CommonArgs {
    pub fn into_config(self, policy: ExtractPolicy) -> Config {
        let mut config = Config::new(self.input_file, self.raw_dir, policy);
        config.processes = self.processes;
        config.keep_going = self.keep_going;
        config.report = self.report;
        config
    }
}

/// Read the manifest, fetch and unpack every entry, and write the optional report.
pub fn run(config: &Config) -> Result<RunReport> {
    config.validate()?;

    let manifest = Manifest::load(&config.input_file)?;
    for name in manifest.duplicate_names() {
        warn!(file_name = %name, "{name} appears more than once in the manifest");
    }
    info!(
        entries = manifest.len(),
        processes = config.processes,
        "Processing {} entries from {}",
        manifest.len(),
        config.input_file.display()
    );

    config.prepare_dirs()?;

    let dispatcher = Dispatcher::new(config, Fetcher::new()?)?;
    let report = dispatcher.run(manifest.into_entries())?;

    if let Some(path) = &config.report {
        report.write_json(path, config)?;
        info!(path = %path.display(), "Wrote run report");
    }

    let failed = report.failures().count();
    if failed > 0 {
        return Err(ShardError::BatchFailed {
            failed,
            total: report.entries.len(),
        });
    }

    Ok(report)
}
