use crate::core::config::Config;
use crate::core::download::{FetchOutcome, Fetcher};
use crate::core::extract::{extract_logged, ExtractPolicy};
use crate::core::manifest::ManifestEntry;
use crate::core::report::{EntryReport, EntryStatus, RunReport};
use crate::error::{Result, ShardError};
use chrono::Utc;
use rayon::iter::{ParallelBridge, ParallelIterator};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::path::PathBuf;
use tracing::{info_span, warn};

/// A manifest entry plus everything a worker needs to process it.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub index: usize,
    pub entry: ManifestEntry,
    pub raw_dir: PathBuf,
    pub policy: ExtractPolicy,
}

impl WorkItem {
    /// Fetch, then extract.
    pub fn process(&self, fetcher: &Fetcher) -> Result<EntryReport> {
        let ManifestEntry { file_name, url } = &self.entry;

        let outcome = fetcher.fetch(file_name, url, &self.raw_dir)?;
        let summary = extract_logged(file_name, outcome.path(), &self.policy)?;

        let (status, bytes) = match outcome {
            FetchOutcome::Downloaded { bytes, .. } => (EntryStatus::Downloaded, bytes),
            FetchOutcome::Skipped(_) => (EntryStatus::Skipped, 0),
        };

        Ok(EntryReport {
            file_name: file_name.clone(),
            url: url.clone(),
            status,
            bytes,
            extracted: summary.extracted,
            discarded: summary.discarded,
            error: None,
        })
    }
}

/// Runs work items on a fixed-size pool of worker threads.
pub struct Dispatcher {
    pool: ThreadPool,
    fetcher: Fetcher,
    raw_dir: PathBuf,
    policy: ExtractPolicy,
    keep_going: bool,
}

impl Dispatcher {
    pub fn new(config: &Config, fetcher: Fetcher) -> Result<Self> {
        config.validate()?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(config.processes)
            .thread_name(|i| format!("worker-{i}"))
            .build()
            .map_err(|e| ShardError::Pool {
                message: e.to_string(),
            })?;

        Ok(Self {
            pool,
            fetcher,
            raw_dir: config.raw_dir.clone(),
            policy: config.policy.clone(),
            keep_going: config.keep_going,
        })
    }

    pub fn work_items(&self, entries: Vec<ManifestEntry>) -> Vec<WorkItem> {
        entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| WorkItem {
                index,
                entry,
                raw_dir: self.raw_dir.clone(),
                policy: self.policy.clone(),
            })
            .collect()
    }

    /// Process every entry and block until all are done.
    ///
    /// Items are handed to workers in manifest order. Unless `keep_going` is
    /// set, the first failure stops any further items from starting and is
    /// returned wrapped with the failing file name. With `keep_going`, every
    /// item is attempted and failures are recorded in the report instead.
    pub fn run(&self, entries: Vec<ManifestEntry>) -> Result<RunReport> {
        let started_at = Utc::now();
        let items = self.work_items(entries);
        let fetcher = &self.fetcher;
        let keep_going = self.keep_going;

        let mut reports: Vec<(usize, EntryReport)> = self.pool.install(|| {
            items
                .into_iter()
                .par_bridge()
                .map(|item| {
                    let span = info_span!("entry", file_name = %item.entry.file_name);
                    let _guard = span.enter();

                    match item.process(fetcher) {
                        Ok(report) => Ok((item.index, report)),
                        Err(e) if keep_going => {
                            warn!(error = %e, "{} failed", item.entry.file_name);
                            let report = EntryReport::failed(
                                &item.entry.file_name,
                                &item.entry.url,
                                e.to_string(),
                            );
                            Ok((item.index, report))
                        }
                        Err(e) => Err(e.for_entry(&item.entry.file_name)),
                    }
                })
                .collect::<Result<Vec<_>>>()
        })?;

        reports.sort_by_key(|(index, _)| *index);

        Ok(RunReport {
            started_at,
            finished_at: Utc::now(),
            entries: reports.into_iter().map(|(_, report)| report).collect(),
        })
    }
}
