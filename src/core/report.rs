use crate::core::config::Config;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Downloaded,
    Skipped,
    Failed,
}

/// Outcome of one manifest entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntryReport {
    pub file_name: String,
    pub url: String,
    pub status: EntryStatus,
    pub bytes: u64,
    pub extracted: usize,
    pub discarded: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EntryReport {
    pub fn failed(file_name: &str, url: &str, error: String) -> Self {
        Self {
            file_name: file_name.to_string(),
            url: url.to_string(),
            status: EntryStatus::Failed,
            bytes: 0,
            extracted: 0,
            discarded: 0,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub entries: Vec<EntryReport>,
}

#[derive(Serialize)]
struct ReportFile<'a> {
    config: &'a Config,
    #[serde(flatten)]
    report: &'a RunReport,
    downloaded: usize,
    skipped: usize,
    failed: usize,
}

impl RunReport {
    pub fn count(&self, status: EntryStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries
            .iter()
            .filter(|e| e.status == EntryStatus::Failed)
    }

    pub fn to_json(&self, config: &Config) -> Result<String> {
        let file = ReportFile {
            config,
            report: self,
            downloaded: self.count(EntryStatus::Downloaded),
            skipped: self.count(EntryStatus::Skipped),
            failed: self.count(EntryStatus::Failed),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn write_json(&self, path: &Path, config: &Config) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                crate::utils::fs::ensure_dir_exists(parent)?;
            }
        }
        std::fs::write(path, self.to_json(config)?)?;
        Ok(())
    }
}
