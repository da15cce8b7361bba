use crate::error::{Result, ShardError};
use crate::utils::fs::is_plain_file_name;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

const DELIMITER: char = '\t';

/// One archive to fetch: the name it is cached under and where it comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub file_name: String,
    pub url: String,
}

/// Ordered list of archives read from a tab-separated manifest file.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Load a manifest from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ShardError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse manifest content. The first line is a header and is discarded.
    pub fn parse(content: &str) -> Result<Self> {
        let mut entries = Vec::new();

        for (index, raw) in content.lines().enumerate().skip(1) {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            entries.push(parse_line(line, index + 1)?);
        }

        Ok(Self { entries })
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ManifestEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// File names that appear more than once, in sorted order.
    pub fn duplicate_names(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut duplicates = BTreeSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.file_name.as_str()) {
                duplicates.insert(entry.file_name.clone());
            }
        }
        duplicates.into_iter().collect()
    }
}

fn parse_line(line: &str, line_number: usize) -> Result<ManifestEntry> {
    let malformed = || ShardError::MalformedLine {
        line: line_number,
        content: line.to_string(),
    };

    let (file_name, url) = line.split_once(DELIMITER).ok_or_else(malformed)?;
    let file_name = file_name.trim();
    let url = url.trim();

    if !is_plain_file_name(file_name) || url.is_empty() || url.contains(char::is_whitespace) {
        return Err(malformed());
    }

    Ok(ManifestEntry {
        file_name: file_name.to_string(),
        url: url.to_string(),
    })
}
