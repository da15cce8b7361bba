use crate::error::{Result, ShardError};
use flate2::read::GzDecoder;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::{debug, info, warn};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Where archive members end up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExtractPolicy {
    /// Every member goes under one directory.
    All { data_dir: PathBuf },
    /// `.jpg` members go to `images_dir`, `.json` members to `masks_dir`,
    /// everything else is dropped.
    Split {
        images_dir: PathBuf,
        masks_dir: PathBuf,
    },
}

impl ExtractPolicy {
    /// Destination directory for a member, or `None` if it should be discarded.
    pub fn route(&self, member: &Path) -> Option<&Path> {
        match self {
            ExtractPolicy::All { data_dir } => Some(data_dir),
            ExtractPolicy::Split {
                images_dir,
                masks_dir,
            } => {
                let name = member.to_string_lossy();
                if name.ends_with(".jpg") {
                    Some(images_dir)
                } else if name.ends_with(".json") {
                    Some(masks_dir)
                } else {
                    None
                }
            }
        }
    }

    pub fn destinations(&self) -> Vec<&Path> {
        match self {
            ExtractPolicy::All { data_dir } => vec![data_dir],
            ExtractPolicy::Split {
                images_dir,
                masks_dir,
            } => vec![images_dir, masks_dir],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractSummary {
    pub extracted: usize,
    pub discarded: usize,
}

pub struct Extractor;

impl Default for Extractor {
    fn default() -> Self {
        Self
    }
}

impl Extractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, archive_path: &Path, policy: &ExtractPolicy) -> Result<ExtractSummary> {
        let reader = open_archive(archive_path).map_err(|e| ShardError::archive(archive_path, e))?;
        let mut archive = Archive::new(reader);

        self.unpack_routed(&mut archive, policy)
            .map_err(|e| ShardError::archive(archive_path, e))
    }

    fn unpack_routed<R: Read>(
        &self,
        archive: &mut Archive<R>,
        policy: &ExtractPolicy,
    ) -> std::io::Result<ExtractSummary> {
        let mut summary = ExtractSummary::default();
        let keep_directories = matches!(policy, ExtractPolicy::All { .. });

        for entry in archive.entries()? {
            let mut entry = entry?;
            let entry_type = entry.header().entry_type();

            if entry_type.is_dir() && !keep_directories {
                continue;
            }

            let member = entry.path()?.into_owned();
            let Some(destination) = policy.route(&member) else {
                summary.discarded += 1;
                continue;
            };

            if entry.unpack_in(destination)? {
                if !entry_type.is_dir() {
                    summary.extracted += 1;
                }
            } else {
                warn!(member = %member.display(), "Skipping member outside the destination");
            }
        }

        debug!(
            extracted = summary.extracted,
            discarded = summary.discarded,
            "unpacked archive"
        );
        Ok(summary)
    }
}

/// Open an archive, transparently decompressing gzip by magic bytes.
fn open_archive(archive_path: &Path) -> std::io::Result<Box<dyn Read>> {
    let mut file = File::open(archive_path)?;
    if file.metadata()?.len() == 0 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "empty archive",
        ));
    }

    let mut magic = [0u8; 2];
    let is_gzip = match file.read_exact(&mut magic) {
        Ok(()) => magic == GZIP_MAGIC,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => false,
        Err(e) => return Err(e),
    };
    file.seek(SeekFrom::Start(0))?;

    let reader = BufReader::new(file);
    if is_gzip {
        Ok(Box::new(GzDecoder::new(reader)))
    } else {
        Ok(Box::new(reader))
    }
}

/// Unpack every member of `archive_path` under `data_dir`.
pub fn extract_all(archive_path: &Path, data_dir: &Path) -> Result<ExtractSummary> {
    let policy = ExtractPolicy::All {
        data_dir: data_dir.to_path_buf(),
    };
    Extractor::new().extract(archive_path, &policy)
}

/// Unpack `.jpg` members under `images_dir` and `.json` members under `masks_dir`.
pub fn extract_split(
    archive_path: &Path,
    images_dir: &Path,
    masks_dir: &Path,
) -> Result<ExtractSummary> {
    let policy = ExtractPolicy::Split {
        images_dir: images_dir.to_path_buf(),
        masks_dir: masks_dir.to_path_buf(),
    };
    Extractor::new().extract(archive_path, &policy)
}

/// Report the start and end of one extraction around `extract`.
pub fn extract_logged(
    file_name: &str,
    archive_path: &Path,
    policy: &ExtractPolicy,
) -> Result<ExtractSummary> {
    info!(file_name, "Extracting {file_name}...");
    let summary = Extractor::new().extract(archive_path, policy)?;
    info!(file_name, extracted = summary.extracted, "{file_name} extracted!");
    Ok(summary)
}
