use crate::core::extract::ExtractPolicy;
use crate::error::{Result, ShardError};
use crate::utils::fs;
use serde::Serialize;
use std::path::PathBuf;

pub const DEFAULT_PROCESSES: usize = 4;
pub const DEFAULT_INPUT_FILE: &str = "sa1b.txt";
pub const DEFAULT_RAW_DIR: &str = "raw";

/// Settings for one batch run, built once at startup.
#[derive(Debug, Serialize, Clone)]
pub struct Config {
    pub processes: usize,
    pub input_file: PathBuf,
    pub raw_dir: PathBuf,
    pub policy: ExtractPolicy,
    pub keep_going: bool,
    pub report: Option<PathBuf>,
}

impl Config {
    pub fn new(input_file: PathBuf, raw_dir: PathBuf, policy: ExtractPolicy) -> Self {
        Config {
            processes: DEFAULT_PROCESSES,
            input_file,
            raw_dir,
            policy,
            keep_going: false,
            report: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.processes == 0 {
            return Err(ShardError::config_error(
                "processes must be a positive integer",
            ));
        }
        Ok(())
    }

    /// Create the raw directory and every extraction target.
    pub fn prepare_dirs(&self) -> Result<()> {
        fs::ensure_dir_exists(&self.raw_dir)?;
        for dir in self.policy.destinations() {
            fs::ensure_dir_exists(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_zero_processes_rejected() {
        let mut config = Config::new(
            PathBuf::from(DEFAULT_INPUT_FILE),
            PathBuf::from(DEFAULT_RAW_DIR),
            ExtractPolicy::All {
                data_dir: PathBuf::from("images"),
            },
        );
        assert!(config.validate().is_ok());

        config.processes = 0;
        assert!(matches!(config.validate(), Err(ShardError::Config { .. })));
    }

    #[test]
    fn test_prepare_dirs_split() {
        let temp = TempDir::new().unwrap();
        let config = Config::new(
            temp.path().join("sa1b.txt"),
            temp.path().join("raw"),
            ExtractPolicy::Split {
                images_dir: temp.path().join("images"),
                masks_dir: temp.path().join("annotations"),
            },
        );

        config.prepare_dirs().unwrap();
        assert!(temp.path().join("raw").is_dir());
        assert!(temp.path().join("images").is_dir());
        assert!(temp.path().join("annotations").is_dir());
    }

    #[test]
    fn test_config_serializes_policy() {
        let config = Config::new(
            PathBuf::from("m.txt"),
            PathBuf::from("raw"),
            ExtractPolicy::All {
                data_dir: PathBuf::from("images"),
            },
        );
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["processes"], 4);
        assert_eq!(json["policy"]["mode"], "all");
        assert_eq!(json["policy"]["data_dir"], "images");
    }
}
