use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShardError>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum ShardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot read manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed manifest line {line}: '{content}'")]
    MalformedLine { line: usize, content: String },

    #[error("Download failed: {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("Extraction failed: {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("Worker pool error: {message}")]
    Pool { message: String },

    #[error("{file_name}: {source}")]
    Entry {
        file_name: String,
        #[source]
        source: Box<ShardError>,
    },

    #[error("{failed} of {total} entries failed")]
    BatchFailed { failed: usize, total: usize },
}

impl ShardError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        ShardError::Config {
            message: message.into(),
        }
    }

    pub fn network<E>(url: &str, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        ShardError::Network {
            url: url.to_string(),
            source: source.into(),
        }
    }

    pub fn archive(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ShardError::Archive {
            path: path.into(),
            source,
        }
    }

    /// Attach the manifest entry that produced this error.
    pub fn for_entry(self, file_name: &str) -> Self {
        ShardError::Entry {
            file_name: file_name.to_string(),
            source: Box::new(self),
        }
    }

    /// Strip any `Entry` wrappers and return the underlying failure.
    pub fn root(&self) -> &ShardError {
        match self {
            ShardError::Entry { source, .. } => source.root(),
            other => other,
        }
    }
}
