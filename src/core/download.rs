use crate::error::{Result, ShardError};
use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Size of each buffered copy from the response body to disk.
pub const CHUNK_SIZE: usize = 8192;

/// What `Fetcher::fetch` did for one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Downloaded { path: PathBuf, bytes: u64 },
    Skipped(PathBuf),
}

impl FetchOutcome {
    pub fn path(&self) -> &Path {
        match self {
            FetchOutcome::Downloaded { path, .. } => path,
            FetchOutcome::Skipped(path) => path,
        }
    }

    pub fn was_skipped(&self) -> bool {
        matches!(self, FetchOutcome::Skipped(_))
    }
}

/// Downloads archives into the raw directory, reusing any file already there.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::blocking::Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("shardfetch/", env!("CARGO_PKG_VERSION")))
            .timeout(None::<std::time::Duration>)
            .build()
            .map_err(|e| ShardError::config_error(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Ensure `{raw_dir}/{file_name}` exists locally, downloading it from `url` if absent.
    ///
    /// Only the presence of the path is checked: a truncated earlier download
    /// counts as complete and is never refetched.
    pub fn fetch(&self, file_name: &str, url: &str, raw_dir: &Path) -> Result<FetchOutcome> {
        let destination = raw_dir.join(file_name);

        if destination.exists() {
            info!(
                file_name,
                "{file_name} already exists in {}. Skipping download.",
                raw_dir.display()
            );
            return Ok(FetchOutcome::Skipped(destination));
        }

        info!(file_name, url, "Downloading {file_name} from {url}...");

        let response = self
            .client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|e| ShardError::network(url, e))?;

        let bytes = self.write_body(response, url, &destination)?;
        debug!(file_name, bytes, path = %destination.display(), "download complete");

        Ok(FetchOutcome::Downloaded {
            path: destination,
            bytes,
        })
    }

    fn write_body(&self, mut body: impl Read, url: &str, destination: &Path) -> Result<u64> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(destination)?;

        let mut buffer = [0u8; CHUNK_SIZE];
        let mut total = 0u64;

        loop {
            let read = match body.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ShardError::network(url, e)),
            };
            file.write_all(&buffer[..read])?;
            total += read as u64;
        }

        file.flush()?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Run a blocking fetch off the async test runtime.
    async fn fetch_blocking(file_name: &str, url: String, raw_dir: PathBuf) -> Result<FetchOutcome> {
        let file_name = file_name.to_string();
        tokio::task::spawn_blocking(move || Fetcher::new()?.fetch(&file_name, &url, &raw_dir))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_downloads_body_larger_than_one_chunk() {
        let server = MockServer::start().await;
        let body: Vec<u8> = (0..CHUNK_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();
        Mock::given(method("GET"))
            .and(path("/shards/a.tar"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let outcome = fetch_blocking(
            "a.tar",
            format!("{}/shards/a.tar", server.uri()),
            temp.path().to_path_buf(),
        )
        .await
        .unwrap();

        let expected_path = temp.path().join("a.tar");
        assert_eq!(
            outcome,
            FetchOutcome::Downloaded {
                path: expected_path.clone(),
                bytes: body.len() as u64,
            }
        );
        assert_eq!(std::fs::read(expected_path).unwrap(), body);
    }

    #[tokio::test]
    async fn test_existing_file_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fresh".to_vec()))
            .expect(0)
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let cached = temp.path().join("a.tar");
        std::fs::write(&cached, b"partial").unwrap();

        let outcome = fetch_blocking(
            "a.tar",
            format!("{}/a.tar", server.uri()),
            temp.path().to_path_buf(),
        )
        .await
        .unwrap();

        assert!(outcome.was_skipped());
        assert_eq!(outcome.path(), cached.as_path());
        // Partial content is trusted as-is
        assert_eq!(std::fs::read(&cached).unwrap(), b"partial");
    }

    #[tokio::test]
    async fn test_error_status_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let err = fetch_blocking(
            "missing.tar",
            format!("{}/missing.tar", server.uri()),
            temp.path().to_path_buf(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ShardError::Network { .. }));
        assert!(!temp.path().join("missing.tar").exists());
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        let temp = TempDir::new().unwrap();
        let err = fetch_blocking(
            "a.tar",
            "http://127.0.0.1:1/a.tar".to_string(),
            temp.path().to_path_buf(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ShardError::Network { .. }));
    }
}
