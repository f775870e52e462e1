//! Raw byte sources for datasets.

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;
use url::Url;

use super::DatasetError;

/// "Read raw bytes for dataset X"
#[async_trait]
pub trait DatasetProvider: Send + Sync {
    async fn read(&self, source: &str) -> Result<Vec<u8>, DatasetError>;
}

/// Reads datasets from the local filesystem
#[derive(Debug, Clone, Default)]
pub struct FileProvider;

#[async_trait]
impl DatasetProvider for FileProvider {
    async fn read(&self, source: &str) -> Result<Vec<u8>, DatasetError> {
        let bytes = tokio::fs::read(source).await?;
        debug!("Read {} bytes from {}", bytes.len(), source);
        Ok(bytes)
    }
}

/// Fetches datasets over HTTP(S)
#[derive(Clone)]
pub struct HttpProvider {
    client: reqwest::Client,
}

impl HttpProvider {
    pub fn new() -> Result<Self, DatasetError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("cedar/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DatasetProvider for HttpProvider {
    async fn read(&self, source: &str) -> Result<Vec<u8>, DatasetError> {
        let response = self.client.get(source).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DatasetError::Status(status));
        }
        let bytes = response.bytes().await?;
        debug!("Fetched {} bytes from {}", bytes.len(), source);
        Ok(bytes.to_vec())
    }
}

/// Dispatches on the source reference: `http(s)://` URLs go over the
/// network, `file://` URLs and plain paths are read from disk
#[derive(Clone)]
pub struct SourceProvider {
    file: FileProvider,
    http: HttpProvider,
}

impl SourceProvider {
    pub fn new() -> Result<Self, DatasetError> {
        Ok(Self {
            file: FileProvider,
            http: HttpProvider::new()?,
        })
    }
}

enum SourceRef {
    Remote,
    Local(PathBuf),
}

fn classify(source: &str) -> SourceRef {
    match Url::parse(source) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => SourceRef::Remote,
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map(SourceRef::Local)
            .unwrap_or_else(|_| SourceRef::Local(PathBuf::from(source))),
        _ => SourceRef::Local(PathBuf::from(source)),
    }
}

#[async_trait]
impl DatasetProvider for SourceProvider {
    async fn read(&self, source: &str) -> Result<Vec<u8>, DatasetError> {
        match classify(source) {
            SourceRef::Remote => self.http.read(source).await,
            SourceRef::Local(path) => self.file.read(&path.to_string_lossy()).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_classify_sources() {
        assert!(matches!(
            classify("https://data.example.org/districts.geojson"),
            SourceRef::Remote
        ));
        match classify("data/fire_districts.geojson") {
            SourceRef::Local(p) => assert_eq!(p, PathBuf::from("data/fire_districts.geojson")),
            SourceRef::Remote => panic!("plain path classified as remote"),
        }
    }

    #[tokio::test]
    async fn test_file_provider_reads_bytes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[]").unwrap();

        let provider = FileProvider;
        let bytes = provider
            .read(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(bytes, b"[]");
    }

    #[tokio::test]
    async fn test_missing_file_is_transient_io() {
        let err = FileProvider
            .read("/nonexistent/cedar/dataset.geojson")
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }
}
