use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{error, info, warn, Instrument, Span};
use url::Url;

use crate::common::get_size;
use crate::config::DataIngestionConfig;
use crate::contract::{BodyStream, FetchedResponse, Fetcher};
use crate::error::RetrieveError;
use crate::paths::create_directories;

/// Prefix of a Google Drive direct-download link; the file id is appended.
pub const DIRECT_DOWNLOAD_PREFIX: &str = "https://drive.google.com/uc?export=download&id=";

/// Upper bound on how much of an HTML interstitial page is read.
const MAX_PAGE_BYTES: usize = 1 << 20;

static CONFIRM_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"confirm=([0-9A-Za-z_\-]+)|name="confirm"\s+value="([0-9A-Za-z_\-]+)""#)
        .expect("confirm token pattern is valid")
});

/// Extracts the file id from a share link of the form
/// `https://drive.google.com/file/d/<ID>/view?usp=sharing`.
///
/// The id is the second-to-last path segment and must be preceded by `d`.
/// Anything else is rejected rather than guessed at.
pub fn drive_file_id(source_url: &str) -> Result<String, RetrieveError> {
    let invalid = |reason: &str| RetrieveError::InvalidSourceUrl {
        url: source_url.to_string(),
        reason: reason.to_string(),
    };

    let parsed = Url::parse(source_url).map_err(|e| invalid(&e.to_string()))?;
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.collect())
        .unwrap_or_default();

    if segments.len() < 3 {
        return Err(invalid("expected a path of the form .../d/<ID>/<action>"));
    }
    let id = segments[segments.len() - 2];
    if segments[segments.len() - 3] != "d" {
        return Err(invalid("expected a path of the form .../d/<ID>/<action>"));
    }
    if id.is_empty()
        || !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(invalid("file id is empty or contains invalid characters"));
    }
    Ok(id.to_string())
}

pub fn direct_download_url(file_id: &str) -> String {
    format!("{DIRECT_DOWNLOAD_PREFIX}{file_id}")
}

/// Finds the large-file confirmation token in a Drive interstitial page.
pub fn confirm_token(html: &str) -> Option<String> {
    CONFIRM_TOKEN.captures(html).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    })
}

/// [`Fetcher`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, RetrieveError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RetrieveError::Request {
                url: url.to_string(),
                source: e,
            })?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(FetchedResponse {
            status,
            content_type,
            body: Box::new(ResponseBody {
                url: url.to_string(),
                response,
            }),
        })
    }
}

/// Body of a `reqwest` response, pulled from the connection as it arrives.
struct ResponseBody {
    url: String,
    response: reqwest::Response,
}

#[async_trait::async_trait]
impl BodyStream for ResponseBody {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, RetrieveError> {
        let chunk = self
            .response
            .chunk()
            .await
            .map_err(|e| RetrieveError::Request {
                url: self.url.clone(),
                source: e,
            })?;
        Ok(chunk.map(|bytes| bytes.to_vec()))
    }
}

/// The data ingestion component: downloads the source archive and extracts it.
///
/// Holds the stage config, the transport, and the span every log entry of
/// this component is recorded under.
pub struct DataIngestion<F: Fetcher> {
    pub(crate) config: DataIngestionConfig,
    fetcher: F,
    pub(crate) span: Span,
}

impl<F: Fetcher> DataIngestion<F> {
    pub fn new(config: DataIngestionConfig, fetcher: F, span: Span) -> Self {
        Self {
            config,
            fetcher,
            span,
        }
    }

    pub fn config(&self) -> &DataIngestionConfig {
        &self.config
    }

    /// Downloads the archive behind `source_dir` into `local_data_file`,
    /// overwriting any earlier copy. Returns the written path.
    pub async fn download_file(&self) -> Result<PathBuf, RetrieveError> {
        let span = self.span.clone();
        async {
            let res = self.download_file_inner().await;
            if let Err(e) = &res {
                error!(error = %e, "Error during data download: {}", e);
            }
            res
        }
        .instrument(span)
        .await
    }

    async fn download_file_inner(&self) -> Result<PathBuf, RetrieveError> {
        let dataset_url = &self.config.source_dir;
        let zip_download_path = &self.config.local_data_file;

        let mut dirs: Vec<&Path> = vec![self.config.root_dir.as_path()];
        if let Some(parent) = zip_download_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            dirs.push(parent);
        }
        create_directories(&dirs, false)?;

        info!(
            source = %dataset_url,
            destination = %zip_download_path.display(),
            "Downloading data from {} into file {}",
            dataset_url,
            zip_download_path.display()
        );

        let file_id = drive_file_id(dataset_url)?;
        let url = direct_download_url(&file_id);
        let response = self.fetch_following_confirm(&url).await?;
        let bytes = write_body(response, zip_download_path).await?;

        let size = get_size(zip_download_path).unwrap_or_else(|_| "unknown size".to_string());
        info!(
            source = %dataset_url,
            destination = %zip_download_path.display(),
            bytes,
            size = %size,
            "Downloaded data from {} into file {}",
            dataset_url,
            zip_download_path.display()
        );
        Ok(zip_download_path.clone())
    }

    /// Fetches `url`; when Drive answers with its large-file warning page,
    /// fetches once more with the confirmation token it carries. The returned
    /// response has its body unread.
    async fn fetch_following_confirm(&self, url: &str) -> Result<FetchedResponse, RetrieveError> {
        let first = self.checked_fetch(url).await?;
        if !first.is_html() {
            return Ok(first);
        }

        let page = read_page(first).await?;
        let Some(token) = confirm_token(&page) else {
            return Err(RetrieveError::UnexpectedHtml {
                url: url.to_string(),
            });
        };
        warn!(url = %url, "Large file warning page received, confirming download");

        let confirmed_url = format!("{url}&confirm={token}");
        let second = self.checked_fetch(&confirmed_url).await?;
        if second.is_html() {
            return Err(RetrieveError::UnexpectedHtml { url: confirmed_url });
        }
        Ok(second)
    }

    async fn checked_fetch(&self, url: &str) -> Result<FetchedResponse, RetrieveError> {
        let resp = self.fetcher.fetch(url).await?;
        if !resp.is_success() {
            return Err(RetrieveError::Status {
                url: url.to_string(),
                status: resp.status,
            });
        }
        Ok(resp)
    }
}

/// Reads an HTML page body, keeping at most [`MAX_PAGE_BYTES`] of it.
async fn read_page(mut response: FetchedResponse) -> Result<String, RetrieveError> {
    let mut page = Vec::new();
    while let Some(chunk) = response.next_chunk().await? {
        page.extend_from_slice(&chunk);
        if page.len() >= MAX_PAGE_BYTES {
            break;
        }
    }
    Ok(String::from_utf8_lossy(&page).into_owned())
}

/// Streams the body into `dest`, replacing any earlier file. A partially
/// written file is removed when the transfer fails.
async fn write_body(mut response: FetchedResponse, dest: &Path) -> Result<u64, RetrieveError> {
    let res = stream_to_file(&mut response, dest).await;
    if res.is_err() && dest.is_file() {
        let _ = fs::remove_file(dest);
    }
    res
}

async fn stream_to_file(response: &mut FetchedResponse, dest: &Path) -> Result<u64, RetrieveError> {
    let write_error = |e| RetrieveError::Write {
        path: dest.to_path_buf(),
        source: e,
    };
    let mut out = BufWriter::new(File::create(dest).map_err(write_error)?);
    let mut written = 0u64;
    while let Some(chunk) = response.next_chunk().await? {
        out.write_all(&chunk).map_err(write_error)?;
        written += chunk.len() as u64;
    }
    out.flush().map_err(write_error)?;
    Ok(written)
}
