//! # contract: transport seam for the data ingestion stage
//!
//! The Retriever never talks to the network directly; it goes through the
//! [`Fetcher`] trait so tests can substitute a `MockFetcher` and serve a local
//! archive instead of a hosted one.
//!
//! - [`crate::download::HttpFetcher`] is the reqwest-backed implementation.
//! - Bodies are read chunk by chunk through [`BodyStream`], so an archive is
//!   never held in memory as a whole.
//! - The trait is annotated for `mockall`; the mock is exported under the
//!   `test-export-mocks` feature so integration tests can use it.

use std::collections::VecDeque;
use std::fmt;

use async_trait::async_trait;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::RetrieveError;

/// A response body, consumed one chunk at a time.
#[async_trait]
pub trait BodyStream: Send {
    /// Next chunk of the body, or `None` once it is exhausted.
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, RetrieveError>;
}

/// Body held in memory and handed out as a fixed sequence of chunks.
#[derive(Debug, Default)]
pub struct ChunkedBody {
    chunks: VecDeque<Vec<u8>>,
}

impl ChunkedBody {
    pub fn new<I: IntoIterator<Item = Vec<u8>>>(chunks: I) -> Self {
        Self {
            chunks: chunks.into_iter().collect(),
        }
    }
}

#[async_trait]
impl BodyStream for ChunkedBody {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, RetrieveError> {
        Ok(self.chunks.pop_front())
    }
}

/// Status line and headers of a single GET request, with its unread body.
pub struct FetchedResponse {
    pub status: u16,
    /// Value of the `Content-Type` header, if any.
    pub content_type: Option<String>,
    pub body: Box<dyn BodyStream>,
}

impl FetchedResponse {
    /// Response whose body is delivered as `chunks`, in order.
    pub fn from_chunks<I: IntoIterator<Item = Vec<u8>>>(
        status: u16,
        content_type: Option<&str>,
        chunks: I,
    ) -> Self {
        Self {
            status,
            content_type: content_type.map(str::to_string),
            body: Box::new(ChunkedBody::new(chunks)),
        }
    }

    /// Response whose body is delivered in one chunk.
    pub fn from_bytes(status: u16, content_type: Option<&str>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::from_chunks(status, content_type, [bytes.into()])
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.trim_start().to_ascii_lowercase().starts_with("text/html"))
            .unwrap_or(false)
    }

    pub async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, RetrieveError> {
        self.body.next_chunk().await
    }
}

impl fmt::Debug for FetchedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchedResponse")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Issues a GET request for a URL.
///
/// Implementations report transport failures only; status codes are
/// interpreted by the caller.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, RetrieveError>;
}
