use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use harvest_core::{Locator, Source};
use reqwest::header::CONTENT_TYPE;

use crate::page::{mime_of, page_to_text};
use crate::{FailureKind, FetchError};

pub const DEFAULT_USER_AGENT: &str = concat!("harvest/", env!("CARGO_PKG_VERSION"));

/// Fetch raw text for one source.
#[async_trait::async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, source: &Source) -> Result<String, FetchError>;
}

/// Marker text stored instead of an empty body, so an empty artifact is never silent.
pub fn empty_content_placeholder(source: &Source) -> String {
    format!("[no content returned for {}]", source.locator_text())
}

pub(crate) fn non_empty_or_placeholder(source: &Source, text: String) -> String {
    if text.trim().is_empty() {
        empty_content_placeholder(source)
    } else {
        text
    }
}

pub(crate) fn map_reqwest_error(locator: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(locator, FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(locator, FailureKind::RedirectLimitExceeded, err.to_string());
    }
    if err.is_decode() {
        return FetchError::new(locator, FailureKind::MalformedResponse, err.to_string());
    }
    FetchError::new(locator, FailureKind::Network, err.to_string())
}

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
            allowed_content_types: vec![
                "text/html".to_string(),
                "application/xhtml+xml".to_string(),
                "text/plain".to_string(),
            ],
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Downloads a page directly and extracts its readable text.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    settings: FetchSettings,
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .user_agent(settings.user_agent.clone())
            .build()?;
        Ok(Self { settings, client })
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let ct = mime_of(content_type);
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }

    fn too_large(&self, locator: &str, actual: u64) -> FetchError {
        FetchError::new(
            locator,
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }
}

#[async_trait::async_trait]
impl ContentFetcher for PageFetcher {
    async fn fetch(&self, source: &Source) -> Result<String, FetchError> {
        let locator = source.locator_text();
        let url = match source.locator() {
            Locator::Web(url) => url.clone(),
            Locator::Subreddit(_) => {
                return Err(FetchError::new(
                    locator,
                    FailureKind::InvalidLocator,
                    "page fetcher needs an http(s) url",
                ))
            }
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| map_reqwest_error(locator, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                locator,
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(locator, content_len));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        if let Some(ct) = content_type.as_deref() {
            if !self.is_content_type_allowed(ct) {
                return Err(FetchError::new(
                    locator,
                    FailureKind::UnsupportedContentType {
                        content_type: ct.to_string(),
                    },
                    "unsupported content type",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| map_reqwest_error(locator, err))?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(self.too_large(locator, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        let page = page_to_text(&bytes, content_type.as_deref())
            .map_err(|err| FetchError::new(locator, FailureKind::Decode, err.to_string()))?;
        Ok(non_empty_or_placeholder(source, page.text))
    }
}

/// Routes subreddit locators to the Reddit backend and URLs to the web backend.
#[derive(Clone)]
pub struct SourceFetcher {
    web: Arc<dyn ContentFetcher>,
    reddit: Arc<dyn ContentFetcher>,
}

impl SourceFetcher {
    pub fn new(web: Arc<dyn ContentFetcher>, reddit: Arc<dyn ContentFetcher>) -> Self {
        Self { web, reddit }
    }
}

#[async_trait::async_trait]
impl ContentFetcher for SourceFetcher {
    async fn fetch(&self, source: &Source) -> Result<String, FetchError> {
        match source.locator() {
            Locator::Web(_) => self.web.fetch(source).await,
            Locator::Subreddit(_) => self.reddit.fetch(source).await,
        }
    }
}
