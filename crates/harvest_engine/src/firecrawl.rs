use std::time::Duration;

use harvest_core::{Locator, Source};
use serde::{Deserialize, Serialize};

use crate::fetch::{map_reqwest_error, non_empty_or_placeholder, ContentFetcher};
use crate::{FailureKind, FetchError};

pub const DEFAULT_FIRECRAWL_URL: &str = "https://api.firecrawl.dev";

#[derive(Debug, Clone)]
pub struct FirecrawlSettings {
    pub base_url: String,
    /// Absent keys make every fetch fail with [`FailureKind::MissingCredential`].
    pub api_key: Option<String>,
    pub request_timeout: Duration,
}

impl Default for FirecrawlSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FIRECRAWL_URL.to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(90),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: [&'static str; 1],
    only_main_content: bool,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Option<ScrapeData>,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
    #[serde(default)]
    markdown: Option<String>,
}

/// Scrapes pages through the Firecrawl REST API and returns their Markdown.
#[derive(Debug, Clone)]
pub struct FirecrawlFetcher {
    settings: FirecrawlSettings,
    client: reqwest::Client,
}

impl FirecrawlFetcher {
    pub fn new(settings: FirecrawlSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self { settings, client })
    }
}

#[async_trait::async_trait]
impl ContentFetcher for FirecrawlFetcher {
    async fn fetch(&self, source: &Source) -> Result<String, FetchError> {
        let locator = source.locator_text();
        let Locator::Web(url) = source.locator() else {
            return Err(FetchError::new(
                locator,
                FailureKind::InvalidLocator,
                "firecrawl needs an http(s) url",
            ));
        };
        let Some(api_key) = self.settings.api_key.as_deref() else {
            return Err(FetchError::new(
                locator,
                FailureKind::MissingCredential,
                "FIRECRAWL_API_KEY is not set",
            ));
        };

        let endpoint = format!("{}/v1/scrape", self.settings.base_url.trim_end_matches('/'));
        let request = ScrapeRequest {
            url: url.as_str(),
            formats: ["markdown"],
            only_main_content: true,
        };

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| map_reqwest_error(locator, err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::new(
                locator,
                FailureKind::HttpStatus(status.as_u16()),
                format!("{status}: {}", body.trim()),
            ));
        }

        let payload: ScrapeResponse = response
            .json()
            .await
            .map_err(|err| FetchError::new(locator, FailureKind::MalformedResponse, err.to_string()))?;

        if !payload.success {
            return Err(FetchError::new(
                locator,
                FailureKind::Backend,
                payload
                    .error
                    .unwrap_or_else(|| "firecrawl reported failure".to_string()),
            ));
        }

        let markdown = payload.data.and_then(|data| data.markdown).ok_or_else(|| {
            FetchError::new(
                locator,
                FailureKind::MalformedResponse,
                "response has no markdown content",
            )
        })?;

        Ok(non_empty_or_placeholder(source, markdown))
    }
}
