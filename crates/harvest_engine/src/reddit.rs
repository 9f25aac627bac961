use std::time::Duration;

use harvest_core::{Locator, Source};
use harvest_logging::harvest_warn;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::fetch::{map_reqwest_error, non_empty_or_placeholder, ContentFetcher};
use crate::{FailureKind, FetchError};

pub const DEFAULT_REDDIT_URL: &str = "https://www.reddit.com";
pub const REDDIT_USER_AGENT: &str = "Mozilla/5.0 (compatible; LocalScraper/1.0)";

const POST_SEPARATOR: &str = "-----------------------------";

#[derive(Debug, Clone)]
pub struct RedditSettings {
    pub base_url: String,
    pub user_agent: String,
    /// Top posts of the last day to include.
    pub post_limit: usize,
    pub comment_limit: usize,
    pub request_timeout: Duration,
}

impl Default for RedditSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REDDIT_URL.to_string(),
            user_agent: REDDIT_USER_AGENT.to_string(),
            post_limit: 5,
            comment_limit: 3,
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Listing<T> {
    data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
struct ListingData<T> {
    #[serde(default = "Vec::new")]
    children: Vec<Child<T>>,
}

#[derive(Debug, Deserialize)]
struct Child<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct PostRef {
    permalink: String,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    ups: i64,
    permalink: String,
    #[serde(default)]
    selftext: String,
}

#[derive(Debug, Deserialize)]
struct Comment {
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

/// Builds a daily digest of a subreddit's top posts with their top comments.
#[derive(Debug, Clone)]
pub struct RedditFetcher {
    settings: RedditSettings,
    client: reqwest::Client,
}

impl RedditFetcher {
    pub fn new(settings: RedditSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent.clone())
            .build()?;
        Ok(Self { settings, client })
    }

    fn base(&self) -> &str {
        self.settings.base_url.trim_end_matches('/')
    }

    async fn get_json<T: DeserializeOwned>(&self, locator: &str, url: &str) -> Result<T, FetchError> {
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
                format!("{status} for {url}"),
            ));
        }
        response
            .json()
            .await
            .map_err(|err| FetchError::new(locator, FailureKind::MalformedResponse, err.to_string()))
    }

    async fn post_digest(&self, locator: &str, permalink: &str) -> Result<String, FetchError> {
        let url = format!("{}{}.json", self.base(), permalink.trim_end_matches('/'));
        let (posts, comments): (Listing<Post>, Listing<Comment>) =
            self.get_json(locator, &url).await?;
        let post = posts.data.children.into_iter().next().ok_or_else(|| {
            FetchError::new(locator, FailureKind::MalformedResponse, "post listing is empty")
        })?;
        let comments: Vec<String> = comments
            .data
            .children
            .into_iter()
            .filter_map(|child| {
                let body = child.data.body?;
                let author = child.data.author.unwrap_or_else(|| "[unknown]".to_string());
                Some(format!("- {}: {}", author, collapse_newlines(&body)))
            })
            .take(self.settings.comment_limit)
            .collect();
        Ok(format_post(self.base(), &post.data, &comments))
    }
}

#[async_trait::async_trait]
impl ContentFetcher for RedditFetcher {
    async fn fetch(&self, source: &Source) -> Result<String, FetchError> {
        let locator = source.locator_text();
        let Locator::Subreddit(subreddit) = source.locator() else {
            return Err(FetchError::new(
                locator,
                FailureKind::InvalidLocator,
                "reddit fetcher needs an r/<name> locator",
            ));
        };

        let url = format!(
            "{}/r/{}/top.json?t=day&limit={}",
            self.base(),
            subreddit,
            self.settings.post_limit
        );
        let listing: Listing<PostRef> = self.get_json(locator, &url).await?;

        let mut digests = Vec::new();
        for child in listing.data.children.into_iter().take(self.settings.post_limit) {
            match self.post_digest(locator, &child.data.permalink).await {
                Ok(digest) => digests.push(digest),
                Err(err) => {
                    harvest_warn!(
                        "skipping reddit post permalink={} error={}",
                        child.data.permalink,
                        err
                    );
                }
            }
        }

        Ok(non_empty_or_placeholder(source, digests.join("\n")))
    }
}

fn collapse_newlines(text: &str) -> String {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_post(base: &str, post: &Post, comments: &[String]) -> String {
    let body = if post.selftext.trim().is_empty() {
        "[No text content - link/image post]"
    } else {
        post.selftext.as_str()
    };
    let comments = if comments.is_empty() {
        "No comments".to_string()
    } else {
        comments.join("\n")
    };
    format!(
        "# {}\nAuthor: {}\nUpvotes: {}\nLink: {}{}\n\nPost:\n{}\n\nTop Comments:\n{}\n\n{}\n",
        post.title, post.author, post.ups, base, post.permalink, body, comments, POST_SEPARATOR
    )
}
