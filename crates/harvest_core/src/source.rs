use std::fmt;

use url::Url;

use crate::naming::sanitize_name;

/// Where a source's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// An http(s) page.
    Web(Url),
    /// A subreddit name, without the `r/` prefix.
    Subreddit(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    Empty,
    InvalidUrl(String),
    UnsupportedScheme(String),
    InvalidSubreddit(String),
    EmptyCategory,
}

impl fmt::Display for LocatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocatorError::Empty => write!(f, "empty locator"),
            LocatorError::InvalidUrl(msg) => write!(f, "invalid url: {msg}"),
            LocatorError::UnsupportedScheme(scheme) => write!(f, "unsupported scheme {scheme}"),
            LocatorError::InvalidSubreddit(name) => write!(f, "invalid subreddit name {name:?}"),
            LocatorError::EmptyCategory => write!(f, "empty category"),
        }
    }
}

impl std::error::Error for LocatorError {}

impl Locator {
    /// Parse `r/<name>` (or `/r/<name>`) as a subreddit, anything else as an http(s) URL.
    pub fn parse(input: &str) -> Result<Self, LocatorError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(LocatorError::Empty);
        }

        if let Some(name) = trimmed
            .strip_prefix("r/")
            .or_else(|| trimmed.strip_prefix("/r/"))
        {
            let name = name.trim_end_matches('/');
            let valid = !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                return Err(LocatorError::InvalidSubreddit(name.to_string()));
            }
            return Ok(Locator::Subreddit(name.to_string()));
        }

        let url = Url::parse(trimmed).map_err(|err| LocatorError::InvalidUrl(err.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(Locator::Web(url)),
            other => Err(LocatorError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// Logical grouping of sources; selects the downstream ingestion directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category(String);

impl Category {
    pub fn new(name: &str) -> Result<Self, LocatorError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LocatorError::EmptyCategory);
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One configured thing to harvest. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    text: String,
    locator: Locator,
    category: Category,
    summarize: bool,
}

impl Source {
    /// Build a scrape-only source. Use [`Source::with_summary`] to enable summarization.
    pub fn new(locator: &str, category: &str) -> Result<Self, LocatorError> {
        Ok(Self {
            text: locator.trim().to_string(),
            locator: Locator::parse(locator)?,
            category: Category::new(category)?,
            summarize: false,
        })
    }

    pub fn with_summary(mut self, summarize: bool) -> Self {
        self.summarize = summarize;
        self
    }

    /// The locator exactly as configured (trimmed).
    pub fn locator_text(&self) -> &str {
        &self.text
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn summarize(&self) -> bool {
        self.summarize
    }

    /// Filesystem-safe name derived from the configured locator.
    pub fn logical_name(&self) -> String {
        sanitize_name(&self.text)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.text, self.category)
    }
}
