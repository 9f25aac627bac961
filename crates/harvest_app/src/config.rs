//! Run configuration: an optional RON file layered over built-in defaults.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use harvest_core::Source;
use harvest_engine::{
    artifact_stem, RetryPolicy, RunSettings, DEFAULT_MAX_INPUT_CHARS, DEFAULT_REINDEX_URL,
    DEFAULT_SUMMARIZER_MODEL, DEFAULT_SUMMARIZER_URL,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "harvest.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceEntry {
    pub locator: String,
    pub category: String,
    #[serde(default)]
    pub summarize: bool,
}

impl SourceEntry {
    fn new(locator: &str, category: &str, summarize: bool) -> Self {
        Self {
            locator: locator.to_string(),
            category: category.to_string(),
            summarize,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebBackend {
    /// Scrape through the Firecrawl API (needs `FIRECRAWL_API_KEY`).
    Firecrawl,
    /// Download pages directly and extract their text locally.
    Direct,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SummarizerConfig {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    pub max_input_chars: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_SUMMARIZER_URL.to_string(),
            model: DEFAULT_SUMMARIZER_MODEL.to_string(),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublishTarget {
    None,
    Directory { root: PathBuf },
    Container { name: String, root: String },
}

impl Default for PublishTarget {
    fn default() -> Self {
        PublishTarget::Container {
            name: "openwebui".to_string(),
            root: "/app/backend/data/uploads".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarvestConfig {
    pub output_dir: PathBuf,
    pub log_file: PathBuf,
    pub sources: Vec<SourceEntry>,
    /// Category → downstream subdirectory.
    pub categories: BTreeMap<String, String>,
    pub web_backend: WebBackend,
    pub summarizer: SummarizerConfig,
    pub publish: PublishTarget,
    /// `None` skips the reindex request.
    pub reindex_url: Option<String>,
    pub stage_timeout_secs: u64,
    pub retry_attempts: u32,
    pub max_concurrent_sources: usize,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("scraped_data"),
            log_file: PathBuf::from("harvest.log"),
            sources: default_sources(),
            categories: BTreeMap::from([
                ("models".to_string(), "ai_model_news".to_string()),
                ("finance".to_string(), "finance_news".to_string()),
                ("reddit".to_string(), "reddit_ai".to_string()),
            ]),
            web_backend: WebBackend::Firecrawl,
            summarizer: SummarizerConfig::default(),
            publish: PublishTarget::default(),
            reindex_url: Some(DEFAULT_REINDEX_URL.to_string()),
            stage_timeout_secs: 120,
            retry_attempts: 2,
            max_concurrent_sources: 1,
        }
    }
}

fn default_sources() -> Vec<SourceEntry> {
    let mut sources = vec![SourceEntry::new("https://huggingface.co/models", "models", true)];
    sources.extend(
        [
            "https://www.investors.com/news/",
            "https://www.investors.com/market-trend/stock-market-today/",
            "https://www.investors.com/etfs-and-funds/",
            "https://www.investors.com/category/news/technology/",
            "https://www.investors.com/category/news/business/",
        ]
        .into_iter()
        .map(|url| SourceEntry::new(url, "finance", false)),
    );
    sources.extend(
        [
            "MachineLearning",
            "LocalLLaMA",
            "ArtificialIntelligence",
            "OpenAI",
            "LanguageTechnology",
        ]
        .into_iter()
        .map(|sub| SourceEntry::new(&format!("r/{sub}"), "reddit", false)),
    );
    sources
}

impl HarvestConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `harvest.ron` in the
    /// working directory is used when present, the built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_ron(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_ron(content: &str) -> Result<Self> {
        let config: Self = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.stage_timeout_secs == 0 {
            bail!("stage_timeout_secs must be > 0");
        }
        if self.retry_attempts == 0 {
            bail!("retry_attempts must be >= 1");
        }
        if self.max_concurrent_sources == 0 {
            bail!("max_concurrent_sources must be >= 1");
        }
        if self.summarizer.max_input_chars == 0 {
            bail!("summarizer.max_input_chars must be > 0");
        }
        self.resolve_sources().map(|_| ())
    }

    /// Parse the configured sources, rejecting any two that would share an artifact name.
    pub fn resolve_sources(&self) -> Result<Vec<Source>> {
        let mut seen: HashMap<String, &str> = HashMap::new();
        let mut sources = Vec::with_capacity(self.sources.len());
        for entry in &self.sources {
            let source = Source::new(&entry.locator, &entry.category)
                .map_err(|err| anyhow::anyhow!("source {:?}: {err}", entry.locator))?
                .with_summary(entry.summarize);
            let stem = artifact_stem(&source.logical_name());
            if let Some(previous) = seen.insert(stem.clone(), &entry.locator) {
                bail!(
                    "sources {:?} and {:?} both map to artifact name {stem:?}",
                    previous,
                    entry.locator
                );
            }
            sources.push(source);
        }
        Ok(sources)
    }

    pub fn run_settings(&self) -> RunSettings {
        let retry = RetryPolicy {
            max_attempts: self.retry_attempts,
            ..RetryPolicy::default()
        };
        RunSettings {
            stage_timeout: Duration::from_secs(self.stage_timeout_secs),
            fetch_retry: retry.clone(),
            publish_retry: retry,
            max_concurrent_sources: self.max_concurrent_sources,
        }
    }
}

/// API keys read once from the environment at startup.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub firecrawl_api_key: Option<String>,
    pub summarizer_api_key: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            firecrawl_api_key: non_empty_var("FIRECRAWL_API_KEY"),
            summarizer_api_key: non_empty_var("GROQ_API_KEY"),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("firecrawl_api_key", &self.firecrawl_api_key.as_ref().map(|_| "<set>"))
            .field("summarizer_api_key", &self.summarizer_api_key.as_ref().map(|_| "<set>"))
            .finish()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
