//! Builds engine components from a validated [`HarvestConfig`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use harvest_engine::{
    ArtifactWriter, CategoryDirs, ChatSummarizer, ContainerPublisher, ContainerSettings,
    ContentFetcher, DirectoryPublisher, FetchSettings, FirecrawlFetcher, FirecrawlSettings,
    PageFetcher, Publisher, RedditFetcher, RedditSettings, ReindexNotifier, RunSettings,
    SourceFetcher, SummarizerSettings,
};
use harvest_logging::{harvest_info, harvest_warn};

use crate::config::{Credentials, HarvestConfig, PublishTarget, WebBackend};

const REINDEX_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything a run needs, owned so the run can borrow it.
pub struct Components {
    pub settings: RunSettings,
    pub fetcher: SourceFetcher,
    pub writer: ArtifactWriter,
    pub summarizer: Option<ChatSummarizer>,
    pub publisher: Option<Box<dyn Publisher>>,
}

impl Components {
    pub fn build(config: &HarvestConfig, credentials: &Credentials) -> Result<Self> {
        Ok(Self {
            settings: config.run_settings(),
            fetcher: build_fetcher(config, credentials)?,
            writer: ArtifactWriter::new(config.output_dir.clone()),
            summarizer: build_summarizer(config, credentials)?,
            publisher: build_publisher(config)?,
        })
    }
}

fn build_fetcher(config: &HarvestConfig, credentials: &Credentials) -> Result<SourceFetcher> {
    let web: Arc<dyn ContentFetcher> = match config.web_backend {
        WebBackend::Firecrawl => {
            if credentials.firecrawl_api_key.is_none() {
                harvest_warn!("FIRECRAWL_API_KEY is not set; web sources will fail to fetch");
            }
            Arc::new(
                FirecrawlFetcher::new(FirecrawlSettings {
                    api_key: credentials.firecrawl_api_key.clone(),
                    ..FirecrawlSettings::default()
                })
                .context("failed to build firecrawl client")?,
            )
        }
        WebBackend::Direct => Arc::new(
            PageFetcher::new(FetchSettings::default()).context("failed to build http client")?,
        ),
    };
    let reddit = RedditFetcher::new(RedditSettings::default())
        .context("failed to build reddit client")?;
    Ok(SourceFetcher::new(web, Arc::new(reddit)))
}

fn build_summarizer(
    config: &HarvestConfig,
    credentials: &Credentials,
) -> Result<Option<ChatSummarizer>> {
    if !config.summarizer.enabled {
        harvest_info!("summarization disabled; raw text will be stored");
        return Ok(None);
    }
    if credentials.summarizer_api_key.is_none() {
        harvest_warn!("GROQ_API_KEY is not set; summaries will fall back to raw text");
    }
    let summarizer = ChatSummarizer::new(SummarizerSettings {
        base_url: config.summarizer.base_url.clone(),
        model: config.summarizer.model.clone(),
        api_key: credentials.summarizer_api_key.clone(),
        max_input_chars: config.summarizer.max_input_chars,
        ..SummarizerSettings::default()
    })
    .context("failed to build summarizer client")?;
    Ok(Some(summarizer))
}

fn build_publisher(config: &HarvestConfig) -> Result<Option<Box<dyn Publisher>>> {
    let dirs = CategoryDirs::new(config.categories.clone());
    let reindex = config
        .reindex_url
        .as_deref()
        .map(|url| ReindexNotifier::new(url, REINDEX_TIMEOUT))
        .transpose()
        .context("failed to build reindex client")?;

    let publisher: Box<dyn Publisher> = match &config.publish {
        PublishTarget::None => {
            harvest_info!("publishing disabled; artifacts stay local");
            return Ok(None);
        }
        PublishTarget::Directory { root } => {
            let publisher = DirectoryPublisher::new(root.clone(), dirs);
            match reindex {
                Some(notifier) => Box::new(publisher.with_reindex(notifier)),
                None => Box::new(publisher),
            }
        }
        PublishTarget::Container { name, root } => {
            let settings = ContainerSettings {
                container: name.clone(),
                root: root.clone(),
                ..ContainerSettings::default()
            };
            let publisher = ContainerPublisher::new(settings, dirs);
            match reindex {
                Some(notifier) => Box::new(publisher.with_reindex(notifier)),
                None => Box::new(publisher),
            }
        }
    };
    Ok(Some(publisher))
}
