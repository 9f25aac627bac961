use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::SummaryError;

pub const DEFAULT_SUMMARIZER_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_SUMMARIZER_MODEL: &str = "openai/gpt-oss-120b";
/// Characters of fetched text sent to the summarizer; the rest is dropped.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 5_000;

const SYSTEM_PROMPT: &str = "You condense scraped web content into a short, factual plain-text \
digest for a knowledge base. Keep names, numbers and dates. Do not invent anything.";

/// Condense text. Failures are recoverable: callers keep the raw text instead.
#[async_trait::async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str, context: Option<&str>) -> Result<String, SummaryError>;
}

#[derive(Debug, Clone)]
pub struct SummarizerSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_input_chars: usize,
    pub request_timeout: Duration,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SUMMARIZER_URL.to_string(),
            model: DEFAULT_SUMMARIZER_MODEL.to_string(),
            api_key: None,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            request_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Summarizer backed by an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatSummarizer {
    settings: SummarizerSettings,
    client: reqwest::Client,
}

impl ChatSummarizer {
    pub fn new(settings: SummarizerSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self { settings, client })
    }

    fn build_prompt(&self, text: &str, context: Option<&str>) -> String {
        let input = truncate_chars(text, self.settings.max_input_chars);
        match context {
            Some(context) => format!(
                "Summarize the most recent and most important items ({context}) from the following scraped content:\n{input}"
            ),
            None => format!(
                "Summarize the most recent and most important items from the following scraped content:\n{input}"
            ),
        }
    }
}

#[async_trait::async_trait]
impl Summarizer for ChatSummarizer {
    async fn summarize(&self, text: &str, context: Option<&str>) -> Result<String, SummaryError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(SummaryError::MissingCredential)?;

        let prompt = self.build_prompt(text, context);
        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        let endpoint = format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    SummaryError::Timeout
                } else {
                    SummaryError::Network(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SummaryError::HttpStatus(status.as_u16()));
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|err| SummaryError::Malformed(err.to_string()))?;

        let content = payload
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SummaryError::Malformed("no choices in response".to_string()))?
            .message
            .content
            .unwrap_or_default();

        let content = content.trim();
        if content.is_empty() {
            return Err(SummaryError::Empty);
        }
        Ok(content.to_string())
    }
}

/// Prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
