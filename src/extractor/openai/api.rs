use super::dto::{parse_events_payload, ChatCompletionRequest, ChatCompletionResponse};
use crate::config::model::OpenAiConfig;
use crate::event::model::RawEvent;
use crate::extractor::{EventExtractor, ExtractionError};
use crate::page::model::Page;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const SYSTEM_PROMPT: &str = "\
Extract ALL events on this page as JSON.
Return ONLY a JSON object with key 'events' that is an array of objects.
Each object MUST have these keys exactly: name, start_date, end_date, location, url.
Dates MUST be dd/mm/yyyy. If the end date is missing, use an empty string.
Location format: 'Venue, City, State' when possible; else the best available.
The url must be an absolute link to the event details on this site.";

/// Extracts events by asking an OpenAI-compatible chat model
pub struct OpenAiExtractor {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiExtractor {
    pub fn new(config: OpenAiConfig) -> Result<Self, ExtractionError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl EventExtractor for OpenAiExtractor {
    fn name(&self) -> &'static str {
        "openai"
    }

    #[instrument(skip(self, page), fields(url = %page.url, model = %self.config.model))]
    async fn extract(&self, page: &Page) -> Result<Vec<RawEvent>, ExtractionError> {
        let content = truncate_chars(&page.markdown, self.config.max_content_chars);

        if content.len() < page.markdown.len() {
            warn!(
                "Page content truncated to {} characters",
                self.config.max_content_chars
            );
        }

        let user_prompt = format!("Page URL: {}\n\nPage content:\n{}", page.url, content);
        let request = ChatCompletionRequest::new(&self.config.model, SYSTEM_PROMPT, &user_prompt);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Status { status, body });
        }

        let json_response = response.text().await?;

        match serde_json::from_str::<ChatCompletionResponse>(&json_response) {
            Ok(parsed) => {
                let events = parse_events_payload(parsed.content().unwrap_or_default());

                info!("Model found {} events", events.len());

                Ok(events)
            }
            Err(e) => {
                error!("Response parse failed: {:?}", e);
                Ok(Vec::new())
            }
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
