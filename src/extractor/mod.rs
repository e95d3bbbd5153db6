use crate::config::model::ExtractionConfig;
use crate::event::model::RawEvent;
use crate::page::model::Page;
use async_trait::async_trait;
use reqwest::StatusCode;

pub mod heuristic;
pub mod openai;

/// Turns the content of one page into raw events
#[async_trait]
pub trait EventExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn extract(&self, page: &Page) -> Result<Vec<RawEvent>, ExtractionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("request to the extraction backend failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("extraction backend answered with status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

pub fn build_extractor(
    config: &ExtractionConfig,
) -> Result<Box<dyn EventExtractor>, ExtractionError> {
    Ok(match config {
        ExtractionConfig::Heuristic => Box::new(heuristic::HeuristicExtractor),
        ExtractionConfig::OpenAi(openai) => {
            Box::new(openai::api::OpenAiExtractor::new(openai.clone())?)
        }
    })
}
