use crate::config::model::{Config, ConfigError};
use crate::event::model::EventRecord;
use crate::event::normalizer::to_event;
use crate::event::pipeline::{prepare_events, PartitionedEvents};
use crate::extractor::{build_extractor, EventExtractor, ExtractionError};
use crate::output::writer::OutputWriter;
use crate::page::api::{FetchError, HttpPageSource, PageSource};
use crate::sites::load_site_list;
use chrono::Local;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, info_span, instrument, warn, Instrument};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("couldn't set up scraping: {0}")]
    Setup(#[from] ScrapeError),
}

#[derive(Debug, Default)]
pub struct ScrapeReport {
    pub events: Vec<EventRecord>,
    pub pages_scraped: usize,
    pub failed_urls: Vec<String>,
}

#[derive(Debug)]
pub struct RunSummary {
    pub events: PartitionedEvents,
    pub pages_scraped: usize,
    pub failed_urls: Vec<String>,
    pub written_files: Vec<PathBuf>,
}

/// Walks the listed pages one at a time
pub struct ScrapeRunner {
    pages: Box<dyn PageSource>,
    extractor: Box<dyn EventExtractor>,
    page_delay: Duration,
}

impl ScrapeRunner {
    pub fn new(
        pages: Box<dyn PageSource>,
        extractor: Box<dyn EventExtractor>,
        page_delay: Duration,
    ) -> Self {
        Self {
            pages,
            extractor,
            page_delay,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ScrapeError> {
        Ok(Self::new(
            Box::new(HttpPageSource::new()?),
            build_extractor(&config.extraction)?,
            config.page_delay,
        ))
    }

    /// Events of a single page, normalized against the page URL
    #[instrument(skip(self), fields(extractor = self.extractor.name()))]
    pub async fn scrape_page(&self, url: &str) -> Result<Vec<EventRecord>, ScrapeError> {
        let page = self.pages.fetch(url).await?;
        let raw_events = self.extractor.extract(&page).await?;

        Ok(raw_events
            .iter()
            .map(|raw| to_event(raw, &page.url))
            .collect())
    }

    /// Events of a page checked on its own; a failing page is logged and gives no events
    pub async fn try_page(&self, url: &str) -> Vec<EventRecord> {
        self.scrape_page(url).await.unwrap_or_else(|err| {
            error!("Failed {}: {}", url, err);
            Vec::new()
        })
    }

    /// Scrapes every URL in order; a failing page is logged and skipped
    pub async fn scrape_sites(&self, urls: &[String]) -> ScrapeReport {
        let mut report = ScrapeReport::default();

        for (index, url) in urls.iter().enumerate() {
            if index > 0 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }

            info!("Scraping: {}", url);

            match self.scrape_page(url).await {
                Ok(mut events) => {
                    info!("Got {} events from {}", events.len(), url);
                    report.pages_scraped += 1;
                    report.events.append(&mut events);
                }
                Err(err) => {
                    warn!("Failed {}: {}", url, err);
                    report.failed_urls.push(url.to_string());
                }
            }
        }

        report
    }
}

/// Full run: scrape the site list, publish the partitioned events unless `dry_run`
pub async fn run_scrape(config: &Config, dry_run: bool) -> Result<RunSummary, RunError> {
    let run_id = Uuid::new_v4();

    async {
        let mut urls = load_site_list(&config.websites_file)?;

        if let Some(limit) = config.debug_config.url_limit {
            warn!("Limiting the run to {} sites", limit);
            urls.truncate(limit.max(0) as usize);
        }

        let runner = ScrapeRunner::from_config(config)?;
        let report = runner.scrape_sites(&urls).await;
        let events = prepare_events(report.events, Local::now().date_naive());

        let written_files = if dry_run {
            info!("Dry run, skipping writes");
            Vec::new()
        } else {
            OutputWriter::new(config.output.clone())
                .write(&events, Local::now().naive_local())
                .unwrap_or_else(|err| {
                    error!("Failed writing events: {}", err);
                    Vec::new()
                })
        };

        Ok(RunSummary {
            events,
            pages_scraped: report.pages_scraped,
            failed_urls: report.failed_urls,
            written_files,
        })
    }
    .instrument(info_span!("run", run_id = %run_id))
    .await
}

/// Events of one page, for checking a site before adding it to the list.
///
/// Only setting up the HTTP clients can fail; a page that cannot be scraped gives no events.
pub async fn scrape_single(config: &Config, url: &str) -> Result<Vec<EventRecord>, ScrapeError> {
    let runner = ScrapeRunner::from_config(config)?;

    Ok(runner.try_page(url.trim()).await)
}

/// JSON printed for a single page: one event as an object, anything else as an array
pub fn single_page_json(events: &[EventRecord]) -> serde_json::Result<String> {
    match events {
        [event] => serde_json::to_string_pretty(event),
        _ => serde_json::to_string_pretty(events),
    }
}
