pub mod cli;
pub mod config;
pub mod event;
pub mod extractor;
pub mod output;
pub mod page;
pub mod scraper;
pub mod sites;
pub mod tracing;
