use crate::config::model::ExtractionBackend;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "eventscout",
    version,
    about = "Scrapes event listing pages into upcoming and past event files"
)]
pub struct Cli {
    /// Scrape and log the events without writing any file
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Scrape only this page and print its events as JSON
    #[arg(long, value_name = "URL")]
    pub test_url: Option<String>,

    /// Overrides EXTRACTION_BACKEND (llm or heuristic)
    #[arg(long, value_parser = parse_backend)]
    pub backend: Option<ExtractionBackend>,
}

fn parse_backend(value: &str) -> Result<ExtractionBackend, String> {
    value
        .parse()
        .map_err(|_| format!("unknown backend '{}' (expected llm or heuristic)", value))
}
