use clap::Parser;
use eventscout::cli::Cli;
use eventscout::config::env_loader::load_config;
use eventscout::config::model::Config;
use eventscout::scraper::{run_scrape, scrape_single, single_page_json};
use eventscout::tracing::setup_tracing;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let loki = setup_tracing().await;

    let exit_code = match load_config(cli.backend) {
        Ok(config) => match cli.test_url {
            Some(url) => test_single_url(&config, &url).await,
            None => run(&config, cli.dry_run).await,
        },
        Err(err) => {
            error!("Invalid configuration: {}", err);
            ExitCode::FAILURE
        }
    };

    if let Some(loki) = loki {
        loki.shutdown().await;
    }

    exit_code
}

async fn run(config: &Config, dry_run: bool) -> ExitCode {
    match run_scrape(config, dry_run).await {
        Ok(summary) => {
            info!(
                "Done: {} upcoming, {} past from {} pages ({} failed)",
                summary.events.upcoming.len(),
                summary.events.past.len(),
                summary.pages_scraped,
                summary.failed_urls.len()
            );
            summary
                .written_files
                .iter()
                .for_each(|path| info!("Wrote {}", path.display()));

            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Run failed: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn test_single_url(config: &Config, url: &str) -> ExitCode {
    let events = match scrape_single(config, url).await {
        Ok(events) => events,
        Err(err) => {
            error!("Couldn't set up scraping: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match single_page_json(&events) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("Couldn't serialize events: {}", err);
            ExitCode::FAILURE
        }
    }
}
