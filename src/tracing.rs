use lazy_static::lazy_static;
use std::{env, io};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_loki::url::Url;
use tracing_loki::BackgroundTaskController;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "warn,eventscout=trace";

lazy_static! {
    static ref LOKI_URL: Option<String> = env::var("LOKI_URL")
        .ok()
        .filter(|url| !url.trim().is_empty());
}

/// Keeps the Loki background task alive; flush it with [`LokiHandle::shutdown`] before exiting
pub struct LokiHandle {
    controller: BackgroundTaskController,
    task: JoinHandle<()>,
}

impl LokiHandle {
    pub async fn shutdown(self) {
        self.controller.shutdown().await;

        if let Err(err) = self.task.await {
            eprintln!("Loki task failed: {}", err);
        }
    }
}

fn build_loki_layer(
    base_url: Url,
) -> Result<(tracing_loki::Layer, LokiHandle), tracing_loki::Error> {
    let (layer, controller, task) = tracing_loki::builder()
        .label("service", "eventscout")?
        .build_controller_url(base_url)?;

    let task = tokio::spawn(task);

    Ok((layer, LokiHandle { controller, task }))
}

/// Logs to stdout (filtered by `RUST_LOG`), and to Loki too when `LOKI_URL` is set
pub async fn setup_tracing() -> Option<LokiHandle> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stdout));

    let Some(base_url) = LOKI_URL.as_ref() else {
        registry.init();
        info!("Loki URL not provided. Logging to stdout only.");
        return None;
    };

    let base_url: Url = match base_url.parse() {
        Ok(url) => url,
        Err(err) => {
            registry.init();
            warn!(
                "Invalid Loki URL '{}' ({}). Continuing without it.",
                base_url, err
            );
            return None;
        }
    };

    if reqwest::get(base_url.clone()).await.is_err() {
        registry.init();
        warn!("Couldn't connect to Loki. Continuing without it.");
        return None;
    }

    match build_loki_layer(base_url) {
        Ok((layer, handle)) => {
            registry.with(layer).init();
            info!("Loki initialized");

            Some(handle)
        }
        Err(err) => {
            registry.init();
            warn!("Couldn't set up Loki ({}). Continuing without it.", err);

            None
        }
    }
}
