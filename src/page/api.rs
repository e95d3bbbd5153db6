use super::model::Page;
use async_trait::async_trait;
use htmd::HtmlToMarkdown;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect, Client, StatusCode};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_REDIRECTS: usize = 5;

const MAIN_CONTENT_SELECTORS: [&str; 6] = [
    "main",
    "article",
    "[role='main']",
    "#content",
    ".content",
    "body",
];
const SKIPPED_TAGS: [&str; 6] = ["script", "style", "noscript", "nav", "header", "footer"];

#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("'{url}' is not a valid URL: {source}")]
    InvalidUrl { url: String, source: url::ParseError },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("page answered with status {0}")]
    Status(StatusCode),
}

/// Fetches pages over plain HTTP and renders their main content as markdown
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new() -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let response = self.client.get(parsed).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let html = response.text().await?;
        let markdown = html_to_markdown(&html);

        debug!(
            "Fetched {} bytes of HTML ({} chars of markdown)",
            html.len(),
            markdown.len()
        );

        Ok(Page::new(url.to_string(), markdown))
    }
}

pub fn html_to_markdown(html: &str) -> String {
    let content = main_content(html);
    let converter = HtmlToMarkdown::builder()
        .skip_tags(SKIPPED_TAGS.to_vec())
        .build();

    converter.convert(&content).unwrap_or_else(|err| {
        warn!("Markdown conversion failed ({}), falling back to plain text", err);
        Html::parse_fragment(&content)
            .root_element()
            .text()
            .collect::<Vec<_>>()
            .join("\n")
    })
}

/// HTML of the first main-content container, or the whole document
fn main_content(html: &str) -> String {
    let document = Html::parse_document(html);

    MAIN_CONTENT_SELECTORS
        .iter()
        .filter_map(|selector| Selector::parse(selector).ok())
        .find_map(|selector| document.select(&selector).next().map(|el| el.html()))
        .unwrap_or_else(|| document.html())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn should_prefer_main_over_body() {
        let html = r#"<html><body><nav>Home</nav><main><h1>Spring Fest</h1></main></body></html>"#;

        let content = main_content(html);

        assert!(content.starts_with("<main>"), "{}", content);
        assert!(!content.contains("Home"));
    }

    #[test_log::test]
    fn should_render_headings_and_skip_scripts() {
        let markdown = html_to_markdown(
            r#"<html><body>
                <script>var tracking = 1;</script>
                <h1>Spring Fest</h1>
                <p>August 8 - 11, 2025</p>
                <p>Masonic Hall, Brookfield, WI</p>
              </body></html>"#,
        );

        assert!(markdown.contains("# Spring Fest"), "{}", markdown);
        assert!(markdown.contains("August 8 - 11, 2025"), "{}", markdown);
        assert!(!markdown.contains("tracking"), "{}", markdown);
    }
}
