use std::fmt::{Debug, Formatter};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug)]
pub struct Config {
    pub debug_config: DebugConfig,
    pub extraction: ExtractionConfig,
    pub websites_file: PathBuf,
    pub output: OutputConfig,
    pub page_delay: Duration,
}

#[derive(Debug)]
pub struct DebugConfig {
    pub url_limit: Option<i32>,
}

#[derive(Debug, Clone)]
pub enum ExtractionConfig {
    Heuristic,
    OpenAi(OpenAiConfig),
}

#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub max_content_chars: usize,
}

impl Debug for OpenAiConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("max_content_chars", &self.max_content_chars)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub data_dir: PathBuf,
    pub layout: OutputLayout,
    /// Also publish the record URL under `link` for older consumers
    pub emit_link_alias: bool,
}

#[derive(strum::EnumString, strum::IntoStaticStr, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExtractionBackend {
    Llm,
    Heuristic,
}

#[derive(strum::EnumString, strum::IntoStaticStr, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputLayout {
    /// `last_updated` plus both partitions in one document
    Combined,
    /// One bare array per partition
    Split,
    All,
}

impl OutputLayout {
    pub fn writes_combined(&self) -> bool {
        matches!(self, OutputLayout::Combined | OutputLayout::All)
    }

    pub fn writes_split(&self) -> bool {
        matches!(self, OutputLayout::Split | OutputLayout::All)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set.")]
    Missing(String),
    #[error("Invalid config '{name}'. Expected {expected}.")]
    Invalid { name: String, expected: &'static str },
    #[error("Couldn't read the site list at '{path}': {source}")]
    SiteList { path: PathBuf, source: io::Error },
}
