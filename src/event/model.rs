use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const FALLBACK_EVENT_NAME: &str = "Event";

/// Canonical event shape, independent of the page or backend it came from
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventRecord {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub location: String,
    pub url: String,
    /// Original text of a start date that could not be parsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_end_date: Option<String>,
}

impl EventRecord {
    pub fn new(
        name: String,
        start_date: String,
        end_date: String,
        location: String,
        url: String,
    ) -> Self {
        Self {
            name,
            start_date,
            end_date,
            location,
            url,
            raw_start_date: None,
            raw_end_date: None,
        }
    }

    /// Record used when nothing useful could be read from a page
    pub fn fallback(source_url: &str) -> Self {
        Self::new(
            FALLBACK_EVENT_NAME.to_string(),
            String::new(),
            String::new(),
            String::new(),
            source_url.to_string(),
        )
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Loosely-typed event as handed over by an extractor.
///
/// Key names vary between producers, so values are looked up through
/// synonym lists by the normalizer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEvent(Map<String, Value>);

impl RawEvent {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// First non-empty text value among `keys`, trimmed
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .filter_map(value_as_text)
            .map(|text| text.trim().to_string())
            .find(|text| !text.is_empty())
    }
}

impl From<Map<String, Value>> for RawEvent {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<&EventRecord> for RawEvent {
    fn from(record: &EventRecord) -> Self {
        RawEvent::new()
            .with("name", record.name.as_str())
            .with("start_date", record.start_date.as_str())
            .with("end_date", record.end_date.as_str())
            .with("location", record.location.as_str())
            .with("url", record.url.as_str())
    }
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
