use crate::event::model::EventRecord;
use serde::Serialize;

/// Published form of an event.
///
/// `url` is canonical; `link` repeats it for consumers that still read the old name.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedEvent<'a> {
    pub name: &'a str,
    pub start_date: &'a str,
    pub end_date: &'a str,
    pub location: &'a str,
    pub url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_start_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_end_date: Option<&'a str>,
}

impl<'a> PublishedEvent<'a> {
    pub fn new(event: &'a EventRecord, emit_link_alias: bool) -> Self {
        Self {
            name: &event.name,
            start_date: &event.start_date,
            end_date: &event.end_date,
            location: &event.location,
            url: &event.url,
            link: emit_link_alias.then_some(event.url.as_str()),
            raw_start_date: event.raw_start_date.as_deref(),
            raw_end_date: event.raw_end_date.as_deref(),
        }
    }
}

/// The combined document: both partitions plus the time they were computed
#[derive(Debug, Serialize)]
pub struct EventsDocument<'a> {
    pub last_updated: String,
    pub upcoming: Vec<PublishedEvent<'a>>,
    pub past: Vec<PublishedEvent<'a>>,
}
