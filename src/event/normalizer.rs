use super::dates::normalize_date;
use super::model::{EventRecord, RawEvent};
use tracing::{instrument, warn};
use url::{ParseError, Url};

const NAME_KEYS: [&str; 3] = ["name", "event_name", "title"];
const START_KEYS: [&str; 3] = ["start_date", "from", "start"];
const END_KEYS: [&str; 3] = ["end_date", "to", "end"];
const LOCATION_KEYS: [&str; 3] = ["location", "place", "city"];
const URL_KEYS: [&str; 3] = ["url", "link", "page"];

/// Maps an extractor's event onto the canonical record.
///
/// `page_url` is the page the event was read from; it becomes the record URL when the
/// event carries none and is the base for relative links.
#[instrument(skip(raw))]
pub fn to_event(raw: &RawEvent, page_url: &str) -> EventRecord {
    let name = raw.first_text(&NAME_KEYS).unwrap_or_default();
    let (start_date, raw_start_date) = normalize_date_field(raw.first_text(&START_KEYS));
    let (mut end_date, raw_end_date) = normalize_date_field(raw.first_text(&END_KEYS));

    if end_date.is_empty() && raw_end_date.is_none() {
        end_date = start_date.clone();
    }

    let location = raw.first_text(&LOCATION_KEYS).unwrap_or_default();
    let url = raw
        .first_text(&URL_KEYS)
        .map(|link| absolute_url(&link, page_url))
        .unwrap_or_else(|| page_url.trim().to_string());

    EventRecord {
        name,
        start_date,
        end_date,
        location,
        url,
        raw_start_date,
        raw_end_date,
    }
}

/// Returns the canonical date plus the original text when it could not be parsed
fn normalize_date_field(text: Option<String>) -> (String, Option<String>) {
    match text {
        None => (String::new(), None),
        Some(text) => {
            let date = normalize_date(&text);

            if date.is_empty() {
                warn!("Unparseable date '{}' (keeping it as raw text)", text);
                (date, Some(text))
            } else {
                (date, None)
            }
        }
    }
}

/// Absolute links are kept as written; only relative ones are joined to the page URL
fn absolute_url(link: &str, page_url: &str) -> String {
    match Url::parse(link) {
        Ok(_) => link.to_string(),
        Err(ParseError::RelativeUrlWithoutBase) => Url::parse(page_url.trim())
            .and_then(|base| base.join(link))
            .map(|url| url.to_string())
            .unwrap_or_else(|_| link.to_string()),
        Err(_) => link.to_string(),
    }
}
