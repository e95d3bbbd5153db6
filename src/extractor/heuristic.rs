//! Event extraction from page markdown without a language model.
//!
//! A page is assumed to describe a single event: the title comes from the first heading,
//! the dates from the most range-like "Month Day, Year" line and the location from the
//! lines surrounding that date.

use super::{EventExtractor, ExtractionError};
use crate::event::dates::{parse_date_parts, DateParts, DATE_FORMAT};
use crate::event::model::{EventRecord, RawEvent, FALLBACK_EVENT_NAME};
use crate::page::model::Page;
use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, instrument};

const LOCATION_WINDOW: usize = 8;
const UNDATED_WINDOW: usize = 30;
const LOCATION_TRIM: &[char] = &[' ', ',', '-', '–', '—', '|', '·', '@', ':'];

const MONTH_PATTERN: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sept?(?:ember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?";

lazy_static! {
    static ref EVENT_KEYWORD: Regex = Regex::new(
        r"(?i)\b(?:festival|fest|conference|summit|workshop|expo|event|convention|symposium|fair)s?\b"
    )
    .expect("Failed to create event keyword regex");
    static ref MONTH_DAY_YEAR: Regex = Regex::new(&format!(
        r"(?i)(?:\b{month}\s+\d{{1,2}}(?:st|nd|rd|th)?\b|\b\d{{1,2}}(?:st|nd|rd|th)?\s+{month}(?:\s|,|$)).*\b\d{{4}}\b",
        month = MONTH_PATTERN
    ))
    .expect("Failed to create date line regex");
    static ref TIME_OF_DAY: Regex =
        Regex::new(r"(?i)(?:\d|\b)[ap]\.?m\b").expect("Failed to create time of day regex");
    static ref RANGE_SEPARATOR: Regex =
        Regex::new(r"(?i)\s*(?:[-–—~]|\b(?:to|through|until)\b)\s*")
            .expect("Failed to create range separator regex");
    static ref VENUE_KEYWORD: Regex = Regex::new(
        r"\b(?:Center|Centre|Hall|Arena|University|College|Stadium|Park|Theater|Theatre|Auditorium|Pavilion|Fairgrounds|Hotel|Museum|Church|Library|Club|Ballroom|Coliseum|Amphitheater|Gardens|Plaza|Lodge|Resort)\b"
    )
    .expect("Failed to create venue regex");
    static ref STREET_ADDRESS: Regex =
        Regex::new(r"\b\d{3,6}\s+[A-Za-z]").expect("Failed to create address regex");
    static ref CITY_STATE: Regex =
        Regex::new(r",\s*[A-Z]{2}\b").expect("Failed to create city/state regex");
    static ref LEADING_AT: Regex =
        Regex::new(r"(?i)^(?:at|@)\s+").expect("Failed to create leading 'at' regex");
    static ref WEEKDAYS: Regex = Regex::new(
        r"(?i)^(?:(?:mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?[\s,&–—-]*)+$"
    )
    .expect("Failed to create weekday regex");
    static ref MARKDOWN_LINK: Regex =
        Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("Failed to create markdown link regex");
}

pub struct HeuristicExtractor;

#[async_trait]
impl EventExtractor for HeuristicExtractor {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn extract(&self, page: &Page) -> Result<Vec<RawEvent>, ExtractionError> {
        let event = extract_event(&page.markdown, &page.url);

        Ok(vec![RawEvent::from(&event)])
    }
}

/// Reads a single event out of page markdown. Never fails: pages without anything
/// recognisable give an `"Event"` record pointing at `source_url`.
#[instrument(skip(markdown))]
pub fn extract_event(markdown: &str, source_url: &str) -> EventRecord {
    let lines: Vec<&str> = markdown
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        debug!("Empty page, using the fallback event");
        return EventRecord::fallback(source_url.trim());
    }

    let name = find_title(&lines);
    let date_index = find_date_line(&lines);
    let (start_date, end_date) = date_index
        .map(|index| parse_date_line(lines[index], Local::now().date_naive()))
        .unwrap_or_default();
    let location = find_location(&lines, date_index);

    debug!(
        "Found '{}' ({} - {}) at '{}'",
        name, start_date, end_date, location
    );

    EventRecord::new(name, start_date, end_date, location, source_url.trim().to_string())
}

fn find_title(lines: &[&str]) -> String {
    lines
        .iter()
        .filter(|line| is_heading(line))
        .chain(lines.iter().filter(|line| EVENT_KEYWORD.is_match(line)))
        .map(|line| clean_line(line))
        .find(|title| !title.is_empty())
        .unwrap_or_else(|| FALLBACK_EVENT_NAME.to_string())
}

/// Index of the date line, preferring lines that hold a range
fn find_date_line(lines: &[&str]) -> Option<usize> {
    let candidates: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| MONTH_DAY_YEAR.is_match(line) && !TIME_OF_DAY.is_match(line))
        .map(|(index, _)| index)
        .collect();

    candidates
        .iter()
        .find(|&&index| RANGE_SEPARATOR.is_match(lines[index]))
        .or_else(|| candidates.first())
        .copied()
}

/// Start and end dates (`dd/mm/yyyy`) read from a date line
fn parse_date_line(line: &str, today: NaiveDate) -> (String, String) {
    let line = clean_line(line);

    // A separator between weekday names ("Friday–Sunday") has no date on one side
    let halves: Vec<(DateParts, DateParts)> = RANGE_SEPARATOR
        .find_iter(&line)
        .map(|separator| {
            (
                parse_date_parts(&line[..separator.start()]),
                parse_date_parts(&line[separator.end()..]),
            )
        })
        .collect();
    let range = halves
        .iter()
        .find(|(start, end)| start.has_date() && end.has_date())
        .or(halves.first());

    let (start, end) = match range {
        Some(&(start, end)) => resolve_range(start, end, today),
        None => {
            let date = parse_date_parts(&line).resolve(today);
            (date, date)
        }
    };

    (format_date(start), format_date(end))
}

/// Fills the parts each side of a range leaves out from the other side
fn resolve_range(
    mut start: DateParts,
    mut end: DateParts,
    today: NaiveDate,
) -> (Option<NaiveDate>, Option<NaiveDate>) {
    if !start.has_date() {
        end.year = end.year.or(start.year);
        let date = end.resolve(today);
        return (date, date);
    }

    if !end.has_date() {
        start.year = start.year.or(end.year);
        let date = start.resolve(today);
        return (date, date);
    }

    let year_borrowed = start.year.is_none() && end.year.is_some();

    end.month = end.month.or(start.month);
    end.year = end.year.or(start.year);
    start.year = start.year.or(end.year);

    let end_date = end.resolve(today);
    let start_date = match (start.resolve(today), end_date) {
        (Some(start_date), Some(end_date)) if year_borrowed && start_date > end_date => {
            start_date.with_year(start_date.year() - 1)
        }
        (start_date, _) => start_date,
    };

    (start_date, end_date)
}

fn find_location(lines: &[&str], date_index: Option<usize>) -> String {
    let window = match date_index {
        Some(index) => {
            index.saturating_sub(LOCATION_WINDOW)..(index + LOCATION_WINDOW + 1).min(lines.len())
        }
        None => 0..UNDATED_WINDOW.min(lines.len()),
    };
    let candidates: Vec<String> = window
        .filter(|index| !is_heading(lines[*index]))
        .map(|index| match date_index {
            Some(date_index) if date_index == index => without_date(lines[index]),
            _ => lines[index].to_string(),
        })
        .collect();

    let venue = candidates.iter().find(|line| VENUE_KEYWORD.is_match(line));
    let city_state = candidates.iter().find(|line| CITY_STATE.is_match(line));
    let address = candidates.iter().find(|line| STREET_ADDRESS.is_match(line));

    let mut parts: Vec<String> = Vec::new();

    for part in [venue, city_state, address]
        .into_iter()
        .flatten()
        .map(|line| clean_line(line))
        .filter(|part| !part.is_empty())
    {
        let lowercase = part.to_lowercase();

        if !parts.iter().any(|kept| kept.to_lowercase().contains(&lowercase)) {
            parts.push(part);
        }
    }

    parts.join(", ")
}

/// What the date line says besides the date, e.g. the venue in "August 8, 2025 at Civic Center"
fn without_date(line: &str) -> String {
    let line = clean_line(line);

    let Some(date) = MONTH_DAY_YEAR.find(&line) else {
        return line;
    };

    let before = line[..date.start()].trim_end_matches(LOCATION_TRIM);
    let after = line[date.end()..].trim_start_matches(LOCATION_TRIM);
    let after = LEADING_AT.replace(after, "");

    [before, &*after]
        .into_iter()
        .filter(|part| !part.is_empty() && !WEEKDAYS.is_match(part))
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_heading(line: &str) -> bool {
    line.starts_with('#')
}

/// Strips heading, quote, list and emphasis markup and keeps link texts
fn clean_line(line: &str) -> String {
    let line = MARKDOWN_LINK.replace_all(line, "$1");

    line.trim_start_matches(['#', '>', '-', '*', '+', ' ', '\t'])
        .trim_end_matches(['#', ' ', '\t'])
        .replace("**", "")
        .replace("__", "")
        .replace('`', "")
        .trim()
        .to_string()
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|date| date.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}
