use chrono::{Datelike, Local, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

pub const DATE_FORMAT: &str = "%d/%m/%Y";

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

lazy_static! {
    static ref CANONICAL_DATE: Regex = Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$")
        .expect("Failed to create canonical date regex");
    static ref ISO_DATE: Regex = Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})(?:\b|T)")
        .expect("Failed to create ISO date regex");
    static ref NUMERIC_DATE: Regex = Regex::new(r"\b(\d{1,2})[./-](\d{1,2})[./-](\d{4}|\d{2})\b")
        .expect("Failed to create numeric date regex");
    // Clock times come first so their digits are never read as a day
    static ref DATE_TOKEN: Regex =
        Regex::new(r"(?i)\d{1,2}:\d{2}(?::\d{2})?|(\d+)(?:st|nd|rd|th)?\b|([a-z]+)")
            .expect("Failed to create date token regex");
}

/// Date components found in a piece of text, any of which may be missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateParts {
    pub day: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl DateParts {
    /// A day or a month; a bare year does not place anything on the calendar
    pub fn has_date(&self) -> bool {
        self.day.is_some() || self.month.is_some()
    }

    /// Builds a date, filling a missing year from `today` and a missing day with the 1st.
    /// A month is required.
    pub fn resolve(&self, today: NaiveDate) -> Option<NaiveDate> {
        let month = self.month?;

        NaiveDate::from_ymd_opt(
            self.year.unwrap_or_else(|| today.year()),
            month,
            self.day.unwrap_or(1),
        )
    }
}

/// Normalizes free-form date text to `dd/mm/yyyy`.
///
/// Text already shaped like `d/m/yyyy` is only zero-padded, never reinterpreted.
/// Text that cannot be parsed yields an empty string.
pub fn normalize_date(text: &str) -> String {
    let text = text.trim();

    if text.is_empty() {
        return String::new();
    }

    if let Some(caps) = CANONICAL_DATE.captures(text) {
        return format!("{:0>2}/{:0>2}/{}", &caps[1], &caps[2], &caps[3]);
    }

    match parse_date(text) {
        Some(date) => date.format(DATE_FORMAT).to_string(),
        None => {
            debug!("Could not parse date '{}'", text);
            String::new()
        }
    }
}

pub fn parse_date(text: &str) -> Option<NaiveDate> {
    parse_date_on(text, Local::now().date_naive())
}

/// Fuzzy, day-first date parse using `today` for missing components
pub fn parse_date_on(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    parse_date_parts(text).resolve(today)
}

pub fn parse_date_parts(text: &str) -> DateParts {
    if let Some(caps) = ISO_DATE.captures(text) {
        return DateParts {
            day: caps[3].parse().ok(),
            month: caps[2].parse().ok(),
            year: caps[1].parse().ok(),
        };
    }

    if let Some(caps) = NUMERIC_DATE.captures(text) {
        let first: u32 = caps[1].parse().unwrap_or_default();
        let second: u32 = caps[2].parse().unwrap_or_default();
        let (day, month) = day_first(first, second);

        return DateParts {
            day: Some(day),
            month: Some(month),
            year: expand_year(&caps[3]),
        };
    }

    let tokens: Vec<DateToken> = DATE_TOKEN
        .captures_iter(text)
        .map(|caps| match (caps.get(1), caps.get(2)) {
            (Some(digits), _) => DateToken::from_digits(digits.as_str()),
            (None, Some(word)) => DateToken::from_word(word.as_str()),
            (None, None) => DateToken::Other,
        })
        .collect();

    let year = tokens.iter().find_map(|token| match token {
        DateToken::Year(year) => Some(*year),
        _ => None,
    });
    let mut days = tokens.iter().filter_map(|token| match token {
        DateToken::Day(day) => Some(*day),
        _ => None,
    });

    match pick_month(&tokens) {
        Some((month, day)) => DateParts {
            day: day.or_else(|| days.next()),
            month: Some(month),
            year,
        },
        None => match (days.next(), days.next()) {
            (Some(first), Some(second)) => {
                let (day, month) = day_first(first, second);

                DateParts {
                    day: Some(day),
                    month: (month <= 12).then_some(month),
                    year,
                }
            }
            (day, _) => DateParts {
                day,
                month: None,
                year,
            },
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateToken {
    Day(u32),
    Year(i32),
    /// `ambiguous` marks a lowercase "may", which is more often the verb
    Month { month: u32, ambiguous: bool },
    Other,
}

impl DateToken {
    fn from_digits(digits: &str) -> Self {
        match (digits.len(), digits.parse::<u32>()) {
            (1 | 2, Ok(day)) if (1..=31).contains(&day) => DateToken::Day(day),
            (4, Ok(year)) => DateToken::Year(year as i32),
            _ => DateToken::Other,
        }
    }

    fn from_word(word: &str) -> Self {
        match month_from_word(word) {
            Some(month) => DateToken::Month {
                month,
                ambiguous: word == "may",
            },
            None => DateToken::Other,
        }
    }
}

/// Month word to use, with the day written right next to it when there is one.
///
/// A month beside a day number wins over one that stands alone.
fn pick_month(tokens: &[DateToken]) -> Option<(u32, Option<u32>)> {
    let months: Vec<(usize, u32, bool)> = tokens
        .iter()
        .enumerate()
        .filter_map(|(index, token)| match token {
            DateToken::Month { month, ambiguous } => Some((index, *month, *ambiguous)),
            _ => None,
        })
        .collect();

    let adjacent_day = |index: usize| {
        [
            tokens.get(index + 1),
            index.checked_sub(1).and_then(|prev| tokens.get(prev)),
        ]
        .into_iter()
        .flatten()
        .find_map(|token| match token {
            DateToken::Day(day) => Some(*day),
            _ => None,
        })
    };

    months
        .iter()
        .find_map(|&(index, month, _)| adjacent_day(index).map(|day| (month, Some(day))))
        .or_else(|| {
            months
                .iter()
                .find(|(_, _, ambiguous)| !ambiguous)
                .or(months.first())
                .map(|&(_, month, _)| (month, None))
        })
}

/// `true` when `start_date` (`dd/mm/yyyy`) is today or later, or cannot be read
pub fn is_upcoming(start_date: &str) -> bool {
    is_upcoming_on(start_date, Local::now().date_naive())
}

pub fn is_upcoming_on(start_date: &str, today: NaiveDate) -> bool {
    match NaiveDate::parse_from_str(start_date.trim(), DATE_FORMAT) {
        Ok(date) => date >= today,
        Err(_) => true,
    }
}

fn day_first(first: u32, second: u32) -> (u32, u32) {
    if second > 12 && first <= 12 {
        (second, first)
    } else {
        (first, second)
    }
}

fn expand_year(digits: &str) -> Option<i32> {
    let year: i32 = digits.parse().ok()?;

    Some(match digits.len() {
        2 if year < 70 => 2000 + year,
        2 => 1900 + year,
        _ => year,
    })
}

fn month_from_word(word: &str) -> Option<u32> {
    let word = word.to_lowercase();

    if word.len() < 3 {
        return None;
    }

    MONTH_NAMES
        .iter()
        .position(|name| name.starts_with(&word))
        .map(|index| index as u32 + 1)
}
