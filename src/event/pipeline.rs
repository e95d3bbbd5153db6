use super::dates::is_upcoming_on;
use super::model::EventRecord;
use chrono::{Local, NaiveDate};
use itertools::Itertools;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionedEvents {
    pub upcoming: Vec<EventRecord>,
    pub past: Vec<EventRecord>,
}

impl PartitionedEvents {
    pub fn len(&self) -> usize {
        self.upcoming.len() + self.past.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Removes repeated events keeping the first occurrence.
///
/// Name, location and url compare case-insensitively; the start date compares exactly.
pub fn dedupe(events: Vec<EventRecord>) -> Vec<EventRecord> {
    let total = events.len();
    let unique: Vec<EventRecord> = events
        .into_iter()
        .unique_by(|event| {
            (
                event.name.to_lowercase(),
                event.start_date.clone(),
                event.location.to_lowercase(),
                event.url.to_lowercase(),
            )
        })
        .collect();

    debug!("Removed {} duplicated events", total - unique.len());

    unique
}

pub fn partition(events: Vec<EventRecord>) -> PartitionedEvents {
    partition_on(events, Local::now().date_naive())
}

pub fn partition_on(events: Vec<EventRecord>, today: NaiveDate) -> PartitionedEvents {
    let (upcoming, past) = events
        .into_iter()
        .partition(|event| is_upcoming_on(&event.start_date, today));

    PartitionedEvents { upcoming, past }
}

/// Drops nameless events, removes duplicates and splits the rest around `today`
pub fn prepare_events(events: Vec<EventRecord>, today: NaiveDate) -> PartitionedEvents {
    let named: Vec<EventRecord> = events.into_iter().filter(EventRecord::has_name).collect();
    let partitioned = partition_on(dedupe(named), today);

    info!(
        "Got {} events ({} upcoming, {} past)",
        partitioned.len(),
        partitioned.upcoming.len(),
        partitioned.past.len()
    );

    partitioned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(name: &str, start_date: &str) -> EventRecord {
        EventRecord::new(
            name.to_string(),
            start_date.to_string(),
            start_date.to_string(),
            "Masonic Hall, Brookfield, WI".to_string(),
            "https://example.com/events".to_string(),
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test_log::test]
    fn when_names_differ_only_in_case_should_keep_first() {
        let result = dedupe(vec![
            event("Spring Fest", "08/08/2025"),
            event("SPRING FEST", "08/08/2025"),
        ]);

        assert_eq!(result, vec![event("Spring Fest", "08/08/2025")]);
    }

    #[test_log::test]
    fn should_not_merge_different_start_dates() {
        let result = dedupe(vec![
            event("Spring Fest", "08/08/2025"),
            event("Spring Fest", "09/08/2025"),
        ]);

        assert_eq!(result.len(), 2);
    }

    #[test_log::test]
    fn should_dedupe_idempotently_keeping_order() {
        let events = vec![
            event("B", "01/01/2026"),
            event("A", "01/01/2026"),
            event("b", "01/01/2026"),
            event("C", ""),
            event("a", "01/01/2026"),
        ];

        let once = dedupe(events);
        let twice = dedupe(once.clone());

        assert_eq!(
            once.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            vec!["B", "A", "C"]
        );
        assert_eq!(once, twice);
    }

    #[test_log::test]
    fn should_partition_into_disjoint_stable_halves() {
        let events = vec![
            event("Past", "17/10/2026"),
            event("Today", "18/10/2026"),
            event("Unknown", ""),
            event("Old", "01/01/2020"),
            event("Future", "01/01/2027"),
            event("Today", "18/10/2026"),
        ];

        let result = partition_on(events.clone(), today());

        assert_eq!(
            result.upcoming.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            vec!["Today", "Unknown", "Future", "Today"]
        );
        assert_eq!(
            result.past.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
            vec!["Past", "Old"]
        );
        assert_eq!(result.len(), events.len());
    }

    #[test_log::test]
    fn should_drop_nameless_events_before_partitioning() {
        let result = prepare_events(
            vec![
                event("  ", "01/01/2027"),
                event("Expo", "01/01/2027"),
                event("expo", "01/01/2027"),
            ],
            today(),
        );

        assert_eq!(result.upcoming, vec![event("Expo", "01/01/2027")]);
        assert!(result.past.is_empty());
    }
}
