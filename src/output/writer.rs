use super::dto::{EventsDocument, PublishedEvent};
use crate::config::model::OutputConfig;
use crate::event::model::EventRecord;
use crate::event::pipeline::PartitionedEvents;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{info, instrument};

pub const COMBINED_FILE: &str = "events.json";
pub const UPCOMING_FILE: &str = "events_upcoming.json";
pub const PAST_FILE: &str = "events_past.json";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("couldn't write '{path}': {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("couldn't serialize events: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub struct OutputWriter {
    config: OutputConfig,
}

impl OutputWriter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Writes the files of the configured layout, returning their paths
    #[instrument(skip_all, fields(dir = %self.config.data_dir.display()))]
    pub fn write(
        &self,
        events: &PartitionedEvents,
        now: NaiveDateTime,
    ) -> Result<Vec<PathBuf>, OutputError> {
        fs::create_dir_all(&self.config.data_dir).map_err(|source| OutputError::Io {
            path: self.config.data_dir.clone(),
            source,
        })?;

        let upcoming = self.publish(&events.upcoming);
        let past = self.publish(&events.past);
        let mut written = Vec::new();

        if self.config.layout.writes_combined() {
            let document = EventsDocument {
                last_updated: now.format(TIMESTAMP_FORMAT).to_string(),
                upcoming: upcoming.clone(),
                past: past.clone(),
            };

            written.push(self.write_json(COMBINED_FILE, &document)?);
        }

        if self.config.layout.writes_split() {
            written.push(self.write_json(UPCOMING_FILE, &upcoming)?);
            written.push(self.write_json(PAST_FILE, &past)?);
        }

        info!(
            "Wrote {} files ({} upcoming, {} past)",
            written.len(),
            upcoming.len(),
            past.len()
        );

        Ok(written)
    }

    fn publish<'a>(&self, events: &'a [EventRecord]) -> Vec<PublishedEvent<'a>> {
        events
            .iter()
            .map(|event| PublishedEvent::new(event, self.config.emit_link_alias))
            .collect()
    }

    fn write_json<T: Serialize>(&self, file_name: &str, value: &T) -> Result<PathBuf, OutputError> {
        let path = self.config.data_dir.join(file_name);
        let mut json = serde_json::to_string_pretty(value)?;
        json.push('\n');

        fs::write(&path, json).map_err(|source| OutputError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::OutputLayout;
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn events() -> PartitionedEvents {
        PartitionedEvents {
            upcoming: vec![EventRecord::new(
                "Festa de São João".to_string(),
                "24/06/2027".to_string(),
                "24/06/2027".to_string(),
                "Porto".to_string(),
                "https://example.com/sao-joao".to_string(),
            )],
            past: vec![],
        }
    }

    fn writer(dir: &TempDir, layout: OutputLayout, emit_link_alias: bool) -> OutputWriter {
        OutputWriter::new(OutputConfig {
            data_dir: dir.path().join("data"),
            layout,
            emit_link_alias,
        })
    }

    fn read(path: &PathBuf) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test_log::test]
    fn should_write_all_files() {
        let dir = TempDir::new().unwrap();

        let written = writer(&dir, OutputLayout::All, false)
            .write(&events(), now())
            .unwrap();

        let names: Vec<_> = written
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec![COMBINED_FILE, UPCOMING_FILE, PAST_FILE]);

        assert_eq!(
            read(&written[0]),
            json!({
                "last_updated": "2026-10-18T09:30:00",
                "upcoming": [{
                    "name": "Festa de São João",
                    "start_date": "24/06/2027",
                    "end_date": "24/06/2027",
                    "location": "Porto",
                    "url": "https://example.com/sao-joao"
                }],
                "past": []
            })
        );
        assert_eq!(read(&written[2]), json!([]));
    }

    #[test_log::test]
    fn should_keep_non_ascii_and_indent() {
        let dir = TempDir::new().unwrap();

        let written = writer(&dir, OutputLayout::Split, false)
            .write(&events(), now())
            .unwrap();

        let text = fs::read_to_string(&written[0]).unwrap();
        assert!(text.contains("\"Festa de São João\""), "{}", text);
        assert!(text.starts_with("[\n  {\n    \"name\""), "{}", text);
    }

    #[test_log::test]
    fn should_only_write_combined_document() {
        let dir = TempDir::new().unwrap();

        let written = writer(&dir, OutputLayout::Combined, true)
            .write(&events(), now())
            .unwrap();

        assert_eq!(written.len(), 1);
        assert_eq!(
            read(&written[0])["upcoming"][0]["link"],
            "https://example.com/sao-joao"
        );
        assert!(!dir.path().join("data").join(UPCOMING_FILE).exists());
    }
}
