use chrono::Local;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::LogFormat;
use crate::error::PersistError;
use crate::event_log::{EventDetail, LogEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    /// Triggered once when the session ends
    Auto,
    /// Requested from the keyboard
    Manual,
}

/// Receives the full event log for durable storage
pub trait LogSink {
    fn persist(&mut self, entries: &[LogEntry], kind: SaveKind) -> Result<PathBuf, PersistError>;
}

/// Writes `clickLog_<stamp>.<ext>` files into a directory
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    format: LogFormat,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(dir: P, format: LogFormat) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            format,
        }
    }

    fn file_name(&self, kind: SaveKind) -> String {
        let stamp = Local::now().format("%Y%m%d-%H%M%S%.3f");
        let prefix = match kind {
            SaveKind::Auto => "clickLog",
            SaveKind::Manual => "clickLog_manual",
        };
        format!("{prefix}_{stamp}.{}", self.format.extension())
    }
}

impl LogSink for FileSink {
    fn persist(&mut self, entries: &[LogEntry], kind: SaveKind) -> Result<PathBuf, PersistError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(self.file_name(kind));
        match self.format {
            LogFormat::Json => fs::write(&path, serde_json::to_vec_pretty(entries)?)?,
            LogFormat::Csv => write_csv(&path, entries)?,
        }
        tracing::info!(path = %path.display(), entries = entries.len(), ?kind, "saved click log");
        Ok(path)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CsvRow<'a> {
    event: String,
    time_ms: u64,
    slide_index: usize,
    selected_index: Option<usize>,
    colour_index: Option<usize>,
    colour_name: Option<&'a str>,
    had_selection: Option<bool>,
    chosen_colour_index: Option<usize>,
    chosen_colour_name: Option<&'a str>,
}

impl<'a> From<&'a LogEntry> for CsvRow<'a> {
    fn from(e: &'a LogEntry) -> Self {
        let mut row = CsvRow {
            event: e.event.to_string(),
            time_ms: e.time_ms,
            slide_index: e.slide_index,
            selected_index: e.selected_index,
            colour_index: None,
            colour_name: None,
            had_selection: None,
            chosen_colour_index: None,
            chosen_colour_name: None,
        };
        match &e.detail {
            EventDetail::ColourClick {
                colour_index,
                colour_name,
            } => {
                row.colour_index = Some(*colour_index);
                row.colour_name = Some(colour_name);
            }
            EventDetail::Decision {
                had_selection,
                chosen_colour_index,
                chosen_colour_name,
            } => {
                row.had_selection = Some(*had_selection);
                row.chosen_colour_index = *chosen_colour_index;
                row.chosen_colour_name = chosen_colour_name.as_deref();
            }
            EventDetail::Plain {} => {}
        }
        row
    }
}

fn write_csv(path: &Path, entries: &[LogEntry]) -> Result<(), PersistError> {
    let mut writer = csv::Writer::from_path(path)?;
    for entry in entries {
        writer.serialize(CsvRow::from(entry))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::EventKind;
    use tempfile::tempdir;

    fn sample() -> Vec<LogEntry> {
        vec![
            LogEntry {
                event: EventKind::StartGame,
                time_ms: 10,
                slide_index: 0,
                selected_index: None,
                detail: EventDetail::Plain {},
            },
            LogEntry {
                event: EventKind::ColourClick,
                time_ms: 900,
                slide_index: 0,
                selected_index: Some(1),
                detail: EventDetail::ColourClick {
                    colour_index: 1,
                    colour_name: "Colour 2".into(),
                },
            },
            LogEntry {
                event: EventKind::AllAgree,
                time_ms: 1500,
                slide_index: 0,
                selected_index: Some(1),
                detail: EventDetail::Decision {
                    had_selection: true,
                    chosen_colour_index: Some(1),
                    chosen_colour_name: Some("Colour 2".into()),
                },
            },
        ]
    }

    #[test]
    fn json_sink_writes_an_array() {
        let dir = tempdir().unwrap();
        let mut sink = FileSink::new(dir.path().join("logs"), LogFormat::Json);
        let path = sink.persist(&sample(), SaveKind::Auto).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("clickLog_"));
        assert!(name.ends_with(".json"));

        let value: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        let arr = value.as_array().unwrap();
        assert_eq!(arr.len(), 3);
        assert_eq!(arr[1]["colourName"], "Colour 2");
        assert_eq!(arr[2]["hadSelection"], true);
    }

    #[test]
    fn manual_saves_are_named_apart() {
        let dir = tempdir().unwrap();
        let mut sink = FileSink::new(dir.path(), LogFormat::Json);
        let path = sink.persist(&sample(), SaveKind::Manual).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("clickLog_manual_"));
    }

    #[test]
    fn csv_sink_writes_header_and_sparse_rows() {
        let dir = tempdir().unwrap();
        let mut sink = FileSink::new(dir.path(), LogFormat::Csv);
        let path = sink.persist(&sample(), SaveKind::Auto).unwrap();
        assert!(path.extension().is_some_and(|e| e == "csv"));

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "event,timeMs,slideIndex,selectedIndex,colourIndex,colourName,hadSelection,chosenColourIndex,chosenColourName"
        );
        assert_eq!(lines[1], "START_GAME,10,0,,,,,,");
        assert_eq!(lines[2], "COLOUR_CLICK,900,0,1,1,Colour 2,,,");
        assert_eq!(lines[3], "ALL_AGREE,1500,0,1,,,true,1,Colour 2");
    }
}
