use serde::Serialize;

/// Every interaction that lands in the click log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    StartGame,
    ColourClick,
    AllAgree,
    TimerExpired,
    Restart,
}

/// Event-specific fields, flattened next to the common ones when serialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum EventDetail {
    ColourClick {
        colour_index: usize,
        colour_name: String,
    },
    Decision {
        had_selection: bool,
        chosen_colour_index: Option<usize>,
        chosen_colour_name: Option<String>,
    },
    Plain {},
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub event: EventKind,
    pub time_ms: u64,
    pub slide_index: usize,
    pub selected_index: Option<usize>,
    #[serde(flatten)]
    pub detail: EventDetail,
}

/// Append-only, insertion-ordered record of the session
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Vec<LogEntry>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: LogEntry) {
        tracing::debug!(
            event = %entry.event,
            slide = entry.slide_index,
            selected = ?entry.selected_index,
            "logged"
        );
        self.entries.push(entry);
    }

    pub fn all(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }
}
