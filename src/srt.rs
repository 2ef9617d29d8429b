use std::ops::Index;
use std::slice;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    pub(crate) start: Duration,
    pub(crate) text: String,
}

impl SubtitleEntry {
    pub fn new(start: Duration, text: impl Into<String>) -> Self {
        Self {
            start,
            text: text.into(),
        }
    }

    pub fn start(&self) -> Duration {
        self.start
    }

    pub fn start_seconds(&self) -> f64 {
        self.start.as_secs_f64()
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Entries ordered by start time. Built once by the parser and only read afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleTrack {
    entries: Vec<SubtitleEntry>,
}

impl SubtitleTrack {
    /// Stable-sorts `entries` so equal start times keep their source order.
    pub fn new(mut entries: Vec<SubtitleEntry>) -> Self {
        entries.sort_by_key(|e| e.start);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> slice::Iter<'_, SubtitleEntry> {
        self.entries.iter()
    }
}

impl Index<usize> for SubtitleTrack {
    type Output = SubtitleEntry;

    fn index(&self, index: usize) -> &SubtitleEntry {
        &self.entries[index]
    }
}
