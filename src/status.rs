//! Status text and control state reported to the page
//!
//! The core never touches the DOM. It reports through a `StatusSink`; the
//! web front end implements it on top of the status element and buttons.

/// Enabled/visible state of the user controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    /// Start button is clickable
    pub start_enabled: bool,
    /// Reset button is shown and clickable
    pub reset_enabled: bool,
    /// A transition is running
    pub busy: bool,
}

pub trait StatusSink {
    fn set_status(&mut self, text: &str);

    fn set_controls(&mut self, controls: Controls);
}

/// Keeps every update, for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct RecordingStatus {
    pub messages: Vec<String>,
    pub controls: Vec<Controls>,
}

impl RecordingStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_message(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }

    pub fn last_controls(&self) -> Controls {
        self.controls.last().copied().unwrap_or_default()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.messages.iter().filter(|m| m.contains(needle)).count()
    }
}

impl StatusSink for RecordingStatus {
    fn set_status(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }

    fn set_controls(&mut self, controls: Controls) {
        self.controls.push(controls);
    }
}

/// Status line for a load in progress
pub fn progress_message(name: &str, loaded: u64, total: u64) -> String {
    match percent(loaded, total) {
        Some(p) => format!("Loading {}: {}%", name, p),
        None => format!("Loading {}...", name),
    }
}

fn percent(loaded: u64, total: u64) -> Option<u64> {
    if total == 0 {
        return None;
    }
    Some((loaded.min(total) * 100 + total / 2) / total)
}
