//! Newest-first record of what the server sent, shown beside the canvases.

use std::collections::VecDeque;

use rectviz_shared::ServerMessage;

use crate::config::MAX_LOG_ENTRIES;
use crate::util::{format_number, group_thousands};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogKind {
    Init,
    Update,
    Success,
    Complete,
    Status,
    Error,
}

impl LogKind {
    pub fn css_class(self) -> &'static str {
        match self {
            LogKind::Init => "log-init",
            LogKind::Update => "log-update",
            LogKind::Success => "log-success",
            LogKind::Complete => "log-complete",
            LogKind::Status => "log-status",
            LogKind::Error => "log-error",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub time: String,
    pub content: String,
    pub kind: LogKind,
}

#[derive(Debug)]
pub struct MessageLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::with_capacity(MAX_LOG_ENTRIES)
    }
}

impl MessageLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, time: String, (content, kind): (String, LogKind)) {
        self.entries.push_front(LogEntry {
            time,
            content,
            kind,
        });
        self.entries.truncate(self.capacity);
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

pub fn summarize(message: &ServerMessage) -> (String, LogKind) {
    match message {
        ServerMessage::Init { polygon, max_cores } => (
            format!(
                "Initialized: {} edges, {max_cores} cores available",
                polygon.edges.len()
            ),
            LogKind::Init,
        ),
        ServerMessage::Update(update) => {
            let contained = update.workers.iter().filter(|w| w.is_contained).count();
            let ids = update
                .workers
                .iter()
                .map(|w| w.worker_id.to_string())
                .collect::<Vec<_>>()
                .join(",");
            let content = format!(
                "Update [{ids}]: {contained}/{} contained (Best: {}, Checked: {})",
                update.workers.len(),
                format_number(update.current_best),
                group_thousands(update.checked_count)
            );
            let kind = if contained > 0 {
                LogKind::Success
            } else {
                LogKind::Update
            };
            (content, kind)
        }
        ServerMessage::Complete {
            result,
            checked_count,
        } => (
            format!(
                "✓ Complete! Result: {} (Checked: {})",
                format_number(*result),
                group_thousands(*checked_count)
            ),
            LogKind::Complete,
        ),
        ServerMessage::Status { running, paused } => {
            let label = match (running, paused) {
                (true, true) => "Paused",
                (true, false) => "Running",
                (false, _) => "Stopped",
            };
            (format!("Status: {label}"), LogKind::Status)
        }
    }
}

pub fn summarize_unknown(kind: &str) -> (String, LogKind) {
    (format!("Unknown message type: {kind}"), LogKind::Error)
}

#[cfg(test)]
#[path = "message_log_test.rs"]
mod message_log_test;
