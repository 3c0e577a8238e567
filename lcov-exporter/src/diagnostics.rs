// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Severity {
    Info,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogEntry {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LCOV EXPORTER [{}] {}", self.severity, self.message)
    }
}

/// Ordered, append-only diagnostics for one export.
///
/// Entries are only ever appended. [`ConfigLog::flush`] reports them in
/// insertion order and leaves the log empty.
#[derive(Clone, Debug, Default)]
pub struct ConfigLog {
    entries: Vec<LogEntry>,
}

impl ConfigLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, severity: Severity, message: impl Into<String>) {
        self.entries.push(LogEntry {
            severity,
            message: message.into(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.add(Severity::Info, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.add(Severity::Error, message);
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.severity == Severity::Error)
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Emit every entry through the `log` facade and hand them back.
    pub fn flush(&mut self) -> Vec<LogEntry> {
        let entries = std::mem::take(&mut self.entries);

        for entry in &entries {
            match entry.severity {
                Severity::Info => info!("{}", entry),
                Severity::Error => error!("{}", entry),
            }
        }

        entries
    }
}
