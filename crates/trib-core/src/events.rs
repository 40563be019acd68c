//! Bounded operator-facing event stream.
//!
//! Each pipeline stage appends human-readable messages here in addition to
//! emitting `tracing` records. The log is a ring buffer: once `capacity` is
//! reached the oldest entries are dropped and counted.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of retained events.
pub const DEFAULT_CAPACITY: usize = 500;

// ---------------------------------------------------------------------------
// EventLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Info,
    Warn,
    Error,
}

impl EventLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for EventLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Pipeline stage that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Ingest,
    Overall,
    Validate,
    Subareas,
    Overlay,
    CurveNumbers,
    Aggregate,
    Export,
    Soils,
}

impl Stage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ingest => "ingest",
            Self::Overall => "overall",
            Self::Validate => "validate",
            Self::Subareas => "subareas",
            Self::Overlay => "overlay",
            Self::CurveNumbers => "curve_numbers",
            Self::Aggregate => "aggregate",
            Self::Export => "export",
            Self::Soils => "soils",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Event / EventLog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub level: EventLevel,
    pub stage: Stage,
    pub message: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog {
    entries: VecDeque<Event>,
    capacity: usize,
    dropped: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl EventLog {
    /// A log retaining at most `capacity` events (minimum 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
            dropped: 0,
        }
    }

    pub fn push(&mut self, level: EventLevel, stage: Stage, message: impl Into<String>) {
        let message = message.into();
        match level {
            EventLevel::Info => tracing::info!(stage = stage.as_str(), "{message}"),
            EventLevel::Warn => tracing::warn!(stage = stage.as_str(), "{message}"),
            EventLevel::Error => tracing::error!(stage = stage.as_str(), "{message}"),
        }

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
            self.dropped += 1;
        }
        self.entries.push_back(Event {
            level,
            stage,
            message,
            at: Utc::now(),
        });
    }

    pub fn info(&mut self, stage: Stage, message: impl Into<String>) {
        self.push(EventLevel::Info, stage, message);
    }

    pub fn warn(&mut self, stage: Stage, message: impl Into<String>) {
        self.push(EventLevel::Warn, stage, message);
    }

    pub fn error(&mut self, stage: Stage, message: impl Into<String>) {
        self.push(EventLevel::Error, stage, message);
    }

    /// Append every event of `other`, honoring this log's capacity.
    pub fn absorb(&mut self, other: Self) {
        self.dropped += other.dropped;
        for event in other.entries {
            if self.entries.len() == self.capacity {
                self.entries.pop_front();
                self.dropped += 1;
            }
            self.entries.push_back(event);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of events evicted to respect the capacity.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| e.level == EventLevel::Error)
    }
}
