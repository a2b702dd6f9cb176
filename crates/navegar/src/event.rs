//! Transition event records.
//!
//! Every page transition and browser-mutating interaction appends one
//! [`TransitionEvent`] to the run's [`EventLog`]. Events are diagnostic
//! trace only: append-only within a test's lifetime, never read back as
//! state. Each event's key names the artifact directory its diagnostic
//! captures land in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One recorded transition or interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    /// Unique event id
    pub id: Uuid,
    /// Position in the run's event sequence
    pub seq: u64,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// What happened
    pub description: String,
    /// Page the event is tagged with
    pub page: String,
}

impl TransitionEvent {
    /// Filesystem-safe key for artifacts captured around this event
    #[must_use]
    pub fn key(&self) -> String {
        format!("{:03}-{}-{}", self.seq, slug(&self.page), slug(&self.description))
    }
}

/// Lowercase, alphanumeric-and-dash form of a label
fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_dash = true;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Append-only event log for one test run
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<TransitionEvent>,
}

impl EventLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return a copy of the record
    pub fn record(&mut self, description: impl Into<String>, page: impl Into<String>) -> TransitionEvent {
        let event = TransitionEvent {
            id: Uuid::new_v4(),
            seq: self.events.len() as u64,
            timestamp: Utc::now(),
            description: description.into(),
            page: page.into(),
        };
        tracing::info!(page = %event.page, seq = event.seq, "{}", event.description);
        self.events.push(event.clone());
        event
    }

    /// All recorded events, oldest first
    #[must_use]
    pub fn events(&self) -> &[TransitionEvent] {
        &self.events
    }

    /// Number of recorded events
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been recorded yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
