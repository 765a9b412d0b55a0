//! View auditing.
//!
//! Every access attempt mediated by a view can be recorded together with its
//! outcome. Entries are kept per view and trimmed oldest first.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::id::ViewId;
use crate::key::PropertyKey;
use crate::operation::Operation;

/// Default number of entries retained per view.
pub const DEFAULT_AUDIT_CAPACITY: usize = 1000;

/// How a mediated access ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessOutcome {
    /// Forwarded to the record.
    Permitted,

    /// Rejected by the privacy policy. `contains` on a private key also
    /// records this, even though it does not fail.
    Denied,

    /// Rejected because the view was revoked.
    Revoked,
}

/// An audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the access was attempted.
    pub timestamp: DateTime<Utc>,

    /// The view the access went through.
    pub view_id: ViewId,

    /// The attempted operation.
    pub operation: Operation,

    /// The targeted key; `None` for enumeration.
    pub key: Option<PropertyKey>,

    /// The outcome.
    pub outcome: AccessOutcome,
}

/// A bounded, shareable audit log.
#[derive(Debug, Clone)]
pub struct AuditLog {
    entries: Arc<DashMap<ViewId, VecDeque<AuditEntry>>>,
    max_entries_per_view: usize,
}

impl AuditLog {
    /// Create a new audit log keeping at most `max_entries_per_view` entries
    /// for each view.
    pub fn new(max_entries_per_view: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            max_entries_per_view,
        }
    }

    /// Log an access attempt.
    pub fn log_access(
        &self,
        view_id: ViewId,
        operation: Operation,
        key: Option<&PropertyKey>,
        outcome: AccessOutcome,
    ) {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            view_id,
            operation,
            key: key.cloned(),
            outcome,
        };

        let mut view_entries = self.entries.entry(view_id).or_insert_with(VecDeque::new);
        view_entries.push_back(entry);
        while view_entries.len() > self.max_entries_per_view {
            view_entries.pop_front();
        }
    }

    /// Get the entries for a view, oldest first.
    pub fn get_entries(&self, view_id: &ViewId) -> Vec<AuditEntry> {
        self.entries
            .get(view_id)
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Count the entries for a view with the given outcome.
    pub fn count(&self, view_id: &ViewId, outcome: AccessOutcome) -> usize {
        self.entries
            .get(view_id)
            .map(|entries| entries.iter().filter(|e| e.outcome == outcome).count())
            .unwrap_or(0)
    }

    /// Clear the entries for a view.
    pub fn clear_entries(&self, view_id: &ViewId) {
        self.entries.remove(view_id);
    }

    pub fn max_entries_per_view(&self) -> usize {
        self.max_entries_per_view
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIT_CAPACITY)
    }
}
