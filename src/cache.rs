//! Cache for monthly analytics views.
//!
//! Entries are keyed by user and stamped with the [`RecordVersion`] they were
//! computed from. A lookup only hits when the caller's current version
//! matches, so a new, replaced or deleted record makes the entry stale without
//! anyone having to remember to clear it.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::model::MonthlyAnalytics;

/// Identifies the state of one user's record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordVersion {
    pub latest_calculated: DateTime<Utc>,
    pub record_count: i64,
}

#[derive(Clone)]
struct CachedMonths {
    version: RecordVersion,
    months: Vec<MonthlyAnalytics>,
}

#[derive(Default)]
pub struct AnalyticsCache {
    entries: RwLock<HashMap<String, CachedMonths>>,
}

impl AnalyticsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: &str, version: RecordVersion) -> Option<Vec<MonthlyAnalytics>> {
        let guard = match self.entries.read() {
            Ok(guard) => guard,
            Err(_) => {
                warn!(user_id = %user_id, "Analytics cache lock poisoned, treating as miss");
                return None;
            }
        };
        guard
            .get(user_id)
            .filter(|entry| entry.version == version)
            .map(|entry| entry.months.clone())
    }

    pub fn insert(&self, user_id: &str, version: RecordVersion, months: Vec<MonthlyAnalytics>) {
        match self.entries.write() {
            Ok(mut guard) => {
                guard.insert(user_id.to_string(), CachedMonths { version, months });
            }
            Err(_) => warn!(user_id = %user_id, "Analytics cache lock poisoned, entry not stored"),
        }
    }

    pub fn invalidate(&self, user_id: &str) {
        match self.entries.write() {
            Ok(mut guard) => {
                guard.remove(user_id);
            }
            Err(_) => warn!(user_id = %user_id, "Analytics cache lock poisoned, entry not removed"),
        }
    }
}
