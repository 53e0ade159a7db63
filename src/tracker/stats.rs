//! Status bucketing for the dashboard counters
//!
//! Folds per-status counts into three buckets. Storage backends feed it the
//! output of a grouped COUNT query; tests can feed it plain status lists.

use crate::tracker::types::Status;
use serde::{Deserialize, Serialize};

/// Dashboard bucket a status belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsBucket {
    Active,
    Pending,
    Completed,
}

impl StatsBucket {
    /// Bucket a status belongs to
    pub fn for_status(status: Status) -> Self {
        match status {
            Status::Invited | Status::Active | Status::InReview => Self::Active,
            Status::PendingDecision => Self::Pending,
            Status::Completed | Status::Accepted | Status::Rejected => Self::Completed,
        }
    }
}

/// Response for GET /api/stats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStats {
    pub active: i64,
    pub pending: i64,
    pub completed: i64,
}

impl ItemStats {
    /// Add `count` items with the given status
    pub fn add(&mut self, status: Status, count: i64) {
        match StatsBucket::for_status(status) {
            StatsBucket::Active => self.active += count,
            StatsBucket::Pending => self.pending += count,
            StatsBucket::Completed => self.completed += count,
        }
    }

    /// Fold `(status label, count)` rows from a GROUP BY query
    ///
    /// Labels that don't parse as a known status are skipped.
    pub fn from_grouped_counts<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: AsRef<str>,
    {
        let mut stats = Self::default();
        for (label, count) in rows {
            match label.as_ref().parse::<Status>() {
                Ok(status) => stats.add(status, count),
                Err(_) => {
                    tracing::warn!("Skipping unknown status '{}' in stats ({} rows)", label.as_ref(), count);
                }
            }
        }
        stats
    }

    /// Count an in-memory list of statuses
    pub fn from_statuses<I: IntoIterator<Item = Status>>(statuses: I) -> Self {
        let mut stats = Self::default();
        for status in statuses {
            stats.add(status, 1);
        }
        stats
    }
}
