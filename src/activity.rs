// =============================================================================
// CYBERSHIELD CORE — activity.rs
// ActivityLedger — the last ten analyzed texts, newest first
// =============================================================================
//
// Two different questions, two different scopes:
//   list() / counts_by_level()      — "what are the most recent ten"
//   total_scanned() / threat_count() — "how many ever" (session-wide,
//                                      unaffected by eviction)
//
// Text is stored untruncated; shortening for display belongs to the renderer.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::classification::{ClassificationResult, RiskLevel};
use crate::constants::LEDGER_CAPACITY;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub sequence: u64,
    pub source_text: String,
    pub result: ClassificationResult,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySnapshot {
    pub records: Vec<ActivityRecord>,
    pub counts_by_level: BTreeMap<RiskLevel, usize>,
    pub total_scanned: u64,
    pub threat_count: u64,
}

#[derive(Debug, Clone)]
pub struct ActivityLedger {
    records: VecDeque<ActivityRecord>,
    capacity: usize,
    next_sequence: u64,
    total_scanned: u64,
    threat_count: u64,
}

impl Default for ActivityLedger {
    fn default() -> Self {
        ActivityLedger::new()
    }
}

impl ActivityLedger {
    pub fn new() -> Self {
        ActivityLedger {
            records: VecDeque::with_capacity(LEDGER_CAPACITY + 1),
            capacity: LEDGER_CAPACITY,
            next_sequence: 1,
            total_scanned: 0,
            threat_count: 0,
        }
    }

    pub fn push(&mut self, text: &str, result: ClassificationResult) -> ActivityRecord {
        let record = ActivityRecord {
            sequence: self.next_sequence,
            source_text: text.to_string(),
            result,
            observed_at: Utc::now(),
        };
        self.next_sequence += 1;
        self.total_scanned += 1;
        if record.result.is_threat() {
            self.threat_count += 1;
        }

        self.records.push_front(record.clone());
        while self.records.len() > self.capacity {
            if let Some(evicted) = self.records.pop_back() {
                log::debug!("activity #{} evicted", evicted.sequence);
            }
        }
        record
    }

    /// Newest first.
    pub fn list(&self) -> impl Iterator<Item = &ActivityRecord> + '_ {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&ActivityRecord> {
        self.records.front()
    }

    /// Level histogram of the records currently held.
    pub fn counts_by_level(&self) -> BTreeMap<RiskLevel, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.result.level).or_insert(0) += 1;
        }
        counts
    }

    pub fn total_scanned(&self) -> u64 {
        self.total_scanned
    }

    pub fn threat_count(&self) -> u64 {
        self.threat_count
    }

    pub fn snapshot(&self) -> ActivitySnapshot {
        ActivitySnapshot {
            records: self.records.iter().cloned().collect(),
            counts_by_level: self.counts_by_level(),
            total_scanned: self.total_scanned,
            threat_count: self.threat_count,
        }
    }
}
