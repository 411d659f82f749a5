// =============================================================================
// CYBERSHIELD CORE — session.rs
// Session — the one explicitly owned state object of a dashboard session
// =============================================================================
//
// Everything the presentation layer reads lives here and nowhere else:
//   RollingAggregator  — kindness averages
//   ActivityLedger     — last ten analyses + session counters
//   ScanBatch          — latest applied platform scan (replaced, never merged)
//   reports            — Cyber Hub reports from the last reload
//
// Every service call is bracketed by begin() → complete_*() / abort():
//   - begin() refuses an operation that is already in flight (Busy), except
//     Scan, which issues a new generation instead;
//   - complete_scan() with an older generation is Stale and changes nothing;
//   - abort() releases the guard; no aggregate is touched before a
//     well-formed response arrives.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use crate::activity::{ActivityLedger, ActivityRecord, ActivitySnapshot};
use crate::classification::ClassificationResult;
use crate::client::ScanEnvelope;
use crate::cyberhub::{decorate_all, DecoratedReport, Report, ReportsDigest, ReportsEnvelope};
use crate::error::{ShieldError, ShieldResult};
use crate::feed::{
    apply_presentation_mapping, escalate, filter_by_platform, platform_breakdown,
    DecoratedFeedItem, FeedItem, Platform, PlatformFilter, PlatformStats, ScanSummary,
};
use crate::kindness::{KindnessAggregate, RollingAggregator};

// -----------------------------------------------------------------------------
// Operation / Ticket
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Analyze,
    Challenge,
    Report,
    CyberhubReport,
    Scan,
    LoadReports,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Operation::Analyze        => "analysis",
            Operation::Challenge      => "challenge",
            Operation::Report         => "report",
            Operation::CyberhubReport => "cyber hub report",
            Operation::Scan           => "scan",
            Operation::LoadReports    => "reports reload",
        })
    }
}

/// Proof that begin() admitted an operation; consumed by complete_*/abort,
/// so a completion cannot be applied twice.
#[derive(Debug, PartialEq, Eq)]
pub struct Ticket {
    operation: Operation,
    generation: u64,
}

impl Ticket {
    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Applied(ScanSummary),
    Stale,
}

// -----------------------------------------------------------------------------
// ScanBatch — one applied scan
// -----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ScanBatch {
    pub generation: u64,
    pub filter: PlatformFilter,
    pub items: Vec<FeedItem>,
    pub decorated: Vec<DecoratedFeedItem>,
    pub summary: ScanSummary,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub samples: u64,
    pub activity_len: usize,
    pub activity_capacity: usize,
    pub total_scanned: u64,
    pub threat_count: u64,
    pub scan_generation: u64,
    pub feed_items: usize,
    pub reports: usize,
    pub in_flight: Vec<Operation>,
}

// -----------------------------------------------------------------------------
// Session
// -----------------------------------------------------------------------------

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    started_at: DateTime<Utc>,
    kindness: RollingAggregator,
    activity: ActivityLedger,
    feed: Option<ScanBatch>,
    scan_generation: u64,
    reports: Vec<Report>,
    in_flight: HashSet<Operation>,
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let id = Uuid::new_v4();
        log::info!("🛡️ Session {} started", id);
        Session {
            id,
            started_at: Utc::now(),
            kindness: RollingAggregator::new(),
            activity: ActivityLedger::new(),
            feed: None,
            scan_generation: 0,
            reports: Vec::new(),
            in_flight: HashSet::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Start a fresh session. Refused while any call is still outstanding.
    pub fn renew(&mut self) -> ShieldResult<Uuid> {
        if let Some(op) = self.in_flight.iter().min().copied() {
            return Err(ShieldError::Busy(op));
        }
        log::info!("Session {} closed", self.id);
        *self = Session::new();
        Ok(self.id)
    }

    // ---- in-flight guard -----------------------------------------------------

    pub fn begin(&mut self, operation: Operation) -> ShieldResult<Ticket> {
        if operation == Operation::Scan {
            self.scan_generation += 1;
            if !self.in_flight.insert(Operation::Scan) {
                log::info!("Scan #{} supersedes an outstanding scan", self.scan_generation);
            }
            return Ok(Ticket { operation, generation: self.scan_generation });
        }
        if !self.in_flight.insert(operation) {
            log::debug!("{} ignored: already in flight", operation);
            return Err(ShieldError::Busy(operation));
        }
        Ok(Ticket { operation, generation: 0 })
    }

    pub fn abort(&mut self, ticket: Ticket) {
        self.release(&ticket);
    }

    pub fn is_in_flight(&self, operation: Operation) -> bool {
        self.in_flight.contains(&operation)
    }

    fn release(&mut self, ticket: &Ticket) {
        if ticket.operation == Operation::Scan && ticket.generation != self.scan_generation {
            return;
        }
        self.in_flight.remove(&ticket.operation);
    }

    // ---- completions ---------------------------------------------------------

    pub fn complete_analysis(&mut self, ticket: Ticket, text: &str,
                             result: ClassificationResult) -> (ActivityRecord, KindnessAggregate) {
        debug_assert_eq!(ticket.operation, Operation::Analyze);
        self.release(&ticket);
        let kindness = self.kindness.record(&result);
        let record = self.activity.push(text, result);
        log::debug!("analysis #{} recorded ({}), {} samples",
            record.sequence, record.result.level, kindness.sample_count);
        (record, kindness)
    }

    /// Challenge, anonymous report and manual Cyber Hub report carry no state.
    pub fn finish(&mut self, ticket: Ticket) {
        debug_assert!(matches!(ticket.operation,
            Operation::Challenge | Operation::Report | Operation::CyberhubReport));
        self.release(&ticket);
    }

    pub fn complete_scan(&mut self, ticket: Ticket, filter: PlatformFilter,
                         envelope: ScanEnvelope) -> ScanOutcome {
        debug_assert_eq!(ticket.operation, Operation::Scan);
        if ticket.generation != self.scan_generation {
            log::info!("Scan #{} discarded: #{} is newer", ticket.generation, self.scan_generation);
            return ScanOutcome::Stale;
        }
        self.release(&ticket);

        let summary = ScanSummary::from_items(&envelope.feed);
        if summary != envelope.service_summary() {
            log::debug!("scan #{} counters differ from service: local {:?} vs {:?}",
                ticket.generation, summary, envelope.service_summary());
        }

        // Escalated items show up as provisional reports until the next reload.
        let mut provisional: Vec<Report> = envelope
            .feed
            .iter()
            .filter_map(escalate)
            .filter(|r| !self.reports.iter().any(|known| known.id == r.id))
            .collect();
        if !provisional.is_empty() {
            log::info!("🚨 {} item(s) escalated to Cyber Hub", provisional.len());
            provisional.append(&mut self.reports);
            self.reports = provisional;
        }

        let decorated = apply_presentation_mapping(&envelope.feed);
        self.feed = Some(ScanBatch {
            generation: ticket.generation,
            filter,
            items: envelope.feed,
            decorated,
            summary,
            received_at: Utc::now(),
        });
        ScanOutcome::Applied(summary)
    }

    pub fn complete_reports(&mut self, ticket: Ticket, envelope: ReportsEnvelope) -> ReportsDigest {
        debug_assert_eq!(ticket.operation, Operation::LoadReports);
        self.release(&ticket);
        let digest = ReportsDigest::from_reports(&envelope.reports);
        if digest != envelope.service_digest() {
            log::debug!("report tiers recomputed locally: {:?} (service said {:?})",
                digest, envelope.service_digest());
        }
        self.reports = envelope.reports;
        digest
    }

    // ---- read-only snapshots -------------------------------------------------

    pub fn kindness(&self) -> KindnessAggregate {
        self.kindness.snapshot()
    }

    pub fn activity(&self) -> &ActivityLedger {
        &self.activity
    }

    pub fn activity_snapshot(&self) -> ActivitySnapshot {
        self.activity.snapshot()
    }

    pub fn feed_batch(&self) -> Option<&ScanBatch> {
        self.feed.as_ref()
    }

    pub fn feed(&self, filter: PlatformFilter) -> Vec<DecoratedFeedItem> {
        match &self.feed {
            Some(batch) => filter_by_platform(&batch.decorated, filter).into_iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    pub fn scan_summary(&self) -> ScanSummary {
        self.feed.as_ref().map(|b| b.summary).unwrap_or_default()
    }

    pub fn platform_breakdown(&self) -> BTreeMap<Platform, PlatformStats> {
        self.feed.as_ref().map(|b| platform_breakdown(&b.items)).unwrap_or_default()
    }

    pub fn reports(&self) -> Vec<DecoratedReport> {
        decorate_all(&self.reports)
    }

    pub fn reports_digest(&self) -> ReportsDigest {
        ReportsDigest::from_reports(&self.reports)
    }

    pub fn status(&self) -> SessionStatus {
        let mut in_flight: Vec<Operation> = self.in_flight.iter().copied().collect();
        in_flight.sort();
        SessionStatus {
            session_id: self.id,
            started_at: self.started_at,
            samples: self.kindness.sample_count(),
            activity_len: self.activity.len(),
            activity_capacity: self.activity.capacity(),
            total_scanned: self.activity.total_scanned(),
            threat_count: self.activity.threat_count(),
            scan_generation: self.scan_generation,
            feed_items: self.feed.as_ref().map(|b| b.items.len()).unwrap_or(0),
            reports: self.reports.len(),
            in_flight,
        }
    }
}
