// =============================================================================
// CYBERSHIELD CORE — controller.rs
// Controller — user intents → service calls → session updates → hooks
// =============================================================================
//
// Each intent follows the same shape:
//
//   session.write().begin(op)      guard, short lock
//   client.<call>().await          no lock held
//   session.write().complete_*()   or abort() on failure
//   hooks.on_*()                   after the lock is released
//
// Scan and a manual Cyber Hub report are each followed by a reports reload.
// A failed or busy reload never turns a successful scan into an error.
// =============================================================================

use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::activity::ActivityRecord;
use crate::client::{ChallengeOutcome, CyberhubAck, ManualReport, ReportAck, ShieldClient};
use crate::cyberhub::{DecoratedReport, ReportsDigest};
use crate::error::{ShieldError, ShieldResult};
use crate::feed::{DecoratedFeedItem, PlatformFilter, ScanSummary};
use crate::kindness::KindnessAggregate;
use crate::session::{Operation, ScanOutcome, Session, Ticket};

// -----------------------------------------------------------------------------
// SessionHooks — change notifications for a presentation layer
// -----------------------------------------------------------------------------

pub trait SessionHooks: Send + Sync {
    fn on_analyzed(&self, _record: &ActivityRecord, _kindness: &KindnessAggregate) {}
    fn on_scanned(&self, _summary: &ScanSummary, _items: &[DecoratedFeedItem]) {}
    fn on_reports_loaded(&self, _digest: &ReportsDigest, _reports: &[DecoratedReport]) {}
}

/// Default hooks: one log line per event.
pub struct LogHooks;

impl SessionHooks for LogHooks {
    fn on_analyzed(&self, record: &ActivityRecord, kindness: &KindnessAggregate) {
        log::info!("#{} {} {} | kindness {}% over {} samples",
            record.sequence, record.result.roast_icon, record.result.level,
            kindness.kindness_percent(), kindness.sample_count);
    }

    fn on_scanned(&self, summary: &ScanSummary, _items: &[DecoratedFeedItem]) {
        log::info!("📡 scan: {} items, {} threats, {} auto actions",
            summary.total, summary.threats_found, summary.auto_actions);
    }

    fn on_reports_loaded(&self, digest: &ReportsDigest, _reports: &[DecoratedReport]) {
        log::info!("🚨 cyber hub: {} reports ({} critical, {} high, {} medium)",
            digest.total, digest.critical, digest.high, digest.medium);
    }
}

// -----------------------------------------------------------------------------
// Controller
// -----------------------------------------------------------------------------

#[derive(Clone)]
pub struct Controller {
    client: ShieldClient,
    session: Arc<RwLock<Session>>,
    hooks: Arc<dyn SessionHooks>,
}

impl Controller {
    pub fn new(client: ShieldClient, session: Arc<RwLock<Session>>) -> Self {
        Controller { client, session, hooks: Arc::new(LogHooks) }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn SessionHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn session(&self) -> Arc<RwLock<Session>> {
        self.session.clone()
    }

    /// begin → call → abort on failure. The call future is lazy, so nothing
    /// reaches the network before the guard admits it.
    async fn guarded<T, F>(&self, operation: Operation, call: F) -> ShieldResult<(Ticket, T)>
    where
        F: Future<Output = ShieldResult<T>>,
    {
        let ticket = self.session.write().await.begin(operation)?;
        match call.await {
            Ok(value) => Ok((ticket, value)),
            Err(e) => {
                self.session.write().await.abort(ticket);
                log::warn!("{} failed: {}", operation, e);
                Err(e)
            }
        }
    }

    pub async fn analyze(&self, text: &str) -> ShieldResult<ActivityRecord> {
        let (ticket, result) = self.guarded(Operation::Analyze, self.client.analyze(text)).await?;
        let (record, kindness) = self.session.write().await.complete_analysis(ticket, text.trim(), result);
        self.hooks.on_analyzed(&record, &kindness);
        Ok(record)
    }

    pub async fn challenge(&self, text: &str) -> ShieldResult<ChallengeOutcome> {
        let (ticket, outcome) = self.guarded(Operation::Challenge, self.client.challenge(text)).await?;
        self.session.write().await.finish(ticket);
        Ok(outcome)
    }

    pub async fn report(&self, message: &str, context: &str) -> ShieldResult<ReportAck> {
        let (ticket, ack) = self.guarded(Operation::Report, self.client.report(message, context)).await?;
        self.session.write().await.finish(ticket);
        log::info!("anonymous report: {}", ack.message());
        Ok(ack)
    }

    pub async fn submit_cyberhub_report(&self, report: &ManualReport) -> ShieldResult<CyberhubAck> {
        let (ticket, ack) = self
            .guarded(Operation::CyberhubReport, self.client.submit_cyberhub_report(report))
            .await?;
        self.session.write().await.finish(ticket);
        log::info!("🚨 {} filed against {}", ack.report_id, report.user);
        self.reload_after("cyber hub report").await;
        Ok(ack)
    }

    pub async fn scan(&self, filter: PlatformFilter) -> ShieldResult<ScanOutcome> {
        let (ticket, envelope) = self.guarded(Operation::Scan, self.client.scan(filter)).await?;
        let generation = ticket.generation();
        let (outcome, items) = {
            let mut session = self.session.write().await;
            let outcome = session.complete_scan(ticket, filter, envelope);
            (outcome, session.feed(PlatformFilter::All))
        };
        match outcome {
            ScanOutcome::Applied(summary) => {
                self.hooks.on_scanned(&summary, &items);
                self.reload_after("scan").await;
            }
            ScanOutcome::Stale => log::debug!("scan #{} superseded", generation),
        }
        Ok(outcome)
    }

    pub async fn load_reports(&self) -> ShieldResult<ReportsDigest> {
        let (ticket, envelope) = self
            .guarded(Operation::LoadReports, self.client.cyberhub_reports())
            .await?;
        let (digest, reports) = {
            let mut session = self.session.write().await;
            let digest = session.complete_reports(ticket, envelope);
            (digest, session.reports())
        };
        self.hooks.on_reports_loaded(&digest, &reports);
        Ok(digest)
    }

    async fn reload_after(&self, cause: &str) {
        match self.load_reports().await {
            Ok(_) => {}
            Err(ShieldError::Busy(_)) => log::debug!("reports reload after {} skipped: one in flight", cause),
            Err(e) => log::warn!("reports reload after {} failed: {}", cause, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::RiskLevel;
    use crate::config::ShieldConfig;
    use crate::cyberhub::Priority;
    use crate::feed::Platform;
    use crate::mock::{spawn_mock_service, MockState};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    async fn controller() -> (Controller, MockState) {
        let (url, state) = spawn_mock_service().await;
        let cfg = ShieldConfig { service_url: url, timeout: Duration::from_secs(5), ..ShieldConfig::default() };
        let client = ShieldClient::new(&cfg).unwrap();
        (Controller::new(client, Arc::new(RwLock::new(Session::new()))), state)
    }

    #[derive(Default)]
    struct CountingHooks {
        analyzed: AtomicUsize,
        scanned: AtomicUsize,
        reloaded: AtomicUsize,
    }

    impl SessionHooks for CountingHooks {
        fn on_analyzed(&self, _: &ActivityRecord, _: &KindnessAggregate) {
            self.analyzed.fetch_add(1, Ordering::SeqCst);
        }
        fn on_scanned(&self, _: &ScanSummary, _: &[DecoratedFeedItem]) {
            self.scanned.fetch_add(1, Ordering::SeqCst);
        }
        fn on_reports_loaded(&self, _: &ReportsDigest, _: &[DecoratedReport]) {
            self.reloaded.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_analyze_updates_ledger_and_kindness() {
        let (ctl, _) = controller().await;
        let record = ctl.analyze("you are useless").await.unwrap();
        assert_eq!(record.sequence, 1);
        assert_eq!(record.result.level, RiskLevel::Toxic);
        ctl.analyze("have a great day").await.unwrap();

        let session = ctl.session();
        let s = session.read().await;
        assert_eq!(s.activity().len(), 2);
        assert_eq!(s.activity().threat_count(), 1);
        assert_eq!(s.kindness().sample_count, 2);
        assert_eq!(s.activity().latest().unwrap().source_text, "have a great day");
    }

    #[tokio::test]
    async fn test_failed_analysis_changes_nothing() {
        let (ctl, _) = controller().await;
        for bad in ["REJECT", "GARBAGE", "EXPLODE", "   "] {
            assert!(ctl.analyze(bad).await.is_err());
        }
        let session = ctl.session();
        let s = session.read().await;
        assert!(s.activity().is_empty());
        assert_eq!(s.kindness().sample_count, 0);
        assert!(!s.is_in_flight(Operation::Analyze));
    }

    #[tokio::test]
    async fn test_semantic_error_keeps_service_message() {
        let (ctl, _) = controller().await;
        let err = ctl.analyze("REJECT").await.unwrap_err();
        assert_eq!(err.user_notice(), "Text rejected");
    }

    #[tokio::test]
    async fn test_busy_trigger_is_rejected() {
        let (ctl, state) = controller().await;
        let ticket = ctl.session().write().await.begin(Operation::LoadReports).unwrap();
        let err = ctl.load_reports().await.unwrap_err();
        assert!(matches!(err, ShieldError::Busy(Operation::LoadReports)));
        assert_eq!(state.hits(), 0);
        ctl.session().write().await.abort(ticket);
        assert!(ctl.load_reports().await.is_ok());
    }

    #[tokio::test]
    async fn test_scan_then_reports_continuation() {
        let (ctl, _) = controller().await;
        let hooks = Arc::new(CountingHooks::default());
        let ctl = ctl.with_hooks(hooks.clone());

        let outcome = ctl.scan(PlatformFilter::All).await.unwrap();
        let summary = match outcome {
            ScanOutcome::Applied(s) => s,
            ScanOutcome::Stale => panic!("single scan cannot be stale"),
        };
        assert_eq!(summary.total, 7);
        assert_eq!(hooks.scanned.load(Ordering::SeqCst), 1);
        assert_eq!(hooks.reloaded.load(Ordering::SeqCst), 1);

        let session = ctl.session();
        let s = session.read().await;
        assert_eq!(s.feed(PlatformFilter::Only(Platform::Instagram)).len(), 3);
        // both escalations came back from the service with tiers recomputed
        let digest = s.reports_digest();
        assert_eq!(digest.total, 2);
        assert_eq!(digest.critical, 2);
        assert!(s.reports().iter().all(|r| r.priority == Priority::Critical));
    }

    #[tokio::test]
    async fn test_newer_scan_wins() {
        let (ctl, state) = controller().await;
        // twitter is slow on the mock; whatsapp answers first
        let slow = ctl.scan(PlatformFilter::Only(Platform::Twitter));
        let fast = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            ctl.scan(PlatformFilter::Only(Platform::Whatsapp)).await
        };
        let (slow, fast) = tokio::join!(slow, fast);
        assert_eq!(slow.unwrap(), ScanOutcome::Stale);
        assert_eq!(state.scans(), 2);
        assert!(matches!(fast.unwrap(), ScanOutcome::Applied(_)));

        let session = ctl.session();
        let s = session.read().await;
        let feed = s.feed(PlatformFilter::All);
        assert!(!feed.is_empty());
        assert!(feed.iter().all(|d| d.item.platform == Platform::Whatsapp));
        assert!(!s.is_in_flight(Operation::Scan));
    }

    #[tokio::test]
    async fn test_manual_report_triggers_reload() {
        let (ctl, _) = controller().await;
        let hooks = Arc::new(CountingHooks::default());
        let ctl = ctl.with_hooks(hooks.clone());
        let mut report = ManualReport::new("instagram", "@troll_army", "nobody likes you");
        report.threat_type = "toxicity".into();
        let ack = ctl.submit_cyberhub_report(&report).await.unwrap();
        assert_eq!(hooks.reloaded.load(Ordering::SeqCst), 1);

        let session = ctl.session();
        let s = session.read().await;
        let reports = s.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].report.id, ack.report_id);
        assert_eq!(reports[0].priority, Priority::High);
    }

    #[tokio::test]
    async fn test_challenge_and_report_leave_aggregates_alone() {
        let (ctl, _) = controller().await;
        assert!(ctl.challenge("thanks for helping me out").await.unwrap().passed);
        assert!(ctl.report("spam wave in the group", "").await.unwrap().success);
        let session = ctl.session();
        let s = session.read().await;
        assert_eq!(s.kindness().sample_count, 0);
        assert!(s.status().in_flight.is_empty());
    }
}
