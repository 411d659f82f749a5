// =============================================================================
// CYBERSHIELD CORE — api.rs
// Read-only snapshot API over the live session
// =============================================================================
//
//   GET /v1/status               session counters + in-flight operations
//   GET /v1/kindness             rolling averages + kindness index
//   GET /v1/activity             last ten analyses, level histogram
//   GET /v1/feed?platform=...    decorated feed of the latest scan
//   GET /v1/reports              decorated Cyber Hub reports + digest
//
// Handlers only take the read lock; nothing here mutates the session.
// =============================================================================

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::activity::ActivitySnapshot;
use crate::constants::{PRODUCT_NAME, VERSION};
use crate::cyberhub::{DecoratedReport, ReportsDigest};
use crate::feed::{DecoratedFeedItem, Platform, PlatformFilter, PlatformStats, ScanSummary};
use crate::kindness::KindnessAggregate;
use crate::session::{Session, SessionStatus};

pub type SharedSession = Arc<RwLock<Session>>;

#[derive(Serialize)]
pub struct StatusView {
    pub product: &'static str,
    pub version: &'static str,
    #[serde(flatten)]
    pub session: SessionStatus,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct KindnessView {
    #[serde(flatten)]
    pub aggregate: KindnessAggregate,
    pub kindness_index: f64,
    pub kindness_percent: u32,
}

#[derive(Serialize)]
pub struct FeedView {
    pub filter: String,
    pub summary: ScanSummary,
    pub breakdown: BTreeMap<Platform, PlatformStats>,
    pub items: Vec<DecoratedFeedItem>,
}

#[derive(Serialize)]
pub struct ReportsView {
    #[serde(flatten)]
    pub digest: ReportsDigest,
    pub reports: Vec<DecoratedReport>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub platform: Option<String>,
}

pub async fn status_handler(State(session): State<SharedSession>) -> Json<StatusView> {
    let status = session.read().await.status();
    Json(StatusView {
        product: PRODUCT_NAME,
        version: VERSION,
        session: status,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn kindness_handler(State(session): State<SharedSession>) -> Json<KindnessView> {
    let aggregate = session.read().await.kindness();
    Json(KindnessView {
        kindness_index: aggregate.kindness_index(),
        kindness_percent: aggregate.kindness_percent(),
        aggregate,
    })
}

pub async fn activity_handler(State(session): State<SharedSession>) -> Json<ActivitySnapshot> {
    Json(session.read().await.activity_snapshot())
}

pub async fn feed_handler(
    State(session): State<SharedSession>,
    Query(query): Query<FeedQuery>,
) -> Response {
    let filter = match query.platform.as_deref().unwrap_or("all").parse::<PlatformFilter>() {
        Ok(f) => f,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": e }))).into_response();
        }
    };
    let s = session.read().await;
    let mut breakdown = s.platform_breakdown();
    if let PlatformFilter::Only(p) = filter {
        breakdown.retain(|platform, _| *platform == p);
    }
    Json(FeedView {
        filter: filter.to_string(),
        summary: s.scan_summary(),
        breakdown,
        items: s.feed(filter),
    })
    .into_response()
}

pub async fn reports_handler(State(session): State<SharedSession>) -> Json<ReportsView> {
    let s = session.read().await;
    Json(ReportsView { digest: s.reports_digest(), reports: s.reports() })
}

pub fn router(session: SharedSession) -> Router {
    Router::new()
        .route("/v1/status", get(status_handler))
        .route("/v1/kindness", get(kindness_handler))
        .route("/v1/activity", get(activity_handler))
        .route("/v1/feed", get(feed_handler))
        .route("/v1/reports", get(reports_handler))
        .with_state(session)
}

pub async fn serve(session: SharedSession, addr: std::net::SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("📊 snapshot API on http://{}", listener.local_addr()?);
    axum::serve(listener, router(session)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::fixtures::result;
    use crate::classification::RiskLevel;
    use crate::client::ScanEnvelope;
    use crate::feed::fixtures::mixed_batch;
    use crate::session::Operation;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn get_json(session: SharedSession, uri: &str) -> (StatusCode, Value) {
        let resp = router(session)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn populated() -> SharedSession {
        let mut s = Session::new();
        for (level, risk, score) in [(RiskLevel::Safe, 0.1, 0.9), (RiskLevel::Toxic, 0.9, 0.1)] {
            let t = s.begin(Operation::Analyze).unwrap();
            s.complete_analysis(t, "sample text", result(level, risk, score, score));
        }
        let t = s.begin(Operation::Scan).unwrap();
        let feed = mixed_batch();
        let env = ScanEnvelope { total: feed.len(), feed, ..ScanEnvelope::default() };
        s.complete_scan(t, PlatformFilter::All, env);
        Arc::new(RwLock::new(s))
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let (code, body) = get_json(populated().await, "/v1/status").await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body["product"], "CyberShield");
        assert_eq!(body["samples"], 2);
        assert_eq!(body["threat_count"], 1);
        assert_eq!(body["feed_items"], 5);
        assert_eq!(body["activity_capacity"], 10);
    }

    #[tokio::test]
    async fn test_kindness_endpoint() {
        let (_, body) = get_json(populated().await, "/v1/kindness").await;
        assert_eq!(body["sample_count"], 2);
        assert!((body["kindness_index"].as_f64().unwrap() - 0.5).abs() < 1e-9);
        assert_eq!(body["kindness_percent"], 50);
    }

    #[tokio::test]
    async fn test_activity_endpoint_newest_first() {
        let (_, body) = get_json(populated().await, "/v1/activity").await;
        let records = body["records"].as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["sequence"], 2);
        assert_eq!(body["total_scanned"], 2);
    }

    #[tokio::test]
    async fn test_feed_endpoint_filters() {
        let session = populated().await;
        let (_, all) = get_json(session.clone(), "/v1/feed").await;
        assert_eq!(all["items"].as_array().unwrap().len(), 5);

        let (_, insta) = get_json(session.clone(), "/v1/feed?platform=instagram").await;
        let items = insta["items"].as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| i["item"]["platform"] == "instagram"));
        assert_eq!(insta["breakdown"].as_object().unwrap().len(), 1);

        let (code, body) = get_json(session, "/v1/feed?platform=myspace").await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("myspace"));
    }

    #[tokio::test]
    async fn test_reports_endpoint() {
        let (_, body) = get_json(populated().await, "/v1/reports").await;
        // the escalated whatsapp item is listed provisionally
        assert_eq!(body["total"], 1);
        assert_eq!(body["reports"][0]["priority_label"], "HIGH");
        assert_eq!(body["reports"][0]["platform_icon"], "💬");
    }

    #[tokio::test]
    async fn test_empty_session() {
        let session = Arc::new(RwLock::new(Session::new()));
        let (_, body) = get_json(session.clone(), "/v1/kindness").await;
        assert_eq!(body["kindness_index"], 0.0);
        let (_, feed) = get_json(session, "/v1/feed").await;
        assert!(feed["items"].as_array().unwrap().is_empty());
    }
}
