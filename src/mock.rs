// In-process stand-in for the classifier / Cyber Hub service, used by the
// client and controller tests. Keyword rules only; shapes match the real
// service.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
pub struct MockState {
    inner: Arc<MockInner>,
}

#[derive(Default)]
struct MockInner {
    hits: AtomicUsize,
    scans: AtomicUsize,
    manual: AtomicUsize,
    reports: Mutex<Vec<Value>>,
}

impl MockState {
    pub fn hits(&self) -> usize {
        self.inner.hits.load(Ordering::SeqCst)
    }

    pub fn scans(&self) -> usize {
        self.inner.scans.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.inner.hits.fetch_add(1, Ordering::SeqCst);
    }

    fn file_report(&self, report: Value) {
        if let Ok(mut reports) = self.inner.reports.lock() {
            reports.insert(0, report);
        }
    }
}

pub async fn spawn_mock_service() -> (String, MockState) {
    let state = MockState::default();
    let app = Router::new()
        .route("/analyze", post(analyze))
        .route("/challenge", post(challenge))
        .route("/report", post(report))
        .route("/api/platform/scan", post(scan))
        .route("/api/cyberhub/reports", get(reports))
        .route("/api/cyberhub/report", post(manual_report))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), state)
}

fn classify(text: &str) -> Value {
    let lower = text.to_lowercase();
    let (risk, level, icon, empathy, respect) = if lower.contains("die") {
        (0.92, "Ultra Toxic", "💀", 0.0, 0.2)
    } else if ["useless", "hate", "loser"].iter().any(|w| lower.contains(w)) {
        (0.78, "Toxic", "🔴", 0.1, 0.3)
    } else if lower.contains("nice") {
        (0.35, "Sarcastic", "🟡", 0.55, 0.8)
    } else {
        (0.1, "Safe", "🔵", 0.9, 0.95)
    };
    json!({
        "risk": risk, "level": level, "roast_icon": icon,
        "sarcasm_score": 0.2, "toxicity_score": risk,
        "explanation": "mock", "mood": "🙂", "meme": "mock meme",
        "empathy_score": empathy, "respect_score": respect,
        "mental_health": null, "polite_rewrite": null, "challenge_hint": null
    })
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn analyze(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.hit();
    let text = body["text"].as_str().unwrap_or("").trim().to_string();
    match text.as_str() {
        "" => error(StatusCode::BAD_REQUEST, "No text provided"),
        "REJECT" => error(StatusCode::BAD_REQUEST, "Text rejected"),
        "GARBAGE" => (StatusCode::OK, "<html>oops</html>").into_response(),
        "EXPLODE" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        t => Json(classify(t)).into_response(),
    }
}

async fn challenge(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.hit();
    let text = body["text"].as_str().unwrap_or("");
    let result = classify(text);
    let risk = result["risk"].as_f64().unwrap_or(1.0);
    let passed = risk < 0.3;
    let feedback = if passed { "Nailed it!" } else { "Almost there!" };
    Json(json!({
        "passed": passed, "risk": risk, "level": result["level"], "feedback": feedback
    }))
    .into_response()
}

async fn report(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.hit();
    if body["message"].as_str().unwrap_or("").trim().is_empty() {
        return error(StatusCode::BAD_REQUEST, "No message to report");
    }
    Json(json!({ "success": true, "response": "Report submitted anonymously." })).into_response()
}

fn post_json(platform: &str, user: &str, category: &str, severity: f64, action: &str, report_id: Option<&str>) -> Value {
    let threats = if category == "safe" {
        json!([])
    } else {
        json!([{ "type": category, "severity": severity, "detail": "mock" }])
    };
    let is_fraud = category == "fraud";
    let is_fake = category == "fake_media";
    let auto_reported = report_id.is_some();
    let content = format!("post by {}", user);
    json!({
        "platform": platform, "user": user, "content": content,
        "type": "message", "media": null,
        "analysis": {
            "risk": severity, "level": "Risky", "roast_icon": "🟠",
            "primary_category": category, "overall_severity": severity,
            "threats": threats,
            "fraud": { "score": 0.0, "is_fraud": is_fraud, "matched_patterns": [] },
            "fake_media": { "score": 0.0, "is_fake": is_fake, "indicators": [] },
            "explanation": "mock"
        },
        "action": {
            "action": action, "action_icon": "", "explanation": "mock",
            "auto_reported": auto_reported, "report_id": report_id
        }
    })
}

fn platform_feed(platform: &str) -> Vec<Value> {
    match platform {
        "whatsapp" => vec![
            post_json("whatsapp", "Unknown +91-XXX", "fraud", 0.9, "report_to_cyberhub", Some("CH-WA000001")),
            post_json("whatsapp", "Brother", "safe", 0.0, "monitor", None),
        ],
        "instagram" => vec![
            post_json("instagram", "@toxic_troll_42", "harassment", 0.7, "block", None),
            post_json("instagram", "@bestie_forever", "safe", 0.0, "monitor", None),
            post_json("instagram", "@news_breaker_x", "fake_media", 0.45, "flag", None),
        ],
        "twitter" => vec![
            post_json("twitter", "@hate_spreader", "toxicity", 0.85, "report_to_cyberhub", Some("CH-TW000001")),
            post_json("twitter", "@tech_daily", "safe", 0.0, "monitor", None),
        ],
        _ => vec![],
    }
}

async fn scan(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.hit();
    state.inner.scans.fetch_add(1, Ordering::SeqCst);
    let filter = body["platform"].as_str().unwrap_or("all").to_string();
    if filter == "twitter" {
        // lets tests overlap a slow scan with a fast one
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
    let platforms: Vec<&str> = if filter == "all" {
        vec!["whatsapp", "instagram", "twitter"]
    } else {
        vec![filter.as_str()]
    };

    let feed: Vec<Value> = platforms.iter().flat_map(|p| platform_feed(p)).collect();
    for item in &feed {
        if let Some(id) = item["action"]["report_id"].as_str() {
            state.file_report(json!({
                "id": id, "timestamp": "2025-03-01T12:00:00.000000",
                "platform": item["platform"], "reported_user": item["user"],
                "content_snippet": "N/A",
                "threats": [{ "type": item["analysis"]["primary_category"],
                              "severity": item["analysis"]["overall_severity"] }],
                "overall_severity": item["analysis"]["overall_severity"],
                "action_taken": "report_to_cyberhub", "status": "submitted",
                "status_icon": "📤", "priority": "critical"
            }));
        }
    }
    let threats = feed.iter().filter(|i| i["analysis"]["primary_category"] != "safe").count();
    let actions = feed
        .iter()
        .filter(|i| i["action"]["action"] == "block" || i["action"]["action"] == "report_to_cyberhub")
        .count();
    Json(json!({
        "feed": feed, "total": feed.len(), "threats_found": threats,
        "auto_actions": actions, "scan_complete": true
    }))
    .into_response()
}

async fn reports(State(state): State<MockState>) -> Response {
    state.hit();
    let reports = state.inner.reports.lock().map(|r| r.clone()).unwrap_or_default();
    Json(json!({
        "total": reports.len(), "critical": 0, "high": 0, "medium": 0,
        "reports": reports
    }))
    .into_response()
}

async fn manual_report(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.hit();
    if body["content"].as_str().unwrap_or("").is_empty() {
        return error(StatusCode::BAD_REQUEST, "No content provided");
    }
    let n = state.inner.manual.fetch_add(1, Ordering::SeqCst) + 1;
    let id = format!("CH-M{:07}", n);
    state.file_report(json!({
        "id": id, "timestamp": "2025-03-01T12:30:00.000000",
        "platform": body["platform"], "reported_user": body["user"],
        "content_snippet": body["content"],
        "threats": [{ "type": body["threat_type"], "severity": 0.7 }],
        "overall_severity": 0.7, "action_taken": "manual_report",
        "status": "submitted", "status_icon": "📤", "priority": "high"
    }));
    Json(json!({ "success": true, "report_id": id, "message": "Report submitted to Cyber Hub" })).into_response()
}
