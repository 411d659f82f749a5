// =============================================================================
// CYBERSHIELD CORE — client.rs
// HTTP client for the classifier / Cyber Hub service
// =============================================================================
//
// Request/response JSON only; shapes are dictated by the service.
//
//   POST /analyze               {text}               → ClassificationResult
//   POST /challenge             {text}               → {passed, feedback}
//   POST /report                {message, context}   → {response}
//   POST /api/platform/scan     {platform}           → {feed, total, ...}
//   GET  /api/cyberhub/reports                       → {total, ..., reports}
//   POST /api/cyberhub/report   {platform, user, content, threat_type}
//
// Any body carrying {"error": "..."} is a semantic error regardless of the
// HTTP status. Everything else that fails to decode is Malformed.
// =============================================================================

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::classification::{ClassificationResult, RiskLevel};
use crate::config::ShieldConfig;
use crate::constants::*;
use crate::cyberhub::ReportsEnvelope;
use crate::error::{ShieldError, ShieldResult};
use crate::feed::{lenient, lenient_vec, FeedItem, PlatformFilter, ScanSummary};

// -----------------------------------------------------------------------------
// Wire envelopes
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanEnvelope {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub feed: Vec<FeedItem>,
    #[serde(default, deserialize_with = "lenient")]
    pub total: usize,
    #[serde(default, deserialize_with = "lenient")]
    pub threats_found: usize,
    #[serde(default, deserialize_with = "lenient")]
    pub auto_actions: usize,
}

impl ScanEnvelope {
    pub fn service_summary(&self) -> ScanSummary {
        ScanSummary { total: self.total, threats_found: self.threats_found, auto_actions: self.auto_actions }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeOutcome {
    pub passed: bool,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub risk: Option<f64>,
    #[serde(default)]
    pub level: Option<RiskLevel>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReportAck {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response: Option<String>,
}

impl ReportAck {
    pub fn message(&self) -> &str {
        match self.response.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => DEFAULT_REPORT_ACK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualReport {
    pub platform: String,
    pub user: String,
    pub content: String,
    pub threat_type: String,
}

impl ManualReport {
    pub fn new(platform: &str, user: &str, content: &str) -> Self {
        ManualReport {
            platform: platform.to_string(),
            user: user.to_string(),
            content: content.to_string(),
            threat_type: "harassment".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CyberhubAck {
    #[serde(default)]
    pub success: bool,
    pub report_id: String,
    #[serde(default)]
    pub message: String,
}

// -----------------------------------------------------------------------------
// ShieldClient
// -----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ShieldClient {
    http: reqwest::Client,
    base_url: String,
}

impl ShieldClient {
    pub fn new(config: &ShieldConfig) -> ShieldResult<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(ShieldClient { http, base_url: config.service_url.clone() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> ShieldResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        log::debug!("POST {}", path);
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        decode(path, resp).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ShieldResult<T> {
        log::debug!("GET {}", path);
        let resp = self.http.get(self.url(path)).send().await?;
        decode(path, resp).await
    }

    pub async fn analyze(&self, text: &str) -> ShieldResult<ClassificationResult> {
        let text = require_text(text, "No text provided")?;
        self.post_json(ANALYZE_PATH, &serde_json::json!({ "text": text })).await
    }

    pub async fn challenge(&self, text: &str) -> ShieldResult<ChallengeOutcome> {
        let text = require_text(text, "No text provided")?;
        self.post_json(CHALLENGE_PATH, &serde_json::json!({ "text": text })).await
    }

    pub async fn report(&self, message: &str, context: &str) -> ShieldResult<ReportAck> {
        let message = require_text(message, "No message to report")?;
        let body = serde_json::json!({ "message": message, "context": context.trim() });
        self.post_json(REPORT_PATH, &body).await
    }

    pub async fn scan(&self, filter: PlatformFilter) -> ShieldResult<ScanEnvelope> {
        self.post_json(SCAN_PATH, &serde_json::json!({ "platform": filter.as_str() })).await
    }

    pub async fn cyberhub_reports(&self) -> ShieldResult<ReportsEnvelope> {
        self.get_json(CYBERHUB_REPORTS_PATH).await
    }

    pub async fn submit_cyberhub_report(&self, report: &ManualReport) -> ShieldResult<CyberhubAck> {
        require_text(&report.content, "No content provided")?;
        self.post_json(CYBERHUB_REPORT_PATH, report).await
    }
}

fn require_text<'a>(text: &'a str, message: &str) -> ShieldResult<&'a str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(ShieldError::Semantic(message.to_string()))
    } else {
        Ok(trimmed)
    }
}

async fn decode<T: DeserializeOwned>(path: &str, resp: reqwest::Response) -> ShieldResult<T> {
    let status = resp.status();
    let body = resp.text().await?;

    let value: serde_json::Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) if status.is_success() => return Err(ShieldError::malformed(path, e)),
        Err(_) => return Err(ShieldError::malformed(path, format!("HTTP {}", status))),
    };

    if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
        log::info!("{} rejected: {}", path, message);
        return Err(ShieldError::Semantic(message.to_string()));
    }
    if !status.is_success() {
        return Err(ShieldError::malformed(path, format!("HTTP {}", status)));
    }

    serde_json::from_value(value).map_err(|e| ShieldError::malformed(path, e))
}
