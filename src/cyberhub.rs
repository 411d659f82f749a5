// =============================================================================
// CYBERSHIELD CORE — cyberhub.rs
// ReportAggregator — escalated incidents, priority tiers, report cards
// =============================================================================
//
// Priority is a pure step function of overall severity:
//
//   severity ≥ 0.80 → CRITICAL
//   severity ≥ 0.50 → HIGH
//   otherwise       → MEDIUM
//
// The service sends its own priority string; it is ignored and recomputed
// here so the tiering stays a single local rule. Threat order is kept exactly
// as received (detection order).
// =============================================================================

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::classification::{clamp_unit, percent};
use crate::constants::{CRITICAL_SEVERITY, HIGH_SEVERITY};
use crate::feed::{lenient, lenient_vec, Platform};

// -----------------------------------------------------------------------------
// Priority
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
}

pub fn priority_of(overall_severity: f64) -> Priority {
    if overall_severity >= CRITICAL_SEVERITY {
        Priority::Critical
    } else if overall_severity >= HIGH_SEVERITY {
        Priority::High
    } else {
        Priority::Medium
    }
}

impl Priority {
    pub fn name(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High     => "high",
            Priority::Medium   => "medium",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Priority::Critical => "#ef4444",
            Priority::High     => "#f97316",
            Priority::Medium   => "#facc15",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Priority::Critical => "🔴",
            Priority::High     => "🟠",
            Priority::Medium   => "🟡",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// -----------------------------------------------------------------------------
// Report — wire shape of a Cyber Hub incident
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatTag {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient")]
    pub severity: f64,
}

impl ThreatTag {
    /// "fraud (75%)"
    pub fn tag(&self) -> String {
        format!("{} ({}%)", self.kind, percent(self.severity))
    }
}

/// Fields decode independently; a tag without a type is dropped, a report
/// with bad fields is still listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default, deserialize_with = "lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "lenient")]
    pub platform: String,
    #[serde(default, deserialize_with = "lenient")]
    pub reported_user: String,
    #[serde(default, deserialize_with = "lenient")]
    pub content_snippet: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub threats: Vec<ThreatTag>,
    #[serde(default, deserialize_with = "lenient")]
    pub overall_severity: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub action_taken: String,
    #[serde(default, deserialize_with = "lenient")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient")]
    pub status_icon: String,
}

impl Report {
    pub fn priority(&self) -> Priority {
        priority_of(self.overall_severity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecoratedReport {
    pub report: Report,
    pub priority: Priority,
    pub priority_label: String,
    pub priority_color: &'static str,
    pub priority_icon: &'static str,
    pub platform_icon: &'static str,
    pub threat_tags: Vec<String>,
    pub severity_bar: f64,
    pub action_label: String,
    pub display_timestamp: String,
}

/// Service timestamps are naive ISO-8601; RFC 3339 is accepted too. Anything
/// else is shown as received.
pub fn display_timestamp(raw: &str) -> String {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    raw.to_string()
}

pub fn decorate(report: &Report) -> DecoratedReport {
    let priority = report.priority();
    DecoratedReport {
        report: report.clone(),
        priority,
        priority_label: priority.name().to_uppercase(),
        priority_color: priority.color(),
        priority_icon: priority.icon(),
        platform_icon: Platform::from_name(&report.platform).icon(),
        threat_tags: report.threats.iter().map(ThreatTag::tag).collect(),
        severity_bar: clamp_unit(report.overall_severity) * 100.0,
        action_label: report.action_taken.replace('_', " "),
        display_timestamp: display_timestamp(&report.timestamp),
    }
}

pub fn decorate_all(reports: &[Report]) -> Vec<DecoratedReport> {
    reports.iter().map(decorate).collect()
}

// -----------------------------------------------------------------------------
// ReportsDigest — header counters of the Cyber Hub panel
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportsDigest {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
}

impl ReportsDigest {
    pub fn from_reports(reports: &[Report]) -> Self {
        let mut digest = ReportsDigest { total: reports.len(), ..Default::default() };
        for r in reports {
            match r.priority() {
                Priority::Critical => digest.critical += 1,
                Priority::High     => digest.high += 1,
                Priority::Medium   => digest.medium += 1,
            }
        }
        digest
    }
}

/// GET cyberhub-reports response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportsEnvelope {
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub critical: usize,
    #[serde(default)]
    pub high: usize,
    #[serde(default)]
    pub medium: usize,
    #[serde(deserialize_with = "lenient_vec")]
    pub reports: Vec<Report>,
}

impl ReportsEnvelope {
    pub fn service_digest(&self) -> ReportsDigest {
        ReportsDigest { total: self.total, critical: self.critical, high: self.high, medium: self.medium }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn report(id: &str, platform: &str, severity: f64) -> Report {
        Report {
            id: id.into(),
            timestamp: "2025-03-01T14:05:09.123456".into(),
            platform: platform.into(),
            reported_user: "@hate_spreader".into(),
            content_snippet: None,
            threats: vec![
                ThreatTag { kind: "toxicity".into(), severity: 0.72 },
                ThreatTag { kind: "harassment".into(), severity: 0.72 },
            ],
            overall_severity: severity,
            action_taken: "report_to_cyberhub".into(),
            status: "submitted".into(),
            status_icon: "📤".into(),
        }
    }
}
