// =============================================================================
// CYBERSHIELD CORE — feed.rs
// FeedClassifier / ActionMapper — platform scan results → badges and actions
// =============================================================================
//
// A scan returns a batch of FeedItems (whatsapp / instagram / twitter), each
// already analyzed and assigned an action by the service. This module only
// decides how they look:
//
//   primary_category  → one category badge
//   fraud.is_fraud    → + 🎣 Fraud badge     (additive, not exclusive)
//   fake_media.is_fake→ + 🎭 Fake badge
//   action            → style class + icon
//   platform          → icon + color
//
// Unknown values never fail: category falls back to Safe, action to Monitor,
// platform to 🌐. Each field falls back to its own default when it is null or
// of the wrong shape, so one bad value never hides the rest of the item, and
// one bad item never drops the rest of the scan.
// =============================================================================

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::classification::{percent, RiskLevel};
use crate::constants::UNKNOWN_PLATFORM_ICON;
use crate::cyberhub::{Report, ThreatTag};

/// Decode one field, falling back to its default when the service sent null
/// or something of the wrong shape. Siblings are unaffected.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Decode a list entry by entry; entries that do not decode are dropped and
/// the rest are kept in order. Anything other than an array is empty.
pub(crate) fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let serde_json::Value::Array(entries) = serde_json::Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                log::warn!("dropped malformed entry: {}", e);
                None
            }
        })
        .collect())
}

// -----------------------------------------------------------------------------
// Platform
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Whatsapp,
    Instagram,
    Twitter,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Platform {
    pub const KNOWN: [Platform; 3] = [Platform::Whatsapp, Platform::Instagram, Platform::Twitter];

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Whatsapp  => "whatsapp",
            Platform::Instagram => "instagram",
            Platform::Twitter   => "twitter",
            Platform::Unknown   => "unknown",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Platform::Whatsapp  => "💬",
            Platform::Instagram => "📸",
            Platform::Twitter   => "🐦",
            Platform::Unknown   => UNKNOWN_PLATFORM_ICON,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Platform::Whatsapp  => "#25D366",
            Platform::Instagram => "#E1306C",
            Platform::Twitter   => "#1DA1F2",
            Platform::Unknown   => "#94a3b8",
        }
    }

    /// Lenient lookup used for report platforms; anything unrecognised is Unknown.
    pub fn from_name(name: &str) -> Platform {
        match name.trim().to_ascii_lowercase().as_str() {
            "whatsapp"  => Platform::Whatsapp,
            "instagram" => Platform::Instagram,
            "twitter"   => Platform::Twitter,
            _           => Platform::Unknown,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// -----------------------------------------------------------------------------
// PlatformFilter — "all" or one platform
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlatformFilter {
    #[default]
    All,
    Only(Platform),
}

impl PlatformFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformFilter::All => "all",
            PlatformFilter::Only(p) => p.name(),
        }
    }

    pub fn admits(&self, platform: Platform) -> bool {
        match self {
            PlatformFilter::All => true,
            PlatformFilter::Only(p) => *p == platform,
        }
    }
}

impl FromStr for PlatformFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(PlatformFilter::All),
            other => match Platform::from_name(other) {
                Platform::Unknown => Err(format!("unknown platform: {}", other)),
                p => Ok(PlatformFilter::Only(p)),
            },
        }
    }
}

impl std::fmt::Display for PlatformFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// -----------------------------------------------------------------------------
// Category / ActionKind — fixed lookup tables
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Safe,
    Toxicity,
    Fraud,
    FakeMedia,
    Harassment,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub class: &'static str,
    pub icon: &'static str,
    pub label: &'static str,
}

pub const FRAUD_BADGE: Badge = Badge { class: "badge-fraud", icon: "🎣", label: "Fraud" };
pub const FAKE_BADGE: Badge = Badge { class: "badge-fake", icon: "🎭", label: "Fake" };

impl Category {
    pub fn badge(&self) -> Badge {
        match self {
            Category::Safe | Category::Unknown => Badge { class: "badge-safe", icon: "✅", label: "Safe" },
            Category::Toxicity   => Badge { class: "badge-toxic", icon: "☠️", label: "Toxic" },
            Category::Fraud      => FRAUD_BADGE,
            Category::FakeMedia  => Badge { class: "badge-fake", icon: "🎭", label: "Fake Media" },
            Category::Harassment => Badge { class: "badge-ultra", icon: "⚠️", label: "Harassment" },
        }
    }

    pub fn is_threat(&self) -> bool {
        !matches!(self, Category::Safe | Category::Unknown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    #[default]
    Monitor,
    Flag,
    Block,
    ReportToCyberhub,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionStyle {
    pub class: &'static str,
    pub icon: &'static str,
    pub label: &'static str,
}

impl ActionKind {
    pub fn style(&self) -> ActionStyle {
        match self {
            ActionKind::Monitor | ActionKind::Unknown => ActionStyle { class: "action-monitor", icon: "👁️", label: "monitor" },
            ActionKind::Flag  => ActionStyle { class: "action-flag", icon: "🚩", label: "flag" },
            ActionKind::Block => ActionStyle { class: "action-block", icon: "🛑", label: "block" },
            ActionKind::ReportToCyberhub => ActionStyle { class: "action-report", icon: "🚨", label: "report to cyberhub" },
        }
    }

    /// Block and escalation are actions the service took on its own.
    pub fn is_automatic(&self) -> bool {
        matches!(self, ActionKind::Block | ActionKind::ReportToCyberhub)
    }
}

// -----------------------------------------------------------------------------
// FeedItem — wire shape of one scanned post
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Threat {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient")]
    pub severity: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FraudSignal {
    #[serde(default, deserialize_with = "lenient")]
    pub score: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub is_fraud: bool,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub matched_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FakeMediaSignal {
    #[serde(default, deserialize_with = "lenient")]
    pub score: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub is_fake: bool,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub indicators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeedAnalysis {
    #[serde(default, deserialize_with = "lenient")]
    pub risk: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub level: Option<RiskLevel>,
    #[serde(default, deserialize_with = "lenient")]
    pub roast_icon: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub primary_category: Category,
    #[serde(default, deserialize_with = "lenient")]
    pub overall_severity: f64,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub threats: Vec<Threat>,
    #[serde(default, deserialize_with = "lenient")]
    pub fraud: Option<FraudSignal>,
    #[serde(default, deserialize_with = "lenient")]
    pub fake_media: Option<FakeMediaSignal>,
    #[serde(default, deserialize_with = "lenient")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeedAction {
    #[serde(default, rename = "action", deserialize_with = "lenient")]
    pub kind: ActionKind,
    #[serde(default, deserialize_with = "lenient")]
    pub action_icon: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub explanation: String,
    #[serde(default, deserialize_with = "lenient")]
    pub auto_reported: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub report_id: Option<String>,
}

/// Every field decodes on its own; a scan never loses an item to one bad value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeedItem {
    #[serde(default, deserialize_with = "lenient")]
    pub platform: Platform,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub item_type: String,
    #[serde(default, deserialize_with = "lenient")]
    pub user: String,
    #[serde(default, deserialize_with = "lenient")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient")]
    pub media: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub analysis: FeedAnalysis,
    #[serde(default, deserialize_with = "lenient")]
    pub action: FeedAction,
}

impl FeedItem {
    pub fn is_fraud(&self) -> bool {
        self.analysis.fraud.as_ref().map(|f| f.is_fraud).unwrap_or(false)
    }

    pub fn is_fake_media(&self) -> bool {
        self.analysis.fake_media.as_ref().map(|f| f.is_fake).unwrap_or(false)
    }

    pub fn is_escalated(&self) -> bool {
        self.action.kind == ActionKind::ReportToCyberhub
    }
}

// -----------------------------------------------------------------------------
// OnPlatform — anything the platform tabs can filter
// -----------------------------------------------------------------------------

pub trait OnPlatform {
    fn platform(&self) -> Platform;
}

impl OnPlatform for FeedItem {
    fn platform(&self) -> Platform {
        self.platform
    }
}

impl OnPlatform for DecoratedFeedItem {
    fn platform(&self) -> Platform {
        self.item.platform
    }
}

/// Order-preserving subsequence; `All` is the identity.
pub fn filter_by_platform<T: OnPlatform>(items: &[T], filter: PlatformFilter) -> Vec<&T> {
    items.iter().filter(|item| filter.admits(item.platform())).collect()
}

// -----------------------------------------------------------------------------
// DecoratedFeedItem — what a feed card needs
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecoratedFeedItem {
    pub item: FeedItem,
    pub platform_icon: &'static str,
    pub platform_color: &'static str,
    pub badges: Vec<Badge>,
    pub action_style: ActionStyle,
    pub severity_percent: u32,
}

pub fn decorate_item(item: &FeedItem) -> DecoratedFeedItem {
    let mut badges = vec![item.analysis.primary_category.badge()];
    if item.is_fraud() {
        badges.push(FRAUD_BADGE);
    }
    if item.is_fake_media() {
        badges.push(FAKE_BADGE);
    }
    DecoratedFeedItem {
        item: item.clone(),
        platform_icon: item.platform.icon(),
        platform_color: item.platform.color(),
        badges,
        action_style: item.action.kind.style(),
        severity_percent: percent(item.analysis.overall_severity),
    }
}

pub fn apply_presentation_mapping(items: &[FeedItem]) -> Vec<DecoratedFeedItem> {
    items.iter().map(decorate_item).collect()
}

// -----------------------------------------------------------------------------
// Scan summaries
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total: usize,
    pub threats_found: usize,
    pub auto_actions: usize,
}

impl ScanSummary {
    pub fn from_items(items: &[FeedItem]) -> Self {
        ScanSummary {
            total: items.len(),
            threats_found: items.iter().filter(|i| i.analysis.primary_category.is_threat()).count(),
            auto_actions: items.iter().filter(|i| i.action.kind.is_automatic()).count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PlatformStats {
    pub total_scanned: usize,
    pub threats_found: usize,
    pub blocked: usize,
    pub reported: usize,
    pub threat_types: Vec<Category>,
}

pub fn platform_breakdown(items: &[FeedItem]) -> BTreeMap<Platform, PlatformStats> {
    let mut out: BTreeMap<Platform, PlatformStats> = BTreeMap::new();
    for item in items {
        let stats = out.entry(item.platform).or_default();
        stats.total_scanned += 1;
        let category = item.analysis.primary_category;
        if category.is_threat() {
            stats.threats_found += 1;
            if !stats.threat_types.contains(&category) {
                stats.threat_types.push(category);
            }
        }
        match item.action.kind {
            ActionKind::Block => stats.blocked += 1,
            ActionKind::ReportToCyberhub => stats.reported += 1,
            _ => {}
        }
    }
    for stats in out.values_mut() {
        stats.threat_types.sort();
    }
    out
}

// -----------------------------------------------------------------------------
// Escalation — report_to_cyberhub items become provisional reports
// -----------------------------------------------------------------------------

pub fn provisional_report_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("CH-{}", hex[..8].to_uppercase())
}

pub fn escalate(item: &FeedItem) -> Option<Report> {
    if !item.is_escalated() {
        return None;
    }
    let id = item.action.report_id.clone().unwrap_or_else(provisional_report_id);
    Some(Report {
        id,
        timestamp: Utc::now().naive_local().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        platform: item.platform.name().to_string(),
        reported_user: item.user.clone(),
        content_snippet: Some(item.content.chars().take(100).collect()),
        threats: item
            .analysis
            .threats
            .iter()
            .map(|t| ThreatTag { kind: t.kind.clone(), severity: t.severity })
            .collect(),
        overall_severity: item.analysis.overall_severity,
        action_taken: "report_to_cyberhub".to_string(),
        status: "submitted".to_string(),
        status_icon: "📤".to_string(),
    })
}
