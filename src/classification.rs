// =============================================================================
// CYBERSHIELD CORE — classification.rs
// ClassificationResult — the unit every other component consumes
// =============================================================================
//
// Produced by the external classifier per analyzed text. The wire shape is
// fixed by the service (snake_case JSON). The level is taken as given: this
// layer never re-derives it from risk, it only maps it to presentation.
//
//   Safe → Sarcastic → Risky → Toxic → Ultra Toxic
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::constants::REPORT_SUGGESTION_RISK;

/// Clamp a score to [0,1]; NaN counts as 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Whole percent of a unit score, as the dashboards print it.
pub fn percent(value: f64) -> u32 {
    (clamp_unit(value) * 100.0).round() as u32
}

// -----------------------------------------------------------------------------
// RiskLevel — 5-level roast meter
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Safe,
    Sarcastic,
    Risky,
    Toxic,
    #[serde(rename = "Ultra Toxic", alias = "UltraToxic")]
    UltraToxic,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 5] = [
        RiskLevel::Safe,
        RiskLevel::Sarcastic,
        RiskLevel::Risky,
        RiskLevel::Toxic,
        RiskLevel::UltraToxic,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Safe       => "Safe",
            RiskLevel::Sarcastic  => "Sarcastic",
            RiskLevel::Risky      => "Risky",
            RiskLevel::Toxic      => "Toxic",
            RiskLevel::UltraToxic => "Ultra Toxic",
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            RiskLevel::Safe       => "badge-safe",
            RiskLevel::Sarcastic  => "badge-sarcastic",
            RiskLevel::Risky      => "badge-risky",
            RiskLevel::Toxic      => "badge-toxic",
            RiskLevel::UltraToxic => "badge-ultra",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Safe       => "#00F5D4",
            RiskLevel::Sarcastic  => "#facc15",
            RiskLevel::Risky      => "#f97316",
            RiskLevel::Toxic      => "#ef4444",
            RiskLevel::UltraToxic => "#9333ea",
        }
    }

    /// Toxic and above count as threats.
    pub fn is_threat(&self) -> bool {
        matches!(self, RiskLevel::Toxic | RiskLevel::UltraToxic)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// -----------------------------------------------------------------------------
// ClassificationResult
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub risk: f64,
    pub level: RiskLevel,
    #[serde(default)]
    pub sarcasm_score: f64,
    #[serde(default)]
    pub toxicity_score: f64,
    #[serde(default)]
    pub empathy_score: f64,
    #[serde(default)]
    pub respect_score: f64,
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub polite_rewrite: Option<String>,
    #[serde(default, rename = "mental_health")]
    pub mental_health_note: Option<String>,
    #[serde(default)]
    pub roast_icon: String,
    #[serde(default)]
    pub meme: Option<String>,
    #[serde(default)]
    pub challenge_hint: Option<String>,
}

impl ClassificationResult {
    pub fn is_threat(&self) -> bool {
        self.level.is_threat()
    }

    /// The manual report control is offered from moderate risk upward.
    pub fn suggests_report(&self) -> bool {
        clamp_unit(self.risk) >= REPORT_SUGGESTION_RISK
    }

    pub fn risk_percent(&self) -> u32 {
        percent(self.risk)
    }

    /// "🔴 Toxic" style label used by the gauge and the activity table.
    pub fn level_label(&self) -> String {
        if self.roast_icon.is_empty() {
            self.level.label().to_string()
        } else {
            format!("{} {}", self.roast_icon, self.level.label())
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_service_payload() {
        let raw = r#"{
            "risk": 0.91, "level": "Ultra Toxic", "roast_icon": "💀",
            "sarcasm_score": 0.6, "toxicity_score": 0.95,
            "explanation": "Maximum toxicity detected.", "mood": "💀",
            "meme": "Touch grass", "empathy_score": 0.02, "respect_score": 0.24,
            "mental_health": "Hey, are you okay?", "polite_rewrite": null,
            "challenge_hint": "Think first."
        }"#;
        let r: ClassificationResult = serde_json::from_str(raw).unwrap();
        assert_eq!(r.level, RiskLevel::UltraToxic);
        assert_eq!(r.mental_health_note.as_deref(), Some("Hey, are you okay?"));
        assert!(r.polite_rewrite.is_none());
        assert!(r.is_threat());
        assert_eq!(r.level_label(), "💀 Ultra Toxic");
    }

    #[test]
    fn test_level_alias_accepted() {
        let level: RiskLevel = serde_json::from_str("\"UltraToxic\"").unwrap();
        assert_eq!(level, RiskLevel::UltraToxic);
        assert_eq!(serde_json::to_string(&level).unwrap(), "\"Ultra Toxic\"");
    }

    #[test]
    fn test_unknown_level_rejected() {
        let raw = r#"{"risk": 0.1, "level": "Spicy"}"#;
        assert!(serde_json::from_str::<ClassificationResult>(raw).is_err());
    }

    #[test]
    fn test_threat_levels() {
        let threats: Vec<_> = RiskLevel::ALL.iter().filter(|l| l.is_threat()).collect();
        assert_eq!(threats, vec![&RiskLevel::Toxic, &RiskLevel::UltraToxic]);
    }

    #[test]
    fn test_level_presentation() {
        assert_eq!(RiskLevel::Safe.color(), "#00F5D4");
        assert_eq!(RiskLevel::UltraToxic.badge_class(), "badge-ultra");
        assert_eq!(RiskLevel::Risky.to_string(), "Risky");
    }

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(1.4), 1.0);
        assert_eq!(clamp_unit(-0.2), 0.0);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
        assert_eq!(percent(0.456), 46);
    }

    #[test]
    fn test_report_suggestion() {
        assert!(fixtures::result(RiskLevel::Risky, 0.4, 0.5, 0.5).suggests_report());
        assert!(!fixtures::result(RiskLevel::Sarcastic, 0.39, 0.5, 0.5).suggests_report());
    }
}
