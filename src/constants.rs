//! Shared constants for CyberShield Core
//!
//! Names, service endpoints, thresholds and fallback values used across
//! the aggregation, mapping and presentation layers.

/// Product name shown in banners and the status endpoint
pub const PRODUCT_NAME: &str = "CyberShield";

/// Crate version reported by the snapshot API
pub const VERSION: &str = "0.1.0-alpha";

/// Project tagline
pub const TAGLINE: &str = "Moderation telemetry, rolling kindness, Cyber Hub escalation";

// ═══════════════════════════════════════════════════════════════
// Classifier service
// ═══════════════════════════════════════════════════════════════

/// Default base URL of the classifier service
pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default bind address of the read-only snapshot API
pub const DEFAULT_API_ADDR: &str = "127.0.0.1:8088";

pub const ANALYZE_PATH: &str = "/analyze";
pub const CHALLENGE_PATH: &str = "/challenge";
pub const REPORT_PATH: &str = "/report";
pub const SCAN_PATH: &str = "/api/platform/scan";
pub const CYBERHUB_REPORTS_PATH: &str = "/api/cyberhub/reports";
pub const CYBERHUB_REPORT_PATH: &str = "/api/cyberhub/report";

// ═══════════════════════════════════════════════════════════════
// Aggregation
// ═══════════════════════════════════════════════════════════════

/// Number of records kept by the activity ledger
pub const LEDGER_CAPACITY: usize = 10;

/// Risk from which the manual report control is offered
pub const REPORT_SUGGESTION_RISK: f64 = 0.4;

/// Overall severity at or above which a report is critical
pub const CRITICAL_SEVERITY: f64 = 0.8;

/// Overall severity at or above which a report is high priority
pub const HIGH_SEVERITY: f64 = 0.5;

// ═══════════════════════════════════════════════════════════════
// Presentation fallbacks
// ═══════════════════════════════════════════════════════════════

/// Characters of source text shown before the ellipsis
pub const DISPLAY_TRUNCATE_CHARS: usize = 40;

/// Icon used for platforms the dashboard does not know
pub const UNKNOWN_PLATFORM_ICON: &str = "🌐";

/// Default acknowledgement when the report endpoint returns no text
pub const DEFAULT_REPORT_ACK: &str = "Report submitted! 🛡️";

/// Notice shown for transport and malformed-response failures
pub const CONNECTIVITY_NOTICE: &str = "Could not reach the server. Is the classifier service running?";

// ═══════════════════════════════════════════════════════════════
// Display functions
// ═══════════════════════════════════════════════════════════════

/// Print the main CyberShield banner
pub fn print_banner() {
    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║                  CYBERSHIELD CORE                          ║");
    println!("║                                                            ║");
    println!("║  Activity • Kindness • Platform Feed • Cyber Hub           ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();
    println!("  {} v{}", PRODUCT_NAME, VERSION);
    println!("  {}", TAGLINE);
    println!();
}
