// =============================================================================
// CYBERSHIELD CORE — dashboard.rs
// Terminal dashboard over a session snapshot
//
// Panels:
//   KindnessPanel  — empathy / respect / risk averages + kindness index
//   ActivityPanel  — last ten analyses, level histogram, session counters
//   FeedPanel      — decorated platform feed of the latest scan
//   HubPanel       — Cyber Hub reports by priority
// =============================================================================

use std::collections::BTreeMap;

use crate::activity::ActivitySnapshot;
use crate::classification::RiskLevel;
use crate::constants::{DISPLAY_TRUNCATE_CHARS, PRODUCT_NAME, VERSION};
use crate::cyberhub::{DecoratedReport, Priority, ReportsDigest};
use crate::feed::{DecoratedFeedItem, Platform, PlatformFilter, PlatformStats, ScanSummary};
use crate::kindness::KindnessAggregate;
use crate::session::Session;

pub const DASH_WIDTH: usize = 78;
pub const BAR_WIDTH: usize  = 20;

// -----------------------------------------------------------------------------
// ANSI colors
// -----------------------------------------------------------------------------

pub struct Color;
impl Color {
    pub const RED:     &'static str = "\x1b[31m";
    pub const GREEN:   &'static str = "\x1b[32m";
    pub const YELLOW:  &'static str = "\x1b[33m";
    pub const BLUE:    &'static str = "\x1b[34m";
    pub const MAGENTA: &'static str = "\x1b[35m";
    pub const CYAN:    &'static str = "\x1b[36m";
    pub const WHITE:   &'static str = "\x1b[37m";
    pub const BOLD:    &'static str = "\x1b[1m";
    pub const DIM:     &'static str = "\x1b[2m";
    pub const RESET:   &'static str = "\x1b[0m";
}

pub fn level_color(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Safe       => Color::CYAN,
        RiskLevel::Sarcastic  => Color::YELLOW,
        RiskLevel::Risky      => Color::YELLOW,
        RiskLevel::Toxic      => Color::RED,
        RiskLevel::UltraToxic => Color::MAGENTA,
    }
}

pub fn priority_color(priority: Priority) -> &'static str {
    match priority {
        Priority::Critical => Color::RED,
        Priority::High     => Color::YELLOW,
        Priority::Medium   => Color::WHITE,
    }
}

// -----------------------------------------------------------------------------
// Drawing helpers
// -----------------------------------------------------------------------------

pub fn bar(value: f64, max: f64, width: usize, color: &str) -> String {
    let ratio = if value.is_nan() { 0.0 } else { value / max.max(0.001) };
    let filled = ((ratio.max(0.0)) * width as f64) as usize;
    let filled = filled.min(width);
    let empty  = width - filled;
    format!("{}{}{}{}{}",
        color,
        "█".repeat(filled),
        Color::DIM,
        "░".repeat(empty),
        Color::RESET)
}

pub fn hline(width: usize) -> String {
    format!("{}{}{}",
        Color::DIM, "─".repeat(width), Color::RESET)
}

pub fn panel_header(title: &str, color: &str) -> String {
    format!("{}┌─ {}{}{} {}{}",
        Color::DIM, color, Color::BOLD, title, Color::RESET,
        format!("{}{}{}", Color::DIM,
            "─".repeat(DASH_WIDTH.saturating_sub(title.chars().count() + 5)),
            Color::RESET))
}

/// First `limit` characters plus "…" when anything was cut.
pub fn truncate_for_display(text: &str, limit: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(limit).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

// -----------------------------------------------------------------------------
// DashboardView — everything one frame needs, captured under one read lock
// -----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub session_id: String,
    pub filter: PlatformFilter,
    pub kindness: KindnessAggregate,
    pub activity: ActivitySnapshot,
    pub scan: ScanSummary,
    pub breakdown: BTreeMap<Platform, PlatformStats>,
    pub feed: Vec<DecoratedFeedItem>,
    pub digest: ReportsDigest,
    pub reports: Vec<DecoratedReport>,
}

impl DashboardView {
    pub fn capture(session: &Session, filter: PlatformFilter) -> Self {
        DashboardView {
            session_id: session.id().to_string(),
            filter,
            kindness: session.kindness(),
            activity: session.activity_snapshot(),
            scan: session.scan_summary(),
            breakdown: session.platform_breakdown(),
            feed: session.feed(filter),
            digest: session.reports_digest(),
            reports: session.reports(),
        }
    }
}

// -----------------------------------------------------------------------------
// DashboardRenderer
// -----------------------------------------------------------------------------

pub struct DashboardRenderer;

impl DashboardRenderer {

    pub fn render_header(view: &DashboardView) -> String {
        let short_id: String = view.session_id.chars().take(8).collect();
        format!(
            "{bold}{blue}╔{line}╗{reset}\n\
            {blue}║{reset}  {bold}{white}🛡️  {name} v{version}{reset}  \
            {dim}session {id}  filter={filter}{reset}\n\
            {blue}╚{line}╝{reset}",
            bold=Color::BOLD, blue=Color::BLUE, reset=Color::RESET,
            white=Color::WHITE, dim=Color::DIM,
            line="═".repeat(DASH_WIDTH-2),
            name=PRODUCT_NAME.to_uppercase(), version=VERSION,
            id=short_id, filter=view.filter,
        )
    }

    pub fn render_kindness(view: &DashboardView) -> String {
        let k = &view.kindness;
        let mut out = format!("{}\n", panel_header("KINDNESS", Color::GREEN));
        if k.is_empty() {
            out += &format!("  {}no samples yet{}\n", Color::DIM, Color::RESET);
            return out;
        }
        let rows = [
            ("Empathy", k.empathy_avg, Color::GREEN),
            ("Respect", k.respect_avg, Color::CYAN),
            ("Risk",    k.risk_avg,    Color::RED),
        ];
        for (label, value, color) in rows {
            out += &format!("  {:8} {} {:>5.1}%\n",
                label, bar(value, 1.0, BAR_WIDTH, color), value * 100.0);
        }
        let index_color = if k.kindness_index() >= 0.6 { Color::GREEN }
            else if k.kindness_index() >= 0.4 { Color::YELLOW } else { Color::RED };
        out += &format!("  Index    {}{}{:>3}%{}  {}over {} samples{}\n",
            index_color, Color::BOLD, k.kindness_percent(), Color::RESET,
            Color::DIM, k.sample_count, Color::RESET);
        out
    }

    pub fn render_activity(view: &DashboardView) -> String {
        let a = &view.activity;
        let mut out = format!("{}\n", panel_header("ACTIVITY", Color::CYAN));
        out += &format!("  scanned {}{}{}   threats {}{}{}\n",
            Color::BOLD, a.total_scanned, Color::RESET,
            if a.threat_count > 0 { Color::RED } else { Color::GREEN }, a.threat_count, Color::RESET);

        let histogram: Vec<String> = RiskLevel::ALL
            .iter()
            .map(|lvl| format!("{}{} {}{}", level_color(*lvl), lvl.label(),
                a.counts_by_level.get(lvl).copied().unwrap_or(0), Color::RESET))
            .collect();
        out += &format!("  {}\n", histogram.join("  "));
        out += &format!("  {}\n", hline(DASH_WIDTH - 2));

        for r in &a.records {
            out += &format!("  {dim}#{:<3}{reset} {} {}{:11}{} {:>3}%  {}\n",
                r.sequence, r.result.roast_icon,
                level_color(r.result.level), r.result.level.label(), Color::RESET,
                r.result.risk_percent(),
                truncate_for_display(&r.source_text, DISPLAY_TRUNCATE_CHARS),
                dim=Color::DIM, reset=Color::RESET);
        }
        out
    }

    pub fn render_feed(view: &DashboardView) -> String {
        let mut out = format!("{}\n", panel_header("PLATFORM FEED", Color::MAGENTA));
        out += &format!("  items {}  threats {}{}{}  auto actions {}\n",
            view.scan.total, Color::RED, view.scan.threats_found, Color::RESET, view.scan.auto_actions);
        // known platforms always get a row; anything else only once it shows up
        let extra: Vec<Platform> = view.breakdown.keys().filter(|p| !Platform::KNOWN.contains(*p)).copied().collect();
        for platform in Platform::KNOWN.into_iter().chain(extra) {
            if !view.filter.admits(platform) {
                continue;
            }
            let stats = view.breakdown.get(&platform).cloned().unwrap_or_default();
            out += &format!("  {} {:10} {dim}scanned {:>2}  threats {:>2}  blocked {:>2}  reported {:>2}{reset}\n",
                platform.icon(), platform.name(),
                stats.total_scanned, stats.threats_found, stats.blocked, stats.reported,
                dim=Color::DIM, reset=Color::RESET);
        }
        out += &format!("  {}\n", hline(DASH_WIDTH - 2));
        for d in &view.feed {
            let badges: Vec<String> = d.badges.iter().map(|b| format!("{} {}", b.icon, b.label)).collect();
            out += &format!("  {} {}{:16}{} {:>3}%  {} {:18}  {}\n",
                d.platform_icon, Color::BOLD, truncate_for_display(&d.item.user, 16), Color::RESET,
                d.severity_percent, d.action_style.icon, d.action_style.label, badges.join(" "));
            out += &format!("     {}{}{}\n", Color::DIM,
                truncate_for_display(&d.item.content, DISPLAY_TRUNCATE_CHARS), Color::RESET);
        }
        out
    }

    pub fn render_reports(view: &DashboardView) -> String {
        let d = &view.digest;
        let mut out = format!("{}\n", panel_header("CYBER HUB", Color::RED));
        out += &format!("  total {}  {}critical {}{}  {}high {}{}  medium {}\n",
            d.total, Color::RED, d.critical, Color::RESET,
            Color::YELLOW, d.high, Color::RESET, d.medium);
        for r in &view.reports {
            out += &format!("  {} {}{:8}{} {} {:12} {} {:>5.1}% {}\n",
                r.priority_icon, priority_color(r.priority), r.priority_label, Color::RESET,
                r.platform_icon, truncate_for_display(&r.report.reported_user, 12),
                bar(r.severity_bar, 100.0, 10, priority_color(r.priority)), r.severity_bar,
                r.report.id);
            out += &format!("     {}{}  {}  {}{}\n", Color::DIM,
                r.display_timestamp, r.action_label, r.threat_tags.join(", "), Color::RESET);
        }
        out
    }

    pub fn render_full(view: &DashboardView) -> String {
        let mut out = String::new();
        out += &Self::render_header(view);
        out += "\n";
        out += &Self::render_kindness(view);
        out += "\n";
        out += &Self::render_activity(view);
        out += "\n";
        out += &Self::render_feed(view);
        out += "\n";
        out += &Self::render_reports(view);
        out
    }
}
