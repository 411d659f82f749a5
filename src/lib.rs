// =============================================================================
// CYBERSHIELD CORE — lib.rs
// Client-side aggregation layer of the CyberShield moderation dashboard
// =============================================================================
//
//   classification  — RiskLevel, ClassificationResult
//   kindness        — RollingAggregator (empathy / respect / risk averages)
//   activity        — ActivityLedger (last ten analyses + session counters)
//   feed            — platform scan items, filters, presentation mapping
//   cyberhub        — escalated reports, priority tiers
//   session         — the owned state object, in-flight guard, scan generations
//   client          — HTTP client for the classifier / Cyber Hub service
//   controller      — intents → calls → session updates → hooks
//   api             — read-only snapshot API
//   dashboard       — ANSI terminal renderer
// =============================================================================

pub mod activity;
pub mod api;
pub mod classification;
pub mod client;
pub mod config;
pub mod constants;
pub mod controller;
pub mod cyberhub;
pub mod dashboard;
pub mod error;
pub mod feed;
pub mod kindness;
pub mod session;

#[cfg(test)]
mod mock;

pub use error::{ShieldError, ShieldResult};
