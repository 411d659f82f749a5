// =============================================================================
// CYBERSHIELD CORE — main.rs
// Command dispatch
// =============================================================================

use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tokio::sync::RwLock;

use cybershield_core::api;
use cybershield_core::client::{ManualReport, ShieldClient};
use cybershield_core::config::ShieldConfig;
use cybershield_core::constants;
use cybershield_core::controller::Controller;
use cybershield_core::dashboard::{DashboardRenderer, DashboardView};
use cybershield_core::feed::PlatformFilter;
use cybershield_core::session::{ScanOutcome, Session};
use cybershield_core::ShieldError;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    constants::print_banner();

    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");
    let rest: Vec<&str> = args.iter().skip(2).map(|s| s.as_str()).collect();

    let config = ShieldConfig::from_env();
    log::debug!("service {} (timeout {:?})", config.service_url, config.timeout);
    let client = match ShieldClient::new(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("⚠️  {}", e.user_notice());
            std::process::exit(1);
        }
    };
    log::info!("classifier service at {}", client.base_url());
    let session = Arc::new(RwLock::new(Session::new()));
    let ctl = Controller::new(client, session.clone());

    let outcome = match cmd {
        "analyze"   => run_analyze(&ctl, &rest.join(" ")).await,
        "challenge" => run_challenge(&ctl, &rest.join(" ")).await,
        "report"    => run_report(&ctl, &rest).await,
        "cyberhub"  => run_cyberhub(&ctl, &rest).await,
        "scan"      => run_scan(&ctl, rest.first().copied()).await,
        "reports"   => run_reports(&ctl).await,
        "dash"      => run_dash(&ctl, rest.first().copied()).await,
        "serve"     => run_serve(&ctl, &config).await,
        _           => { print_help(); Ok(()) }
    };

    if let Err(e) = outcome {
        eprintln!("⚠️  {}", e.user_notice());
        std::process::exit(1);
    }
}

fn print_help() {
    println!("CyberShield — commands:");
    println!("  analyze <text>                          classify one text");
    println!("  challenge <text>                        kindness challenge attempt");
    println!("  report <message> [context]              anonymous report");
    println!("  cyberhub <platform> <user> <content> [threat_type]");
    println!("                                          file a Cyber Hub report");
    println!("  scan [all|whatsapp|instagram|twitter]   platform scan");
    println!("  reports                                 list Cyber Hub reports");
    println!("  dash [platform]                         scan + terminal dashboard");
    println!("  serve                                   snapshot API + stdin loop");
}

fn parse_filter(raw: Option<&str>) -> Result<PlatformFilter, ShieldError> {
    raw.unwrap_or("all").parse::<PlatformFilter>().map_err(ShieldError::Semantic)
}

async fn run_analyze(ctl: &Controller, text: &str) -> Result<(), ShieldError> {
    let record = ctl.analyze(text).await?;
    let r = &record.result;
    println!("{} {}  risk {}%  {}", r.roast_icon, r.level_label(), r.risk_percent(), r.mood);
    println!("  {}", r.explanation);
    if let Some(rewrite) = &r.polite_rewrite {
        println!("  ✨ try: {}", rewrite);
    }
    if let Some(note) = &r.mental_health_note {
        println!("  💙 {}", note);
    }
    if let Some(hint) = &r.challenge_hint {
        println!("  🎯 {}", hint);
    }
    if r.suggests_report() {
        println!("  🚩 consider: cybershield report \"<message>\"");
    }
    let kindness = ctl.session().read().await.kindness();
    println!("  kindness {}% over {} samples", kindness.kindness_percent(), kindness.sample_count);
    Ok(())
}

async fn run_challenge(ctl: &Controller, text: &str) -> Result<(), ShieldError> {
    let outcome = ctl.challenge(text).await?;
    let mark = if outcome.passed { "✅" } else { "❌" };
    println!("{} {}", mark, outcome.feedback);
    Ok(())
}

async fn run_report(ctl: &Controller, rest: &[&str]) -> Result<(), ShieldError> {
    let message = rest.first().copied().unwrap_or("");
    let context = rest.get(1).copied().unwrap_or("");
    let ack = ctl.report(message, context).await?;
    println!("{}", ack.message());
    Ok(())
}

async fn run_cyberhub(ctl: &Controller, rest: &[&str]) -> Result<(), ShieldError> {
    let (platform, user, content) = match rest {
        [p, u, c, ..] => (*p, *u, *c),
        _ => return Err(ShieldError::Semantic("usage: cyberhub <platform> <user> <content> [threat_type]".into())),
    };
    let mut report = ManualReport::new(platform, user, content);
    if let Some(kind) = rest.get(3) {
        report.threat_type = kind.to_string();
    }
    let ack = ctl.submit_cyberhub_report(&report).await?;
    println!("🚨 {} — {}", ack.report_id, ack.message);
    print_frame(ctl, PlatformFilter::All, DashboardRenderer::render_reports).await;
    Ok(())
}

async fn run_scan(ctl: &Controller, platform: Option<&str>) -> Result<(), ShieldError> {
    let filter = parse_filter(platform)?;
    if let ScanOutcome::Applied(summary) = ctl.scan(filter).await? {
        println!("📡 {} items, {} threats, {} auto actions",
            summary.total, summary.threats_found, summary.auto_actions);
    }
    print_frame(ctl, filter, DashboardRenderer::render_feed).await;
    Ok(())
}

async fn run_reports(ctl: &Controller) -> Result<(), ShieldError> {
    ctl.load_reports().await?;
    print_frame(ctl, PlatformFilter::All, DashboardRenderer::render_reports).await;
    Ok(())
}

async fn run_dash(ctl: &Controller, platform: Option<&str>) -> Result<(), ShieldError> {
    let filter = parse_filter(platform)?;
    ctl.scan(filter).await?;
    print_frame(ctl, filter, DashboardRenderer::render_full).await;
    Ok(())
}

async fn print_frame(ctl: &Controller, filter: PlatformFilter, render: fn(&DashboardView) -> String) {
    let session = ctl.session();
    let view = DashboardView::capture(&*session.read().await, filter);
    println!("{}", render(&view));
}

async fn run_serve(ctl: &Controller, config: &ShieldConfig) -> Result<(), ShieldError> {
    let session = ctl.session();
    let addr = config.api_addr;
    tokio::spawn(async move {
        if let Err(e) = api::serve(session, addr).await {
            log::warn!("snapshot API stopped: {}", e);
        }
    });

    println!("Type text to analyze.  /scan [platform]  /reports  /dash  /new  /quit");
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut filter = PlatformFilter::All;

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        let mut words = line.split_whitespace();
        let result = match words.next() {
            None => continue,
            Some("/quit") => break,
            Some("/scan") => match parse_filter(words.next()) {
                Ok(f) => {
                    filter = f;
                    run_scan(ctl, Some(f.as_str())).await
                }
                Err(e) => Err(e),
            },
            Some("/reports") => run_reports(ctl).await,
            Some("/dash") => {
                print_frame(ctl, filter, DashboardRenderer::render_full).await;
                Ok(())
            }
            Some("/new") => ctl.session().write().await.renew().map(|id| println!("new session {}", id)),
            Some(_) => run_analyze(ctl, line).await,
        };
        if let Err(e) = result {
            println!("⚠️  {}", e.user_notice());
        }
    }
    Ok(())
}
