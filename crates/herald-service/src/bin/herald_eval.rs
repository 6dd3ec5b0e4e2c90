use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use herald_core::config::load_config;
use herald_core::item::ScheduledItem;
use herald_service::engine::OccurrenceEngine;
use herald_service::schedule::diagnostic::Diagnostic;
use herald_service::schedule::merge::OccurrenceView;
use herald_service::schedule::retention::RetentionDecision;
use herald_service::schedule::status::ItemStatus;
use herald_service::schedule::tab::StatusTab;
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemReport<'a> {
    #[serde(flatten)]
    status: &'a ItemStatus,
    tab: Option<StatusTab>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    now: DateTime<Utc>,
    timezone: String,
    countdown: Option<&'a OccurrenceView>,
    timeline: &'a [OccurrenceView],
    items: Vec<ItemReport<'a>>,
    diagnostics: &'a [Diagnostic],
    cleanup: Vec<RetentionDecision>,
}

fn parse_args() -> anyhow::Result<(PathBuf, DateTime<Utc>)> {
    let mut args = std::env::args().skip(1);

    let path = args
        .next()
        .map(PathBuf::from)
        .context("usage: herald-eval <items.json> [now-rfc3339]")?;

    let now = match args.next() {
        Some(text) => DateTime::parse_from_rfc3339(&text)
            .with_context(|| format!("invalid reference time {text:?}"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    Ok((path, now))
}

fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    let config = load_config()?;

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping info");
    }

    let engine = OccurrenceEngine::from_config(&config.engine)?;
    let (path, now) = parse_args()?;

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let items: Vec<ScheduledItem> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse items from {}", path.display()))?;

    tracing::info!(items = items.len(), %now, "Evaluating scheduled items");

    let timeline = engine.upcoming_timeline(&items, now);
    let item_reports = items
        .iter()
        .zip(&timeline.statuses)
        .map(|(item, status)| ItemReport {
            status,
            tab: StatusTab::for_item(item, status.status),
        })
        .collect();

    let report = Report {
        now,
        timezone: engine.zone().to_string(),
        countdown: timeline.countdown(now),
        timeline: &timeline.views,
        items: item_reports,
        diagnostics: &timeline.diagnostics,
        cleanup: engine.cleanup_candidates(&items, now),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
