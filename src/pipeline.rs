// src/pipeline.rs
//! One batch run: configuration, ingestion, filtering, scoring, ranking,
//! publishing. Linear and single-threaded by design; the scheduler is
//! expected to guarantee one run at a time (concurrent runs would race on
//! the published tabs).

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::sheet::SheetConfigProvider;
use crate::config::ConfigProvider;
use crate::filter::normalize_and_filter;
use crate::publish;
use crate::rank::{apply_relative_weights, group_by_code, select_top_n};
use crate::scoring::score_tender;
use crate::sources::{fetch_all, TenderSource};
use crate::store::SheetStore;
use crate::tender::{ScoredTender, Tender};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub top_n: usize,
    /// External code logged through every stage, for chasing a specific
    /// tender across the pipeline.
    pub tracked_code: Option<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            top_n: crate::rank::TOP_N,
            tracked_code: None,
        }
    }
}

/// What a run did, for the final log line and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub fetched: usize,
    pub kept: usize,
    pub grouped: usize,
    pub ranked: usize,
}

fn trace_tracked(stage: &str, tenders: &[Tender], tracked: Option<&str>) {
    let Some(code) = tracked else { return };
    if tenders.iter().any(|t| t.external_code == code) {
        info!(stage, code, "tracked tender present");
    } else {
        info!(stage, code, "tracked tender absent");
    }
}

/// Execute one full run against the given store and sources.
pub async fn run(
    store: &dyn SheetStore,
    sources: &[Box<dyn TenderSource + '_>],
    options: &RunOptions,
) -> Result<RunSummary> {
    let config = SheetConfigProvider::new(store)
        .load()
        .await
        .context("loading ranking configuration")?;

    let selected = publish::read_selected_codes(store)
        .await
        .context("reading selection list")?;
    info!(count = selected.len(), "selection list loaded");

    let raw = fetch_all(sources).await;
    let fetched = raw.len();
    info!(fetched, "sources merged");
    trace_tracked("after merging sources", &raw, options.tracked_code.as_deref());

    let (filtered, _stats) = normalize_and_filter(raw, &config, &selected);
    trace_tracked("after filter chain", &filtered, options.tracked_code.as_deref());
    if filtered.is_empty() {
        warn!("no tenders survived the filter chain; publishing empty tables");
    }

    publish::publish_active_ledger(store, &filtered)
        .await
        .context("publishing active ledger")?;
    publish::remove_selected_from_ledger(store, &selected)
        .await
        .context("pruning selected codes from ledger")?;

    // Rank from the stored ledger so the published state stays the source
    // of truth for what was scored.
    let ledger = publish::read_active_ledger(store)
        .await
        .context("re-reading active ledger")?;
    let kept = ledger.len();

    let grouped = group_by_code(ledger);
    trace_tracked("after grouping", &grouped, options.tracked_code.as_deref());
    let grouped_count = grouped.len();

    let scored: Vec<ScoredTender> = grouped
        .into_iter()
        .map(|tender| {
            let scores = score_tender(&tender, &config);
            ScoredTender { tender, scores }
        })
        .collect();

    publish::publish_audit(store, &scored)
        .await
        .context("publishing non-relative audit table")?;

    let top_n = select_top_n(scored, options.top_n);
    let ranked = apply_relative_weights(top_n, &config.weights);
    publish::publish_ranking(store, &ranked)
        .await
        .context("publishing final ranking")?;

    let summary = RunSummary {
        fetched,
        kept,
        grouped: grouped_count,
        ranked: ranked.len(),
    };
    info!(?summary, "run complete");
    Ok(summary)
}
