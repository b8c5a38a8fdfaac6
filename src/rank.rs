// src/rank.rs
//! Deduplication, Top-N selection and the relative weighting that yields
//! the final ranking.
//!
//! The feed emits one row per rubro/product association, so a tender is
//! first collapsed to a single row per external code (group-then-score:
//! multi-valued fields are space-joined, everything else keeps the
//! first-seen value). The Top-N cut is a lexicographic sort on the raw
//! sub-scores; the relative pass then rescales each sub-score column to
//! sum to 100 across the cut and applies the configured weights.

use std::collections::HashMap;

use crate::config::Weights;
use crate::tender::{RankedTender, ScoredTender, Tender};

pub const TOP_N: usize = 100;

/// Collapse rows sharing an external code into one, preserving first-seen
/// order. Category and product fields concatenate (space-joined) so later
/// scoring sees every association; singleton fields keep the first value.
pub fn group_by_code(tenders: Vec<Tender>) -> Vec<Tender> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut grouped: Vec<Tender> = Vec::new();

    for tender in tenders {
        match index.get(&tender.external_code) {
            Some(&i) => {
                let existing = &mut grouped[i];
                join_field(&mut existing.category, &tender.category);
                join_field(&mut existing.product_code, &tender.product_code);
            }
            None => {
                index.insert(tender.external_code.clone(), grouped.len());
                grouped.push(tender);
            }
        }
    }
    grouped
}

fn join_field(target: &mut String, addition: &str) {
    if addition.is_empty() {
        return;
    }
    if target.is_empty() {
        target.push_str(addition);
    } else {
        target.push(' ');
        target.push_str(addition);
    }
}

/// Take the N highest-priority tenders, sorted descending by the tuple
/// (category, keyword, monetary, client). Deliberately NOT by total:
/// a rubro match dominates, then keywords, then the monetary proxy, then
/// client reputation.
pub fn select_top_n(mut scored: Vec<ScoredTender>, n: usize) -> Vec<ScoredTender> {
    scored.sort_by(|a, b| {
        b.scores
            .category
            .total_cmp(&a.scores.category)
            .then(b.scores.keyword.total_cmp(&a.scores.keyword))
            .then(b.scores.monetary.total_cmp(&a.scores.monetary))
            .then(b.scores.client.total_cmp(&a.scores.client))
    });
    scored.truncate(n);
    scored
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Rescale each sub-score within the Top-N so the column sums to 100
/// (all zeros when the column total is zero), weight, and order by the
/// resulting final score. Keyword, monetary and final values carry two
/// decimals in the published rows.
pub fn apply_relative_weights(top_n: Vec<ScoredTender>, weights: &Weights) -> Vec<RankedTender> {
    let total_category: f64 = top_n.iter().map(|t| t.scores.category).sum();
    let total_keyword: f64 = top_n.iter().map(|t| t.scores.keyword).sum();
    let total_monetary: f64 = top_n.iter().map(|t| t.scores.monetary).sum();
    let total_client: f64 = top_n.iter().map(|t| t.scores.client).sum();

    let relative = |value: f64, total: f64| if total > 0.0 { value / total * 100.0 } else { 0.0 };

    let mut ranked: Vec<RankedTender> = top_n
        .into_iter()
        .map(|st| {
            let relative_category = relative(st.scores.category, total_category);
            let relative_keyword = relative(st.scores.keyword, total_keyword);
            let relative_monetary = relative(st.scores.monetary, total_monetary);
            let relative_client = relative(st.scores.client, total_client);
            let final_score = relative_category * weights.category
                + relative_keyword * weights.keyword
                + relative_monetary * weights.monetary
                + relative_client * weights.client;
            RankedTender {
                rank: 0,
                tender: st.tender,
                scores: st.scores,
                relative_category,
                relative_keyword: round2(relative_keyword),
                relative_monetary: round2(relative_monetary),
                relative_client,
                final_score,
            }
        })
        .collect();

    // Order on the unrounded score; rounding is presentation only.
    ranked.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
    for (i, row) in ranked.iter_mut().enumerate() {
        row.rank = i + 1;
        row.final_score = round2(row.final_score);
    }
    ranked
}
