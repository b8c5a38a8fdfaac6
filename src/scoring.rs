// src/scoring.rs
//! The four relevance criteria, each a pure function over normalized
//! tender fields, plus the unweighted composite.
//!
//! Point values mirror the operators' spreadsheet model: +10 per keyword,
//! +5 per rubro hit, +10 per product hit, type-table/duration for the
//! monetary proxy, and a direct map lookup for client reputation.

use std::collections::{HashMap, HashSet};

use crate::config::RankingConfig;
use crate::normalize::{normalize, word_tokens};
use crate::tender::{Scores, Tender};

/// Fixed penalty applied when a blacklist phrase occurs in the tender text.
pub const BLACKLIST_PENALTY: f64 = -10.0;
const KEYWORD_POINTS: f64 = 10.0;
const CATEGORY_POINTS: f64 = 5.0;
const PRODUCT_POINTS: f64 = 10.0;

/// Monetary-proxy base amount per tender type code. Unknown codes score 0.
fn base_amount(type_code: &str) -> f64 {
    match type_code.trim().to_uppercase().as_str() {
        "L1" | "LS" | "E2" => 0.0,
        "LE" | "CO" => 100.0,
        "LP" | "B2" => 1000.0,
        "LQ" | "H2" => 2000.0,
        "LR" | "I2" => 5000.0,
        _ => 0.0,
    }
}

/// Keyword score over the concatenated name + description.
///
/// Policy: a blacklist phrase found as a substring short-circuits to the
/// fixed -10 penalty; otherwise each distinct keyword present in the word
/// tokens adds +10, uncapped.
pub fn score_keyword(
    name: &str,
    description: &str,
    keywords: &HashSet<String>,
    blacklist: &HashSet<String>,
) -> f64 {
    let text = normalize(&format!("{name} {description}"));

    if blacklist.iter().any(|phrase| text.contains(phrase.as_str())) {
        return BLACKLIST_PENALTY;
    }

    let tokens: HashSet<String> = word_tokens(&text).into_iter().collect();
    let matched = keywords.intersection(&tokens).count();
    matched as f64 * KEYWORD_POINTS
}

/// Rubro/product score: +5 per configured rubro label contained in the
/// category text, +10 per configured product identifier (from any rubro)
/// contained in the product text. Matches are collected into sets first so
/// the same rubro or product never counts twice.
pub fn score_category(
    category_text: &str,
    product_text: &str,
    category_products: &HashMap<String, Vec<String>>,
) -> f64 {
    let category_text = normalize(category_text);
    let product_text = normalize(product_text);

    let mut rubros_hit: HashSet<&str> = HashSet::new();
    let mut products_hit: HashSet<&str> = HashSet::new();

    for (rubro, products) in category_products {
        if !rubro.is_empty() && category_text.contains(rubro.as_str()) {
            rubros_hit.insert(rubro);
        }
        for product in products {
            if !product.is_empty() && product_text.contains(product.as_str()) {
                products_hit.insert(product);
            }
        }
    }

    rubros_hit.len() as f64 * CATEGORY_POINTS + products_hit.len() as f64 * PRODUCT_POINTS
}

/// Monetary proxy: base amount for the type code divided by the contract
/// duration. Unparsable or non-positive durations score 0.
pub fn score_monetary(type_code: &str, contract_duration: &str) -> f64 {
    let base = base_amount(type_code);
    match contract_duration.trim().parse::<f64>() {
        Ok(duration) if duration > 0.0 => base / duration,
        _ => 0.0,
    }
}

/// Client reputation: direct lookup of the normalized organism name.
pub fn score_client(organism_name: &str, client_scores: &HashMap<String, i64>) -> f64 {
    if organism_name.trim().is_empty() {
        return 0.0;
    }
    client_scores
        .get(&normalize(organism_name))
        .copied()
        .unwrap_or(0) as f64
}

/// Compute all four sub-scores for a tender against the run configuration.
pub fn score_tender(tender: &Tender, config: &RankingConfig) -> Scores {
    Scores {
        keyword: score_keyword(
            &tender.name,
            &tender.description,
            &config.keywords,
            &config.blacklist,
        ),
        category: score_category(
            &tender.category,
            &tender.product_code,
            &config.category_products,
        ),
        monetary: score_monetary(&tender.type_code, &tender.contract_duration),
        client: score_client(&tender.organism_name, &config.client_scores),
    }
}
