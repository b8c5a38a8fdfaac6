// src/filter.rs
//! Tender normalization and the order-sensitive filter chain: status,
//! date thresholds, health-sector exclusion, and the manually selected
//! codes supplied by the operators.

use std::collections::HashSet;

use tracing::info;

use crate::config::RankingConfig;
use crate::normalize::normalize;
use crate::tender::Tender;

/// Health-sector organism fragments, pre-normalized (lowercase, no
/// diacritics). Code constant by design: this list is regulatory, not
/// operator-tunable.
pub const HEALTH_EXCLUDE: &[&str] = &[
    "centro de salud",
    "prehospitalaria",
    "referencia de salud",
    "referencial de salud",
    "oncologico",
    "cesfam",
    "complejo asistencial",
    "consultorio",
    "crs",
    "hospital",
    "instituto de neurocirugia",
    "instituto de salud publica de chile",
    "instituto nacional de geriatria",
    "instituto nacional de rehabilitacion",
    "instituto nacional del cancer",
    "instituto nacional del torax",
    "instituto psiquiatrico",
    "serv nac salud",
    "serv salud",
    "servicio de salud",
    "servicio nacional de salud",
    "servicio salud",
    "instituto de desarrollo agropecuario",
];

/// Numeric `CodigoEstado` meaning an open, published tender.
const STATUS_PUBLISHED: f64 = 5.0;

/// Per-stage drop counters, logged after each run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FilterStats {
    pub input: usize,
    pub status_dropped: usize,
    pub date_dropped: usize,
    pub health_dropped: usize,
    pub selected_dropped: usize,
    pub kept: usize,
}

/// Normalize the text fields that participate in matching. The product
/// code also loses the `.0` float artifact the CSV feed attaches.
pub fn normalize_fields(tender: &mut Tender) {
    tender.name = normalize(&tender.name);
    tender.description = normalize(&tender.description);
    tender.category = normalize(&tender.category);
    tender.organism_name = normalize(&tender.organism_name);
    let product = tender
        .product_code
        .split('.')
        .next()
        .unwrap_or_default()
        .to_string();
    tender.product_code = normalize(&product);
}

fn is_published(status_code: &str) -> bool {
    status_code
        .trim()
        .parse::<f64>()
        .map(|code| code == STATUS_PUBLISHED)
        .unwrap_or(false)
}

fn is_health_organism(normalized_organism: &str) -> bool {
    HEALTH_EXCLUDE
        .iter()
        .any(|fragment| normalized_organism.contains(fragment))
}

/// Normalize every record, then apply the filter chain in order: status,
/// date thresholds (unparsable dates drop the row), health exclusion,
/// selected-code exclusion. Duplicate external codes survive this stage;
/// grouping happens later in ranking.
pub fn normalize_and_filter(
    raw: Vec<Tender>,
    config: &RankingConfig,
    selected_codes: &HashSet<String>,
) -> (Vec<Tender>, FilterStats) {
    let mut stats = FilterStats {
        input: raw.len(),
        ..Default::default()
    };

    let mut kept = Vec::with_capacity(raw.len());
    for mut tender in raw {
        normalize_fields(&mut tender);

        if !is_published(&tender.status_code) {
            stats.status_dropped += 1;
            continue;
        }

        let dates_ok = match (tender.publication_date, tender.closing_date) {
            (Some(publication), Some(closing)) => {
                publication >= config.min_publication_date && closing >= config.min_closing_date
            }
            _ => false,
        };
        if !dates_ok {
            stats.date_dropped += 1;
            continue;
        }

        if is_health_organism(&tender.organism_name) {
            stats.health_dropped += 1;
            continue;
        }

        if selected_codes.contains(&normalize(&tender.external_code)) {
            stats.selected_dropped += 1;
            continue;
        }

        kept.push(tender);
    }

    stats.kept = kept.len();
    info!(
        input = stats.input,
        status = stats.status_dropped,
        dates = stats.date_dropped,
        health = stats.health_dropped,
        selected = stats.selected_dropped,
        kept = stats.kept,
        "tender filter chain applied"
    );
    (kept, stats)
}
