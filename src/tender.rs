// src/tender.rs
//! Pipeline data model: raw tenders as they arrive from the sources and
//! the derived score/rank rows they turn into.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One tender (licitación) as emitted by a source, after column mapping.
///
/// `external_code` is stable across sources but NOT unique at this stage:
/// the open-data feed emits one row per rubro/product association and the
/// same code appears several times. Uniqueness holds only after grouping.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Tender {
    pub external_code: String,
    pub name: String,
    pub description: String,
    pub organism_name: String,
    /// Rubro label(s); space-joined across grouped rows.
    pub category: String,
    /// Product identifier(s); space-joined across grouped rows.
    pub product_code: String,
    /// Short code selecting the monetary-proxy base amount (e.g. "LP").
    pub type_code: String,
    /// Numeric string; unparsable or <= 0 means no monetary score.
    pub contract_duration: String,
    pub status_code: String,
    pub publication_date: Option<NaiveDate>,
    pub closing_date: Option<NaiveDate>,
    /// Pass-through, never interpreted.
    pub link: String,
}

/// The four sub-scores plus their plain sum (the audit score).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Scores {
    pub keyword: f64,
    pub category: f64,
    pub monetary: f64,
    pub client: f64,
}

impl Scores {
    /// Unweighted composite, used only for the non-relative audit table.
    pub fn total(&self) -> f64 {
        self.category + self.keyword + self.monetary + self.client
    }
}

/// A tender with its computed sub-scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTender {
    pub tender: Tender,
    pub scores: Scores,
}

/// A Top-N row after relative rescaling and weighting.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedTender {
    /// 1-based position after sorting by `final_score` descending.
    pub rank: usize,
    pub tender: Tender,
    pub scores: Scores,
    pub relative_category: f64,
    pub relative_keyword: f64,
    pub relative_monetary: f64,
    pub relative_client: f64,
    pub final_score: f64,
}
