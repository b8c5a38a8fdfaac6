// src/config/mod.rs
//! Typed ranking configuration, loaded once per run.
//!
//! The pipeline depends only on [`RankingConfig`]; where the values come
//! from (the legacy cell-addressed workbook, a fixture in tests) is a
//! [`ConfigProvider`] concern. See [`sheet`] for the workbook layout.

pub mod sheet;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::ConfigError;

/// Criterion weights as fractions (a "30%" cell loads as 0.30).
/// Not required to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub category: f64,
    pub keyword: f64,
    pub client: f64,
    pub monetary: f64,
}

/// Immutable per-run configuration. All text is pre-normalized, so
/// matching against normalized tender fields needs no further folding.
#[derive(Debug, Clone)]
pub struct RankingConfig {
    /// Normalized keyword terms; each match awards +10.
    pub keywords: HashSet<String>,
    /// Normalized blacklist phrases; any substring hit forces the keyword
    /// score to the fixed -10 penalty.
    pub blacklist: HashSet<String>,
    /// Normalized rubro label -> normalized product identifiers.
    pub category_products: HashMap<String, Vec<String>>,
    /// Normalized organism name -> reputation score (vigente 10 / no vigente 5).
    pub client_scores: HashMap<String, i64>,
    pub weights: Weights,
    pub min_publication_date: NaiveDate,
    pub min_closing_date: NaiveDate,
}

#[async_trait]
pub trait ConfigProvider: Send + Sync {
    async fn load(&self) -> Result<RankingConfig, ConfigError>;
}

/// Lenient date parsing for sheet cells and CSV fields; `None` on any
/// format we do not recognize (callers drop such rows downstream).
pub fn parse_date_lenient(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    const FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%d-%m-%Y",
        "%d/%m/%Y",
        "%Y/%m/%d",
    ];
    for fmt in FORMATS {
        if fmt.contains('H') {
            if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt.date());
            }
        } else if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}
