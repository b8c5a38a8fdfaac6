// src/config/sheet.rs
//! Workbook-backed [`ConfigProvider`].
//!
//! The operators maintain configuration in fixed cells of the workspace
//! spreadsheet; every absolute address is confined to this module so the
//! rest of the crate only ever sees the typed [`RankingConfig`].

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tracing::{info, warn};

use super::{parse_date_lenient, ConfigProvider, RankingConfig, Weights};
use crate::error::ConfigError;
use crate::normalize::normalize;
use crate::store::SheetStore;

pub const TAB_SETTINGS: &str = "Inicio";
pub const TAB_BLACKLIST: &str = "LNegra Palabras";
pub const TAB_CLIENTS: &str = "Clientes";

/// Three parallel keyword columns on the settings tab.
const KEYWORD_RANGES: &[&str] = &["C27:C32", "F27:F35", "I27:I34"];
/// Rubro label cell and the product-code column beneath it, per slot.
const RUBRO_SLOTS: &[(&str, &str)] = &[("C13", "D14:D23"), ("F13", "G14:G23"), ("I13", "J14:J23")];
const BLACKLIST_RANGE: &str = "B2:B";
const CLIENT_NAMES_RANGE: &str = "D4:D";
const CLIENT_STATUS_RANGE: &str = "E4:E";
const DATES_RANGE: &str = "C6:C7";
/// Percent cells: rubro, palabra, clientes, monto.
const WEIGHT_CELLS: [(&str, &'static str); 4] =
    [("K11", "category"), ("K25", "keyword"), ("K39", "client"), ("K43", "monetary")];

pub struct SheetConfigProvider<'a> {
    store: &'a dyn SheetStore,
}

impl<'a> SheetConfigProvider<'a> {
    pub fn new(store: &'a dyn SheetStore) -> Self {
        Self { store }
    }

    async fn load_keywords(&self) -> Result<HashSet<String>, ConfigError> {
        let mut keywords = HashSet::new();
        for range in KEYWORD_RANGES {
            let rows = self.store.read_range(TAB_SETTINGS, range).await?;
            for cell in rows.into_iter().flatten() {
                let term = normalize(&cell);
                if !term.is_empty() {
                    keywords.insert(term);
                }
            }
        }
        info!(count = keywords.len(), "keywords loaded");
        Ok(keywords)
    }

    async fn load_blacklist(&self) -> Result<HashSet<String>, ConfigError> {
        let rows = self.store.read_range(TAB_BLACKLIST, BLACKLIST_RANGE).await?;
        let blacklist: HashSet<String> = rows
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .map(|cell| normalize(&cell))
            .filter(|term| !term.is_empty())
            .collect();
        info!(count = blacklist.len(), "blacklist loaded");
        Ok(blacklist)
    }

    async fn load_category_products(&self) -> Result<HashMap<String, Vec<String>>, ConfigError> {
        let mut map = HashMap::new();
        for (label_cell, products_range) in RUBRO_SLOTS {
            let label = match self.store.read_cell(TAB_SETTINGS, label_cell).await? {
                Some(v) => normalize(&v),
                None => String::new(),
            };
            if label.is_empty() {
                // A configuration gap, not an error: the slot is unused.
                warn!(cell = label_cell, "rubro slot is empty; skipping");
                continue;
            }
            let products: Vec<String> = self
                .store
                .read_range(TAB_SETTINGS, products_range)
                .await?
                .into_iter()
                .filter_map(|row| row.into_iter().next())
                .map(|cell| normalize(&cell))
                .filter(|p| !p.is_empty())
                .collect();
            map.insert(label, products);
        }
        info!(rubros = map.len(), "rubro/product mapping loaded");
        Ok(map)
    }

    async fn load_client_scores(&self) -> Result<HashMap<String, i64>, ConfigError> {
        let names = self.store.read_range(TAB_CLIENTS, CLIENT_NAMES_RANGE).await?;
        let statuses = self.store.read_range(TAB_CLIENTS, CLIENT_STATUS_RANGE).await?;
        if names.len() != statuses.len() {
            warn!(
                names = names.len(),
                statuses = statuses.len(),
                "client name/status columns differ in length; pairing up to the shorter"
            );
        }

        let mut scores = HashMap::new();
        for (name_row, status_row) in names.into_iter().zip(statuses) {
            let name = normalize(name_row.first().map(String::as_str).unwrap_or_default());
            if name.is_empty() {
                continue;
            }
            let status = normalize(status_row.first().map(String::as_str).unwrap_or_default());
            let score = match status.as_str() {
                "vigente" => 10,
                "no vigente" => 5,
                _ => 0,
            };
            scores.insert(name, score);
        }
        info!(count = scores.len(), "client scores loaded");
        Ok(scores)
    }

    async fn load_weights(&self) -> Result<Weights, ConfigError> {
        let mut parsed = [0f64; 4];
        for (i, (cell, what)) in WEIGHT_CELLS.iter().enumerate() {
            let raw = self.store.read_cell(TAB_SETTINGS, cell).await?.ok_or_else(|| {
                ConfigError::MissingCell {
                    cell: (*cell).to_string(),
                    what: *what,
                }
            })?;
            let trimmed = raw.trim().trim_end_matches('%').trim();
            let value: f64 = trimmed.parse().map_err(|_| ConfigError::BadWeight {
                cell: (*cell).to_string(),
                value: raw.clone(),
            })?;
            parsed[i] = value / 100.0;
        }
        Ok(Weights {
            category: parsed[0],
            keyword: parsed[1],
            client: parsed[2],
            monetary: parsed[3],
        })
    }

    async fn load_min_dates(&self) -> Result<(chrono::NaiveDate, chrono::NaiveDate), ConfigError> {
        let rows = self.store.read_range(TAB_SETTINGS, DATES_RANGE).await?;
        let cell = |idx: usize| -> Result<String, ConfigError> {
            rows.get(idx)
                .and_then(|r| r.first())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| ConfigError::MissingCell {
                    cell: format!("C{}", 6 + idx),
                    what: "minimum date",
                })
        };
        let parse = |idx: usize, raw: String| {
            parse_date_lenient(&raw).ok_or_else(|| ConfigError::BadDate {
                cell: format!("C{}", 6 + idx),
                value: raw,
            })
        };
        let publication = parse(0, cell(0)?)?;
        let closing = parse(1, cell(1)?)?;
        Ok((publication, closing))
    }
}

#[async_trait]
impl ConfigProvider for SheetConfigProvider<'_> {
    async fn load(&self) -> Result<RankingConfig, ConfigError> {
        let keywords = self.load_keywords().await?;
        let blacklist = self.load_blacklist().await?;
        let category_products = self.load_category_products().await?;
        let client_scores = self.load_client_scores().await?;
        let weights = self.load_weights().await?;
        let (min_publication_date, min_closing_date) = self.load_min_dates().await?;

        Ok(RankingConfig {
            keywords,
            blacklist,
            category_products,
            client_scores,
            weights,
            min_publication_date,
            min_closing_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn seed_minimum(store: &MemoryStore) {
        store.seed_cell(TAB_SETTINGS, "C6", "2024-01-01");
        store.seed_cell(TAB_SETTINGS, "C7", "2024-02-01");
        store.seed_cell(TAB_SETTINGS, "K11", "40%");
        store.seed_cell(TAB_SETTINGS, "K25", "30%");
        store.seed_cell(TAB_SETTINGS, "K39", "10%");
        store.seed_cell(TAB_SETTINGS, "K43", "20%");
    }

    #[tokio::test]
    async fn loads_typed_config_from_layout() {
        let store = MemoryStore::new();
        seed_minimum(&store);
        store.seed_cell(TAB_SETTINGS, "C27", "Salud");
        store.seed_cell(TAB_SETTINGS, "F27", "Equipos");
        store.seed_cell(TAB_SETTINGS, "C13", "Alimentos");
        store.seed_cell(TAB_SETTINGS, "D14", "1001");
        store.seed_cell(TAB_SETTINGS, "D15", "1002");
        store.seed_cell(TAB_BLACKLIST, "B2", "Consumo Humano");
        store.seed_cell(TAB_CLIENTS, "D4", "Municipalidad de Maipú");
        store.seed_cell(TAB_CLIENTS, "E4", "Vigente");
        store.seed_cell(TAB_CLIENTS, "D5", "Empresa Antigua");
        store.seed_cell(TAB_CLIENTS, "E5", "No Vigente");

        let cfg = SheetConfigProvider::new(&store).load().await.unwrap();

        assert!(cfg.keywords.contains("salud"));
        assert!(cfg.keywords.contains("equipos"));
        assert!(cfg.blacklist.contains("consumo humano"));
        assert_eq!(
            cfg.category_products.get("alimentos").unwrap(),
            &vec!["1001".to_string(), "1002".to_string()]
        );
        assert_eq!(cfg.client_scores["municipalidad de maipu"], 10);
        assert_eq!(cfg.client_scores["empresa antigua"], 5);
        assert_eq!(cfg.weights.category, 0.40);
        assert_eq!(cfg.weights.monetary, 0.20);
        assert_eq!(
            cfg.min_publication_date,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[tokio::test]
    async fn empty_rubro_slot_is_skipped() {
        let store = MemoryStore::new();
        seed_minimum(&store);
        store.seed_cell(TAB_SETTINGS, "F13", "Servicios");
        store.seed_cell(TAB_SETTINGS, "G14", "2001");

        let cfg = SheetConfigProvider::new(&store).load().await.unwrap();
        assert_eq!(cfg.category_products.len(), 1);
        assert!(cfg.category_products.contains_key("servicios"));
    }

    #[tokio::test]
    async fn client_columns_pair_up_to_the_shorter() {
        let store = MemoryStore::new();
        seed_minimum(&store);
        // three names against two statuses: the unpaired name is dropped
        store.seed_cell(TAB_CLIENTS, "D4", "Municipalidad de Maipú");
        store.seed_cell(TAB_CLIENTS, "D5", "Empresa Antigua");
        store.seed_cell(TAB_CLIENTS, "D6", "Cliente Sin Estado");
        store.seed_cell(TAB_CLIENTS, "E4", "Vigente");
        store.seed_cell(TAB_CLIENTS, "E5", "No Vigente");

        let cfg = SheetConfigProvider::new(&store).load().await.unwrap();

        assert_eq!(cfg.client_scores.len(), 2);
        assert_eq!(cfg.client_scores["municipalidad de maipu"], 10);
        assert_eq!(cfg.client_scores["empresa antigua"], 5);
        assert!(!cfg.client_scores.contains_key("cliente sin estado"));
    }

    #[tokio::test]
    async fn bad_weight_cell_is_fatal() {
        let store = MemoryStore::new();
        seed_minimum(&store);
        store.seed_cell(TAB_SETTINGS, "K25", "treinta");

        let err = SheetConfigProvider::new(&store).load().await.unwrap_err();
        assert!(matches!(err, ConfigError::BadWeight { .. }));
    }

    #[tokio::test]
    async fn missing_date_is_fatal() {
        let store = MemoryStore::new();
        seed_minimum(&store);
        store.seed_cell(TAB_SETTINGS, "C7", "  ");

        let err = SheetConfigProvider::new(&store).load().await.unwrap_err();
        assert!(matches!(err, ConfigError::MissingCell { .. }));
    }
}
