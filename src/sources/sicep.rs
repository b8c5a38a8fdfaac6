// src/sources/sicep.rs
//! SICEP portal listings, read from the workbook tab the (external)
//! portal scraper mirrors them into. The portal only lists currently open
//! tenders, so rows without a status column default to "published".

use async_trait::async_trait;
use tracing::warn;

use super::{columns, tender_from_row, TenderSource};
use crate::error::SourceError;
use crate::store::SheetStore;
use crate::tender::Tender;

const SOURCE_NAME: &str = "sicep";
const FULL_RANGE: &str = "A1:Z";
const PUBLISHED_STATUS: &str = "5";

pub struct SicepSheetSource<'a> {
    store: &'a dyn SheetStore,
    tab: String,
}

impl<'a> SicepSheetSource<'a> {
    pub fn new(store: &'a dyn SheetStore, tab: impl Into<String>) -> Self {
        Self {
            store,
            tab: tab.into(),
        }
    }
}

#[async_trait]
impl TenderSource for SicepSheetSource<'_> {
    async fn fetch(&self) -> Result<Vec<Tender>, SourceError> {
        let rows = self
            .store
            .read_range(&self.tab, FULL_RANGE)
            .await
            .map_err(|e| SourceError::new(SOURCE_NAME, e.to_string()))?;

        let mut iter = rows.into_iter();
        let header = match iter.next() {
            Some(h) => h,
            None => {
                warn!(tab = %self.tab, "sicep mirror tab is empty");
                return Ok(Vec::new());
            }
        };

        let has_status = header.iter().any(|h| h.trim() == columns::STATUS);
        let tenders = iter
            .map(|row| {
                let mut t = tender_from_row(&header, &row);
                if !has_status || t.status_code.is_empty() {
                    t.status_code = PUBLISHED_STATUS.to_string();
                }
                t
            })
            .filter(|t| !t.external_code.is_empty())
            .collect();
        Ok(tenders)
    }

    fn name(&self) -> &'static str {
        SOURCE_NAME
    }
}
