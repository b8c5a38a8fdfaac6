// src/sources/mod.rs
//! Tender sources. Each source is best-effort: a wholesale failure yields
//! an empty contribution and a warning, never a fatal error — the run
//! proceeds with the union of whatever sources succeeded.

pub mod mercado_publico;
pub mod sicep;

use async_trait::async_trait;
use chrono::Datelike;

use crate::config::parse_date_lenient;
use crate::error::SourceError;
use crate::tender::Tender;

#[async_trait]
pub trait TenderSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Tender>, SourceError>;
    fn name(&self) -> &'static str;
}

/// Fetch every source, warning and continuing on failure.
pub async fn fetch_all(sources: &[Box<dyn TenderSource + '_>]) -> Vec<Tender> {
    let mut all = Vec::new();
    for source in sources {
        match source.fetch().await {
            Ok(mut tenders) => {
                tracing::info!(source = source.name(), count = tenders.len(), "source fetched");
                all.append(&mut tenders);
            }
            Err(e) => {
                tracing::warn!(source = source.name(), error = %e, "source failed; continuing without it");
            }
        }
    }
    all
}

/// Current and previous (year, month), with the January rollover.
pub fn feed_periods(today: chrono::NaiveDate) -> [(i32, u32); 2] {
    let current = (today.year(), today.month());
    let previous = if today.month() == 1 {
        (today.year() - 1, 12)
    } else {
        (today.year(), today.month() - 1)
    };
    [current, previous]
}

/// Feed column names (both the open-data CSVs and the SICEP mirror tab
/// use this header vocabulary).
pub mod columns {
    pub const EXTERNAL_CODE: &str = "CodigoExterno";
    pub const NAME: &str = "Nombre";
    pub const STATUS: &str = "CodigoEstado";
    pub const PUBLICATION: &str = "FechaInicio";
    pub const CLOSING: &str = "FechaCierre";
    pub const DESCRIPTION: &str = "Descripcion";
    pub const ORGANISM: &str = "NombreOrganismo";
    pub const CATEGORY: &str = "Rubro3";
    pub const PRODUCT_NAME: &str = "Nombre producto genrico";
    pub const PRODUCT_CODE: &str = "CodigoProductoONU";
    pub const TYPE: &str = "Tipo";
    pub const DURATION: &str = "TiempoDuracionContrato";
    pub const LINK: &str = "Link";
}

/// Map a header-addressed row to a [`Tender`], filling absent columns
/// with empties (missing-expected-column tolerance).
pub(crate) fn tender_from_row(header: &[String], row: &[String]) -> Tender {
    let col = |name: &str| -> String {
        header
            .iter()
            .position(|h| h.trim() == name)
            .and_then(|i| row.get(i))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };

    // Prefer the ONU product code; fall back to the generic product name.
    let mut product = col(columns::PRODUCT_CODE);
    if product.is_empty() {
        product = col(columns::PRODUCT_NAME);
    }

    Tender {
        external_code: col(columns::EXTERNAL_CODE),
        name: col(columns::NAME),
        description: col(columns::DESCRIPTION),
        organism_name: col(columns::ORGANISM),
        category: col(columns::CATEGORY),
        product_code: product,
        type_code: col(columns::TYPE),
        contract_duration: col(columns::DURATION),
        status_code: col(columns::STATUS),
        publication_date: parse_date_lenient(&col(columns::PUBLICATION)),
        closing_date: parse_date_lenient(&col(columns::CLOSING)),
        link: col(columns::LINK),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn periods_roll_over_in_january() {
        let jan = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        assert_eq!(feed_periods(jan), [(2025, 1), (2024, 12)]);

        let jun = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        assert_eq!(feed_periods(jun), [(2025, 6), (2025, 5)]);
    }

    #[test]
    fn row_mapping_tolerates_missing_columns() {
        let header: Vec<String> = vec!["CodigoExterno".into(), "Nombre".into()];
        let row: Vec<String> = vec!["123-45-LP24".into(), "Compra".into()];
        let t = tender_from_row(&header, &row);
        assert_eq!(t.external_code, "123-45-LP24");
        assert_eq!(t.name, "Compra");
        assert_eq!(t.description, "");
        assert_eq!(t.publication_date, None);
    }

    #[test]
    fn row_mapping_prefers_onu_code_over_product_name() {
        let header: Vec<String> = vec![
            "Nombre producto genrico".into(),
            "CodigoProductoONU".into(),
        ];
        let row: Vec<String> = vec!["escritorios".into(), "56101703".into()];
        assert_eq!(tender_from_row(&header, &row).product_code, "56101703");

        let row_no_code: Vec<String> = vec!["escritorios".into(), "".into()];
        assert_eq!(tender_from_row(&header, &row_no_code).product_code, "escritorios");
    }
}
