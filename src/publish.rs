// src/publish.rs
//! Writers for the workspace tabs: the active-tender ledger, the
//! non-relative audit table, and the final ranked table. Also the
//! selection-list handling that removes manually handled tenders from
//! the ledger.

use std::collections::HashSet;

use tracing::info;

use crate::error::StoreError;
use crate::normalize::normalize;
use crate::sources::tender_from_row;
use crate::store::{replace_rows, SheetStore};
use crate::tender::{RankedTender, ScoredTender, Tender};

/// Workspace tab names.
pub mod tabs {
    pub const RANKING: &str = "Ranking";
    pub const RANKING_AUDIT: &str = "Ranking no relativo";
    pub const SELECTION: &str = "Selección";
    pub const ACTIVE_LEDGER: &str = "Licitaciones MP";
    pub const SICEP_MIRROR: &str = "Licitaciones Sicep";
}

/// Heading cell preserved across ranking replaces.
const RANKING_TITLE_CELL: &str = "A1";
/// Ranking payload starts below the preserved heading.
const RANKING_START_CELL: &str = "A3";
const SELECTION_RANGE: &str = "A4:A";

const LEDGER_HEADER: &[&str] = &[
    "CodigoExterno",
    "Nombre",
    "CodigoEstado",
    "FechaInicio",
    "FechaCierre",
    "Descripcion",
    "NombreOrganismo",
    "Rubro3",
    "CodigoProductoONU",
    "Tipo",
    "TiempoDuracionContrato",
    "Link",
];

fn fmt_date(d: Option<chrono::NaiveDate>) -> String {
    d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

/// Compact numeric formatting: whole numbers without a decimal point,
/// everything else as-is (presentation columns are pre-rounded).
fn fmt_score(x: f64) -> String {
    if x.fract() == 0.0 {
        format!("{}", x as i64)
    } else {
        x.to_string()
    }
}

fn ledger_row(t: &Tender) -> Vec<String> {
    vec![
        t.external_code.clone(),
        t.name.clone(),
        t.status_code.clone(),
        fmt_date(t.publication_date),
        fmt_date(t.closing_date),
        t.description.clone(),
        t.organism_name.clone(),
        t.category.clone(),
        t.product_code.clone(),
        t.type_code.clone(),
        t.contract_duration.clone(),
        t.link.clone(),
    ]
}

/// Replace the active-tender ledger with the given tenders.
pub async fn publish_active_ledger(
    store: &dyn SheetStore,
    tenders: &[Tender],
) -> Result<(), StoreError> {
    let mut rows = Vec::with_capacity(tenders.len() + 1);
    rows.push(LEDGER_HEADER.iter().map(|s| s.to_string()).collect());
    rows.extend(tenders.iter().map(ledger_row));
    replace_rows(store, tabs::ACTIVE_LEDGER, "A1", rows, None).await?;
    info!(count = tenders.len(), "active ledger published");
    Ok(())
}

/// Re-read the active ledger into tenders (the selection removal edits
/// the ledger in place, so ranking works from the stored state).
pub async fn read_active_ledger(store: &dyn SheetStore) -> Result<Vec<Tender>, StoreError> {
    let rows = store.read_range(tabs::ACTIVE_LEDGER, "A1:Z").await?;
    let mut iter = rows.into_iter();
    let header = match iter.next() {
        Some(h) => h,
        None => return Ok(Vec::new()),
    };
    Ok(iter
        .map(|row| tender_from_row(&header, &row))
        .filter(|t| !t.external_code.is_empty())
        .collect())
}

/// Codes the operators marked as handled; normalized for matching.
pub async fn read_selected_codes(store: &dyn SheetStore) -> Result<HashSet<String>, StoreError> {
    let rows = store.read_range(tabs::SELECTION, SELECTION_RANGE).await?;
    Ok(rows
        .into_iter()
        .filter_map(|row| row.into_iter().next())
        .map(|code| normalize(&code))
        .filter(|code| !code.is_empty())
        .collect())
}

/// Drop selected codes from the stored ledger. Returns how many rows
/// were removed; the ledger is only rewritten when something matched.
pub async fn remove_selected_from_ledger(
    store: &dyn SheetStore,
    selected: &HashSet<String>,
) -> Result<usize, StoreError> {
    if selected.is_empty() {
        return Ok(0);
    }
    let tenders = read_active_ledger(store).await?;
    let before = tenders.len();
    let remaining: Vec<Tender> = tenders
        .into_iter()
        .filter(|t| !selected.contains(&normalize(&t.external_code)))
        .collect();
    let removed = before - remaining.len();
    if removed > 0 {
        publish_active_ledger(store, &remaining).await?;
        info!(removed, remaining = remaining.len(), "selected tenders removed from ledger");
    }
    Ok(removed)
}

/// Non-relative audit table: the raw sub-scores and their plain sum.
pub async fn publish_audit(
    store: &dyn SheetStore,
    scored: &[ScoredTender],
) -> Result<(), StoreError> {
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(scored.len() + 1);
    rows.push(
        ["CodigoExterno", "Nombre", "NombreOrganismo", "Puntaje Rubro", "Puntaje Palabra", "Puntaje Monto", "Puntaje Clientes", "Puntaje Total"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    for st in scored {
        rows.push(vec![
            st.tender.external_code.clone(),
            st.tender.name.clone(),
            st.tender.organism_name.clone(),
            fmt_score(st.scores.category),
            fmt_score(st.scores.keyword),
            fmt_score(st.scores.monetary),
            fmt_score(st.scores.client),
            fmt_score(st.scores.total()),
        ]);
    }
    replace_rows(store, tabs::RANKING_AUDIT, "A1", rows, None).await?;
    info!(count = scored.len(), "non-relative audit table published");
    Ok(())
}

/// Final ranked table, below the preserved heading cell.
pub async fn publish_ranking(
    store: &dyn SheetStore,
    ranked: &[RankedTender],
) -> Result<(), StoreError> {
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(ranked.len() + 1);
    rows.push(
        ["#", "CodigoExterno", "Nombre", "NombreOrganismo", "Link", "Rubro", "Palabra", "Monto", "Clientes", "Puntaje Final"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    for r in ranked {
        rows.push(vec![
            r.rank.to_string(),
            r.tender.external_code.clone(),
            r.tender.name.clone(),
            r.tender.organism_name.clone(),
            r.tender.link.clone(),
            fmt_score(r.relative_category),
            fmt_score(r.relative_keyword),
            fmt_score(r.relative_monetary),
            fmt_score(r.relative_client),
            fmt_score(r.final_score),
        ]);
    }
    replace_rows(
        store,
        tabs::RANKING,
        RANKING_START_CELL,
        rows,
        Some(RANKING_TITLE_CELL),
    )
    .await?;
    info!(count = ranked.len(), "final ranking published");
    Ok(())
}
