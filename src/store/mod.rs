// src/store/mod.rs
//! Spreadsheet workspace access behind a trait seam.
//!
//! The pipeline only ever needs range reads and full-tab replaces; the
//! Google-backed implementation lives in [`google`], and [`memory`]
//! provides an in-process double for tests and dry runs.

pub mod google;
pub mod memory;

use async_trait::async_trait;

use crate::error::StoreError;

/// Tabular store contract used by the configuration loader and publisher.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Values of an A1 range within a tab. Rows may be ragged; trailing
    /// empty cells are not guaranteed to be present.
    async fn read_range(&self, tab: &str, range: &str) -> Result<Vec<Vec<String>>, StoreError>;

    /// Write `rows` starting at `start_cell` (A1 notation).
    async fn update_range(
        &self,
        tab: &str,
        start_cell: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<(), StoreError>;

    /// Clear every value in a tab.
    async fn clear_tab(&self, tab: &str) -> Result<(), StoreError>;

    /// Single-cell convenience read; `None` for an empty cell.
    async fn read_cell(&self, tab: &str, cell: &str) -> Result<Option<String>, StoreError> {
        let rows = self.read_range(tab, cell).await?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|r| r.into_iter().next())
            .filter(|v| !v.trim().is_empty()))
    }
}

/// Clear-then-write with title preservation: the designated title cell is
/// read before the clear and restored afterwards, so a tab can keep its
/// heading across full replaces.
pub async fn replace_rows(
    store: &dyn SheetStore,
    tab: &str,
    start_cell: &str,
    rows: Vec<Vec<String>>,
    preserve_title_cell: Option<&str>,
) -> Result<(), StoreError> {
    let title = match preserve_title_cell {
        Some(cell) => store.read_cell(tab, cell).await?,
        None => None,
    };
    store.clear_tab(tab).await?;
    if let (Some(cell), Some(value)) = (preserve_title_cell, title) {
        store.update_range(tab, cell, vec![vec![value]]).await?;
    }
    store.update_range(tab, start_cell, rows).await
}

/// Minimal A1 helpers shared by the in-memory store and tests.
pub(crate) mod a1 {
    /// Parsed A1 range, zero-based, end row `None` for open-ended ranges
    /// like `B2:B`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Range {
        pub col_start: usize,
        pub row_start: usize,
        pub col_end: usize,
        pub row_end: Option<usize>,
    }

    fn col_index(letters: &str) -> usize {
        letters
            .bytes()
            .fold(0usize, |acc, b| acc * 26 + (b - b'A' + 1) as usize)
            - 1
    }

    fn split_cell(cell: &str) -> (String, Option<usize>) {
        let letters: String = cell.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
        let digits: String = cell.chars().skip_while(|c| c.is_ascii_alphabetic()).collect();
        let row = digits.parse::<usize>().ok().map(|r| r - 1);
        (letters.to_ascii_uppercase(), row)
    }

    /// Parse `"C27:C32"`, `"C13"` or open-ended `"B2:B"`.
    pub fn parse_range(range: &str) -> Range {
        let (start, end) = match range.split_once(':') {
            Some((s, e)) => (s, Some(e)),
            None => (range, None),
        };
        let (start_col, start_row) = split_cell(start);
        let col_start = col_index(&start_col);
        let row_start = start_row.unwrap_or(0);
        match end {
            None => Range {
                col_start,
                row_start,
                col_end: col_start,
                row_end: Some(row_start),
            },
            Some(e) => {
                let (end_col, end_row) = split_cell(e);
                Range {
                    col_start,
                    row_start,
                    col_end: col_index(&end_col),
                    row_end: end_row,
                }
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn single_cell() {
            let r = parse_range("C13");
            assert_eq!(
                r,
                Range {
                    col_start: 2,
                    row_start: 12,
                    col_end: 2,
                    row_end: Some(12)
                }
            );
        }

        #[test]
        fn closed_and_open_ranges() {
            let r = parse_range("C27:C32");
            assert_eq!(r.row_start, 26);
            assert_eq!(r.row_end, Some(31));

            let open = parse_range("B2:B");
            assert_eq!(open.col_start, 1);
            assert_eq!(open.row_start, 1);
            assert_eq!(open.row_end, None);
        }

        #[test]
        fn multi_letter_columns() {
            assert_eq!(parse_range("AA1").col_start, 26);
        }
    }
}
