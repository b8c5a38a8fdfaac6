// src/store/memory.rs
//! In-process sheet store: a grid of strings per tab.
//!
//! Backs the integration tests and local dry runs; behaves like the real
//! store for range reads, updates and clears (no retry semantics needed).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{a1, SheetStore};
use crate::error::StoreError;

#[derive(Debug, Default)]
pub struct MemoryStore {
    tabs: Mutex<HashMap<String, Vec<Vec<String>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a tab with a full grid (row 0 = sheet row 1).
    pub fn seed(&self, tab: &str, rows: Vec<Vec<String>>) {
        self.tabs.lock().unwrap().insert(tab.to_string(), rows);
    }

    /// Seed a single cell, growing the grid as needed.
    pub fn seed_cell(&self, tab: &str, cell: &str, value: &str) {
        let r = a1::parse_range(cell);
        let mut tabs = self.tabs.lock().unwrap();
        let grid = tabs.entry(tab.to_string()).or_default();
        grow_to(grid, r.row_start, r.col_start);
        grid[r.row_start][r.col_start] = value.to_string();
    }

    /// Full grid snapshot of a tab (empty if absent).
    pub fn tab(&self, tab: &str) -> Vec<Vec<String>> {
        self.tabs.lock().unwrap().get(tab).cloned().unwrap_or_default()
    }
}

fn grow_to(grid: &mut Vec<Vec<String>>, row: usize, col: usize) {
    if grid.len() <= row {
        grid.resize(row + 1, Vec::new());
    }
    let r = &mut grid[row];
    if r.len() <= col {
        r.resize(col + 1, String::new());
    }
}

#[async_trait]
impl SheetStore for MemoryStore {
    async fn read_range(&self, tab: &str, range: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let tabs = self.tabs.lock().unwrap();
        let grid = match tabs.get(tab) {
            Some(g) => g,
            None => return Ok(Vec::new()),
        };
        let r = a1::parse_range(range);
        let row_end = r.row_end.unwrap_or(grid.len().saturating_sub(1));
        let mut out = Vec::new();
        for row in grid.iter().skip(r.row_start).take(row_end.saturating_sub(r.row_start) + 1) {
            let cells: Vec<String> = (r.col_start..=r.col_end)
                .map(|c| row.get(c).cloned().unwrap_or_default())
                .collect();
            out.push(cells);
        }
        // The real API omits trailing all-empty rows; mirror that.
        while out
            .last()
            .is_some_and(|row| row.iter().all(|c| c.trim().is_empty()))
        {
            out.pop();
        }
        Ok(out)
    }

    async fn update_range(
        &self,
        tab: &str,
        start_cell: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<(), StoreError> {
        let start = a1::parse_range(start_cell);
        let mut tabs = self.tabs.lock().unwrap();
        let grid = tabs.entry(tab.to_string()).or_default();
        for (i, row) in rows.into_iter().enumerate() {
            for (j, value) in row.into_iter().enumerate() {
                grow_to(grid, start.row_start + i, start.col_start + j);
                grid[start.row_start + i][start.col_start + j] = value;
            }
        }
        Ok(())
    }

    async fn clear_tab(&self, tab: &str) -> Result<(), StoreError> {
        self.tabs.lock().unwrap().remove(tab);
        Ok(())
    }
}
