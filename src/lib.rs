// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod pipeline;
pub mod publish;
pub mod rank;
pub mod scoring;
pub mod settings;
pub mod sources;
pub mod store;
pub mod tender;

// ---- Re-exports for a stable public API ----
pub use crate::config::{ConfigProvider, RankingConfig, Weights};
pub use crate::pipeline::{run, RunOptions, RunSummary};
pub use crate::store::SheetStore;
pub use crate::tender::{RankedTender, ScoredTender, Scores, Tender};
