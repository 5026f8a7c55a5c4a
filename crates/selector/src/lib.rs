//! Ranking and reporting of scored pools.

pub mod ranker;
pub mod report;

pub use ranker::{compare, rank, top_n, PoolRanker};
pub use report::{ReportFormatter, ScoringReport};
