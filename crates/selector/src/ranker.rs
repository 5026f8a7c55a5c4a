//! Deterministic ordering of scored pools.

use std::cmp::Ordering;
use tracing::info;
use yield_risk_core::{EngineConfig, ScoredPool};

/// Orders two pools: higher score first, then higher `apy` (missing last),
/// then `symbol` ascending. Non-finite scores sort after all finite ones.
#[must_use]
pub fn compare(a: &ScoredPool, b: &ScoredPool) -> Ordering {
    let (sa, sb) = (a.risk_adjusted_score, b.risk_adjusted_score);
    sb.is_finite()
        .cmp(&sa.is_finite())
        .then_with(|| sb.total_cmp(&sa))
        .then_with(|| match (a.pool.apy, b.pool.apy) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.pool.symbol.cmp(&b.pool.symbol))
}

/// Returns a sorted copy; the input is untouched.
#[must_use]
pub fn rank(pools: &[ScoredPool]) -> Vec<ScoredPool> {
    let mut ranked = pools.to_vec();
    ranked.sort_by(compare);
    ranked
}

/// The first `n` pools of an already ranked slice.
#[must_use]
pub fn top_n(ranked: &[ScoredPool], n: usize) -> &[ScoredPool] {
    &ranked[..n.min(ranked.len())]
}

/// Ranks pools and keeps the configured number of leaders.
#[derive(Debug, Clone)]
pub struct PoolRanker {
    top_n: usize,
}

impl PoolRanker {
    #[must_use]
    pub const fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.top_n)
    }

    /// Ranks all pools and returns the leaders.
    #[must_use]
    pub fn select(&self, pools: &[ScoredPool]) -> Vec<ScoredPool> {
        let ranked = rank(pools);
        let selected = top_n(&ranked, self.top_n).to_vec();

        info!(
            candidates = pools.len(),
            selected = selected.len(),
            leader = selected.first().map(ScoredPool::symbol),
            "Ranked pools"
        );
        selected
    }
}
