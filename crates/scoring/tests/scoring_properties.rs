//! End-to-end properties of the scoring pipeline.
//!
//! - Low-volatility pools outrank high-yield volatile pools on short horizons
//! - Scores are monotone in yield at equal volatility
//! - The short-horizon limit is dominated by liquidation loss over ε
//! - The liquidation model behaves sanely on a well-collateralized position

use std::collections::HashMap;
use yield_risk_core::{EngineConfig, LiquidationBasis, PoolRecord};
use yield_risk_scoring::{
    liquidation_probability, risk_adjusted_score, score_pool, score_pools, ScoreCalculator,
};

// =============================================================================
// Helper Functions
// =============================================================================

/// The reference configuration: 7 days, 3% baseline, 0.5% liquidation,
/// 40% haircut, 0.3 correlation.
fn reference_config() -> EngineConfig {
    EngineConfig {
        horizon_days: 7,
        baseline_apr: 0.03,
        liquidation_probability: 0.005,
        emergency_haircut: 0.4,
        assumed_correlation: 0.3,
        ..Default::default()
    }
}

// =============================================================================
// Concrete scenario
// =============================================================================

#[test]
fn low_volatility_pool_outranks_high_yield_pool() {
    let records = vec![
        PoolRecord::new("A", 0.12, 20.0),
        PoolRecord::new("B", 0.05, 2.0),
    ];

    let (scored, summary) = score_pools(&records, &HashMap::new(), &reference_config()).unwrap();

    assert_eq!(summary.scored, 2);
    let a = scored[0].risk_adjusted_score;
    let b = scored[1].risk_adjusted_score;

    assert!(a.is_finite() && b.is_finite(), "scores were {a} and {b}");
    assert!(b > a, "B ({b}) should outrank A ({a})");

    // Pinned under the annual liquidation basis.
    assert!((a - 0.0397).abs() < 5e-4, "A was {a}");
    assert!((b - 0.0836).abs() < 5e-4, "B was {b}");
}

#[test]
fn scenario_components_are_positive_under_annual_basis() {
    let config = reference_config();
    for pool in [PoolRecord::new("A", 0.12, 20.0), PoolRecord::new("B", 0.05, 2.0)] {
        let scored = score_pool(&pool, &config).unwrap().unwrap();
        let c = scored.score_components;
        assert!(c.numerator > 0.0, "{} numerator was {}", pool.symbol, c.numerator);
        assert!(c.liquidation_loss > 0.0);
        assert_eq!(c.delta, 7);
    }
}

// =============================================================================
// Score ordering
// =============================================================================

#[test]
fn higher_yield_never_scores_lower_at_equal_volatility() {
    let config = reference_config();
    let calculator = ScoreCalculator::new(&config).unwrap();

    for vol in [1.0, 5.0, 20.0, 80.0, 250.0] {
        let mut previous = f64::NEG_INFINITY;
        for apy in [-0.05, 0.0, 0.02, 0.05, 0.1, 0.5, 2.0] {
            let score = calculator
                .score(&PoolRecord::new("P", apy, vol))
                .unwrap()
                .risk_adjusted_score;
            assert!(
                score >= previous,
                "vol {vol}: apy {apy} scored {score} below {previous}"
            );
            previous = score;
        }
    }
}

#[test]
fn lower_volatility_scores_higher_for_positive_excess() {
    let config = reference_config();
    let calm = score_pool(&PoolRecord::new("C", 0.2, 10.0), &config).unwrap().unwrap();
    let wild = score_pool(&PoolRecord::new("W", 0.2, 100.0), &config).unwrap().unwrap();
    assert!(calm.risk_adjusted_score > wild.risk_adjusted_score);
}

// =============================================================================
// Horizon limit
// =============================================================================

#[test]
fn short_horizon_limit_is_liquidation_loss_over_floor() {
    let config = EngineConfig {
        liquidation_basis: LiquidationBasis::Horizon,
        ..reference_config()
    };

    // −L/ε × H = −(0.005 × 0.4) / 0.001 × 0.7
    let limit = -1.4;
    for (apy, vol) in [(0.12, 20.0), (0.05, 2.0), (1.0, 300.0)] {
        let (score, components) = risk_adjusted_score(apy, vol, 1e-9, 0.005, &config);
        assert!(score.is_finite());
        assert!(
            (score - limit).abs() < 1e-4,
            "apy {apy} vol {vol}: score {score} should approach {limit}"
        );
        assert!(components.downside_volatility < config.volatility_floor);
    }
}

#[test]
fn one_day_horizon_is_finite() {
    let config = reference_config().with_horizon(1);
    let scored = score_pool(&PoolRecord::new("A", 0.12, 20.0), &config).unwrap().unwrap();
    assert!(scored.risk_adjusted_score.is_finite());
    assert_eq!(scored.score_components.delta, 1);
}

// =============================================================================
// Liquidation model
// =============================================================================

#[test]
fn liquidation_sanity() {
    let p = liquidation_probability(2.0, 1.1, 0.60, 7.0).unwrap();
    assert!(p > 0.0 && p < 1e-3, "probability was {p}");
}

#[test]
fn liquidation_monotone_in_volatility() {
    let low = liquidation_probability(1.4, 1.1, 0.3, 30.0).unwrap();
    let high = liquidation_probability(1.4, 1.1, 0.9, 30.0).unwrap();
    assert!(high >= low, "high {high} < low {low}");
}

#[test]
fn scored_pool_serializes_with_flattened_record() {
    let scored = score_pool(&PoolRecord::new("A", 0.12, 20.0), &reference_config())
        .unwrap()
        .unwrap();
    let json = serde_json::to_value(&scored).unwrap();

    assert_eq!(json["symbol"], "A");
    assert!(json["riskAdjustedScore"].is_number());
    assert_eq!(json["scoreComponents"]["delta"], 7);
}
