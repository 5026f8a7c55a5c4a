#![allow(clippy::format_push_string)]

use serde::{Deserialize, Serialize};
use yield_risk_core::{EngineConfig, LiquidationBasis, ScoredPool};
use yield_risk_scoring::{LiquidationAssessment, ScoringSummary};
use yield_risk_volatility::VolatilityForecast;

const HEAVY_RULE: &str = "═══════════════════════════════════════════════════════════════════════════\n";
const LIGHT_RULE: &str = "───────────────────────────────────────────────────────────────────────────\n";
const SYMBOL_WIDTH: usize = 16;

/// Machine-readable form of a scoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringReport {
    pub horizon_days: u32,
    pub baseline_apr: f64,
    pub liquidation_basis: LiquidationBasis,
    pub modeled_liquidation: bool,
    pub summary: ScoringSummary,
    pub pools: Vec<ScoredPool>,
}

impl ScoringReport {
    #[must_use]
    pub fn new(config: &EngineConfig, summary: ScoringSummary, pools: Vec<ScoredPool>) -> Self {
        Self {
            horizon_days: config.horizon_days,
            baseline_apr: config.baseline_apr,
            liquidation_basis: config.liquidation_basis,
            modeled_liquidation: config.collateral.is_some(),
            summary,
            pools,
        }
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

pub struct ReportFormatter;

impl ReportFormatter {
    /// Fixed-width ranking table with the run's assumptions.
    #[must_use]
    pub fn format(report: &ScoringReport, config: &EngineConfig) -> String {
        let mut output = String::new();
        let delta = report.horizon_days;

        output.push('\n');
        output.push_str(HEAVY_RULE);
        output.push_str("                      RISK-ADJUSTED YIELD RANKING\n");
        output.push_str(HEAVY_RULE);
        output.push('\n');

        output.push_str("Assumptions\n");
        output.push_str(LIGHT_RULE);
        output.push_str(&format!("Horizon:               {delta} days\n"));
        output.push_str(&format!(
            "Baseline APR:          {:.2}%\n",
            config.baseline_apr * 100.0
        ));
        match config.collateral {
            Some(collateral) => output.push_str(&format!(
                "Liquidation:           modeled (ratio {:.2}, liquidates at {:.2})\n",
                collateral.current_ratio, collateral.liquidation_ratio
            )),
            None => output.push_str(&format!(
                "Liquidation:           {:.2}% ({})\n",
                config.liquidation_probability * 100.0,
                basis_label(config.liquidation_basis)
            )),
        }
        output.push_str(&format!(
            "Emergency Haircut:     {:.2}%\n",
            config.emergency_haircut * 100.0
        ));
        output.push_str(&format!(
            "Assumed Correlation:   {:.2}\n",
            config.assumed_correlation
        ));
        output.push('\n');

        output.push_str("Pools\n");
        output.push_str(LIGHT_RULE);
        output.push_str(&format!(
            "{:>4}  {:<width$} {:>9} {:>9} {:>11} {:>10}  {}\n",
            "Rank",
            "Symbol",
            "APY %",
            "Vol %",
            format!("Ret {delta}d %"),
            "Score",
            "Vol Source",
            width = SYMBOL_WIDTH
        ));

        if report.pools.is_empty() {
            output.push_str("  (no pools could be scored)\n");
        }
        for (rank, scored) in report.pools.iter().enumerate() {
            output.push_str(&format_row(rank + 1, scored));
        }
        output.push('\n');

        let summary = &report.summary;
        output.push_str("Summary\n");
        output.push_str(LIGHT_RULE);
        output.push_str(&format!("Scored:                {}\n", summary.scored));
        output.push_str(&format!("Unscored:              {}\n", summary.unscored));
        output.push_str(&format!("Dropped:               {}\n", summary.dropped));
        output.push_str(&format!(
            "Forecast Volatility:   {}\n",
            summary.forecast_overrides
        ));
        output.push('\n');
        output.push_str(HEAVY_RULE);

        output
    }

    /// Per-pool breakdown of every score component.
    #[must_use]
    pub fn format_breakdown(scored: &ScoredPool) -> String {
        let mut output = String::new();
        let c = &scored.score_components;
        let delta = c.delta;

        output.push_str(&format!("{}\n", scored.symbol()));
        output.push_str(LIGHT_RULE);
        output.push_str(&format!(
            "Return ({delta}d):           {:>12.6}%\n",
            c.apr_horizon * 100.0
        ));
        output.push_str(&format!(
            "Baseline ({delta}d):         {:>12.6}%\n",
            c.baseline_apr_horizon * 100.0
        ));
        output.push_str(&format!(
            "Liquidation Loss:       {:>12.6}%\n",
            c.liquidation_loss * 100.0
        ));
        output.push_str(&format!(
            "Excess Return:          {:>12.6}%\n",
            c.numerator * 100.0
        ));
        output.push_str(&format!(
            "Downside Vol ({delta}d):     {:>12.6}%\n",
            c.downside_volatility * 100.0
        ));
        output.push_str(&format!(
            "Correlation Haircut:    {:>12.4}\n",
            c.correlation_haircut
        ));
        output.push_str(&format!(
            "Risk-Adjusted Score:    {:>12.4}\n",
            scored.risk_adjusted_score
        ));
        output.push('\n');

        output
    }

    /// Liquidation assessments across horizons.
    #[must_use]
    pub fn format_liquidation(
        current_ratio: f64,
        liquidation_ratio: f64,
        volatility: f64,
        assessments: &[LiquidationAssessment],
    ) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str(HEAVY_RULE);
        output.push_str("                      LIQUIDATION PROBABILITY\n");
        output.push_str(HEAVY_RULE);
        output.push('\n');
        output.push_str(&format!("Collateral Ratio:      {current_ratio:.4}\n"));
        output.push_str(&format!("Liquidation Ratio:     {liquidation_ratio:.4}\n"));
        output.push_str(&format!(
            "Annual Volatility:     {:.2}%\n",
            volatility * 100.0
        ));
        if let Some(first) = assessments.first() {
            output.push_str(&format!(
                "Required Drop:         {:.2}%\n",
                first.required_drop * 100.0
            ));
        }
        output.push('\n');

        output.push_str(&format!(
            "{:>8} {:>14} {:>10} {:>12}\n",
            "Days", "Probability", "z", "σ√T"
        ));
        output.push_str(LIGHT_RULE);
        for a in assessments {
            let marker = if a.at_threshold { "  (at threshold)" } else { "" };
            output.push_str(&format!(
                "{:>8.1} {:>14.6e} {:>10.4} {:>12.6}{marker}\n",
                a.days, a.probability, a.z_score, a.scaled_volatility
            ));
        }
        output.push('\n');

        output
    }

    /// Forecast components, regime and confidence.
    #[must_use]
    pub fn format_forecast(
        symbol: &str,
        forecast: &VolatilityForecast,
        horizon_days: f64,
    ) -> String {
        let mut output = String::new();
        let c = &forecast.components;

        output.push('\n');
        output.push_str(HEAVY_RULE);
        output.push_str(&format!("                      VOLATILITY FORECAST: {symbol}\n"));
        output.push_str(HEAVY_RULE);
        output.push('\n');

        if forecast.is_insufficient() {
            output.push_str("⚠️  Not enough price history to forecast (need at least 3 prices).\n\n");
            return output;
        }

        output.push_str("Components (annualized)\n");
        output.push_str(LIGHT_RULE);
        output.push_str(&format!("Historical:            {:.2}%\n", c.historical * 100.0));
        output.push_str(&format!("Recent 30-Day:         {:.2}%\n", c.recent_30_day * 100.0));
        output.push_str(&format!("EWMA:                  {:.2}%\n", c.ewma * 100.0));
        output.push_str(&format!("Regime-Adjusted:       {:.2}%\n", c.regime_adjusted * 100.0));
        output.push_str(&format!("Macro-Adjusted:        {:.2}%\n", c.macro_adjusted * 100.0));
        output.push('\n');

        output.push_str("Forecast\n");
        output.push_str(LIGHT_RULE);
        output.push_str(&format!(
            "Regime:                {} (×{:.2}, recent {:.2}%)\n",
            forecast.regime.regime,
            forecast.regime.risk_multiplier,
            forecast.regime.annualized_recent_vol * 100.0
        ));
        output.push_str(&format!("Calendar Multiplier:   ×{:.2}\n", forecast.macro_multiplier));
        output.push_str(&format!(
            "Ensemble (annual):     {:.2}%\n",
            forecast.ensemble_vol * 100.0
        ));
        output.push_str(&format!(
            "Ensemble ({horizon_days}d):         {:.2}%\n",
            forecast.for_horizon(horizon_days) * 100.0
        ));
        output.push_str(&format!("Confidence:            {:.2}\n", forecast.confidence));
        output.push_str(&format!(
            "Vol of Vol:            {:.4}\n",
            forecast.metrics.volatility_of_volatility
        ));
        output.push_str(&format!("Returns:               {}\n", forecast.metrics.sample_size));
        output.push('\n');

        output
    }
}

fn format_row(rank: usize, scored: &ScoredPool) -> String {
    let pool = &scored.pool;
    let symbol: String = pool.symbol.chars().take(SYMBOL_WIDTH).collect();
    let source = pool
        .volatility_source
        .as_ref()
        .map_or_else(|| "-".to_string(), ToString::to_string);

    format!(
        "{:>4}  {:<width$} {:>9} {:>9} {:>11.4} {:>10.4}  {}\n",
        rank,
        symbol,
        optional_percent(pool.apy.map(|a| a * 100.0)),
        optional_percent(pool.volatility),
        scored.score_components.apr_horizon * 100.0,
        scored.risk_adjusted_score,
        source,
        width = SYMBOL_WIDTH
    )
}

fn optional_percent(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}

fn basis_label(basis: LiquidationBasis) -> &'static str {
    match basis {
        LiquidationBasis::Annual => "annual",
        LiquidationBasis::Horizon => "per horizon",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yield_risk_core::{CollateralConfig, PoolRecord, VolatilitySource};
    use yield_risk_scoring::{score_pools, LiquidationModel};
    use yield_risk_volatility::{MarketRegime, Regime, VolatilityForecaster, VolatilityMetrics};

    fn sample_report(config: &EngineConfig) -> ScoringReport {
        let mut b = PoolRecord::new("B", 0.05, 2.0);
        b.volatility_source = Some(VolatilitySource::Field("il7d".to_string()));
        let records = vec![PoolRecord::new("A", 0.12, 20.0), b];
        let (scored, summary) =
            score_pools(&records, &std::collections::HashMap::new(), config).unwrap();
        ScoringReport::new(config, summary.with_dropped(1), crate::rank(&scored))
    }

    #[test]
    fn table_lists_pools_in_rank_order() {
        let config = EngineConfig::default();
        let text = ReportFormatter::format(&sample_report(&config), &config);

        assert!(text.contains("RISK-ADJUSTED YIELD RANKING"));
        assert!(text.contains("Horizon:               7 days"));
        assert!(text.contains("Baseline APR:          3.00%"));
        assert!(text.contains("(annual)"));
        assert!(text.contains("Dropped:               1"));

        let b = text.find("   1  B ").expect("B ranked first");
        let a = text.find("   2  A ").expect("A ranked second");
        assert!(b < a);
        assert!(text.contains("il7d"));
    }

    #[test]
    fn table_mentions_modeled_liquidation() {
        let config = EngineConfig {
            collateral: Some(CollateralConfig {
                current_ratio: 1.8,
                liquidation_ratio: 1.2,
            }),
            ..Default::default()
        };
        let text = ReportFormatter::format(&sample_report(&config), &config);
        assert!(text.contains("modeled (ratio 1.80, liquidates at 1.20)"));
    }

    #[test]
    fn empty_table_says_so() {
        let config = EngineConfig::default();
        let report = ScoringReport::new(&config, ScoringSummary::default(), Vec::new());
        assert!(ReportFormatter::format(&report, &config).contains("no pools could be scored"));
    }

    #[test]
    fn breakdown_lists_components() {
        let config = EngineConfig::default();
        let report = sample_report(&config);
        let text = ReportFormatter::format_breakdown(&report.pools[0]);

        assert!(text.starts_with("B\n"));
        assert!(text.contains("Return (7d):"));
        assert!(text.contains("Correlation Haircut:"));
        assert!(text.contains("0.7000"));
    }

    #[test]
    fn json_round_trips_through_value() {
        let config = EngineConfig::default();
        let report = sample_report(&config);
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["horizonDays"], 7);
        assert_eq!(value["liquidationBasis"], "annual");
        assert_eq!(value["summary"]["scored"], 2);
        assert_eq!(value["pools"][0]["symbol"], "B");
        assert_eq!(value["pools"][0]["volatilitySource"], "il7d");
    }

    #[test]
    fn liquidation_table_marks_threshold() {
        let model = LiquidationModel::new();
        let assessments = model.assess_horizons(1.1, 1.1, 0.6, &[7.0]).unwrap();
        let text = ReportFormatter::format_liquidation(1.1, 1.1, 0.6, &assessments);
        assert!(text.contains("(at threshold)"));
        assert!(text.contains("Annual Volatility:     60.00%"));
    }

    #[test]
    fn forecast_text_shows_regime() {
        let metrics = VolatilityMetrics {
            historical_vol: 0.9,
            recent_30_day_vol: 0.9,
            ewma_vol: 0.9,
            sample_size: 60,
            ..Default::default()
        };
        let forecast = VolatilityForecaster::default().combine(
            metrics,
            MarketRegime::new(Regime::High, 0.9),
            1.0,
        );
        let text = ReportFormatter::format_forecast("ETH", &forecast, 7.0);
        assert!(text.contains("VOLATILITY FORECAST: ETH"));
        assert!(text.contains("HIGH"));
    }

    #[test]
    fn forecast_text_flags_insufficient_history() {
        let forecast = VolatilityForecaster::default().combine(
            VolatilityMetrics::default(),
            MarketRegime::new(Regime::Normal, 0.0),
            1.0,
        );
        let text = ReportFormatter::format_forecast("X", &forecast, 7.0);
        assert!(text.contains("Not enough price history"));
    }
}
