use crate::config::EngineConfig;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use std::path::Path;
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads engine configuration by merging defaults, TOML, environment variables, and JSON.
    ///
    /// Environment variables use the `YIELD_RISK_` prefix, e.g.
    /// `YIELD_RISK_HORIZON_DAYS=30`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be parsed or the merged
    /// configuration fails validation.
    pub fn load() -> Result<EngineConfig> {
        Self::extract(Self::base().merge(Toml::file("config/Engine.toml")))
    }

    /// Loads engine configuration with a specific profile layered on top.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be parsed or the merged
    /// configuration fails validation.
    pub fn load_with_profile(profile: &str) -> Result<EngineConfig> {
        Self::extract(
            Self::base()
                .merge(Toml::file("config/Engine.toml"))
                .merge(Toml::file(format!("config/Engine.{profile}.toml"))),
        )
    }

    /// Loads engine configuration from an explicit TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or validation fails.
    pub fn load_from(path: impl AsRef<Path>) -> Result<EngineConfig> {
        let path = path.as_ref();
        Self::extract(Self::base().merge(Toml::file(path)))
            .with_context(|| format!("Failed to load config from {}", path.display()))
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(EngineConfig::default()))
    }

    fn extract(figment: Figment) -> Result<EngineConfig> {
        let config: EngineConfig = figment
            .merge(Env::prefixed("YIELD_RISK_"))
            .join(Json::file("config/Engine.json"))
            .extract()?;

        config.validate()?;
        debug!(
            horizon_days = config.horizon_days,
            basis = ?config.liquidation_basis,
            "Loaded engine configuration"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LiquidationBasis;
    use figment::Jail;

    #[test]
    fn load_without_files_returns_defaults() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::load().expect("defaults should load");
            assert_eq!(config, EngineConfig::default());
            Ok(())
        });
    }

    #[test]
    fn toml_and_env_override_defaults() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(
                "config/Engine.toml",
                r#"
                horizon_days = 30
                baseline_apr = 0.045
                liquidation_basis = "horizon"

                [collateral]
                current_ratio = 2.0
                liquidation_ratio = 1.1
                "#,
            )?;
            jail.set_env("YIELD_RISK_EMERGENCY_HAIRCUT", "0.25");

            let config = ConfigLoader::load().expect("config should load");
            assert_eq!(config.horizon_days, 30);
            assert!((config.baseline_apr - 0.045).abs() < f64::EPSILON);
            assert!((config.emergency_haircut - 0.25).abs() < f64::EPSILON);
            assert_eq!(config.liquidation_basis, LiquidationBasis::Horizon);
            assert!(config.collateral.is_some());
            Ok(())
        });
    }

    #[test]
    fn profile_file_layers_on_base() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file("config/Engine.toml", "horizon_days = 30")?;
            jail.create_file("config/Engine.stress.toml", "assumed_correlation = 0.9")?;

            let config = ConfigLoader::load_with_profile("stress").expect("config should load");
            assert_eq!(config.horizon_days, 30);
            assert!((config.assumed_correlation - 0.9).abs() < f64::EPSILON);
            Ok(())
        });
    }

    #[test]
    fn invalid_values_fail_validation() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file("config/Engine.toml", "horizon_days = 0")?;

            let err = ConfigLoader::load().expect_err("zero horizon must be rejected");
            assert!(err.to_string().contains("horizon_days"), "error was {err}");
            Ok(())
        });
    }
}
