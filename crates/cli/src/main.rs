use clap::{Parser, Subcommand};

mod commands;

use commands::{ForecastArgs, LiquidationArgs, ScoreArgs};

#[derive(Parser)]
#[command(name = "yield-risk")]
#[command(about = "Risk-adjusted yield scoring and liquidation risk for DeFi pools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score and rank pools from a JSON file
    Score(ScoreArgs),
    /// Liquidation probability of a collateralized position over several horizons
    Liquidation(LiquidationArgs),
    /// Ensemble volatility forecast for a price history
    Forecast(ForecastArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Reports go to stdout, logs to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Score(args) => {
            commands::run_score(args).await?;
        }
        Commands::Liquidation(args) => {
            commands::run_liquidation(&args)?;
        }
        Commands::Forecast(args) => {
            commands::run_forecast(args).await?;
        }
    }

    Ok(())
}
