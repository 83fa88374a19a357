use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stock_market::*;

#[derive(Parser, Debug)]
#[command(about = "Replays stock price changes against the portfolios observing them")]
struct Args {
    /// JSON scenario to run instead of the built-in one
    #[arg(long, env = "STOCK_MARKET_SCENARIO")]
    scenario: Option<PathBuf>,
    /// Only print the final totals
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("{}=info", env!("CARGO_CRATE_NAME")).into()
        }))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    debug!("{:?}", args);

    run(args)
}

fn run(args: Args) -> Result<()> {
    let scenario = match &args.scenario {
        Some(path) => Scenario::from_path(path)
            .with_context(|| format!("Failed to load scenario {}", path.display()))?,
        None => Scenario::default(),
    };

    let display: Rc<dyn PortfolioDisplay> = if args.quiet {
        Rc::new(SilentDisplay)
    } else {
        Rc::new(ConsoleDisplay)
    };

    let market = scenario.run(display).context("Failed to run scenario")?;

    for summary in market.summaries()? {
        println!(
            "{} has {} value",
            summary.name,
            summary.total.to_string().yellow()
        );
    }

    Ok(())
}
