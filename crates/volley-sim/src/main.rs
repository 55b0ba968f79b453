use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use volley_match::config::VolleyConfig;
use volley_sim::{InputSource, MatchRunner, RandomInputs, ScriptedInputs};

#[derive(Parser)]
#[command(name = "volley-sim")]
#[command(about = "Run a Volley match headlessly and print the result", long_about = None)]
struct Args {
    /// Match config (TOML). Falls back to VOLLEY_CONFIG or config/volley.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input script (TOML). Random inputs are used when absent.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Maximum ticks to simulate.
    #[arg(long, default_value_t = 3600)]
    ticks: u64,

    /// Seed for the serve and for random inputs.
    #[arg(long)]
    seed: Option<u64>,

    /// End the match once a side reaches this score.
    #[arg(long)]
    winning_score: Option<u32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            VolleyConfig::from_toml(&content)
                .with_context(|| format!("parsing config {}", path.display()))?
        },
        None => VolleyConfig::load(),
    };

    let mut custom = HashMap::new();
    if let Some(seed) = args.seed {
        custom.insert("seed".to_string(), serde_json::json!(seed));
    }
    if let Some(score) = args.winning_score {
        custom.insert("winning_score".to_string(), serde_json::json!(score));
    }

    let mut source: Box<dyn InputSource> = match &args.script {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading script {}", path.display()))?;
            Box::new(
                ScriptedInputs::from_toml(&content)
                    .with_context(|| format!("parsing script {}", path.display()))?,
            )
        },
        None => Box::new(RandomInputs::new(
            args.seed.unwrap_or(config.match_rules.seed),
        )),
    };

    tracing::info!(ticks = args.ticks, "volley-sim starting");
    let mut runner = MatchRunner::new(config);
    runner.start(custom);
    runner.run(source.as_mut(), args.ticks);
    let summary = runner.finish();

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
