// =============================================================================
// short-radar — CLI entry point
// =============================================================================
//
//   short-radar <snapshot.json> [SYMBOL]     analyse one snapshot, print JSON
//   short-radar --init-config <path>         write the built-in tier configs
//
// Environment (a `.env` file is honoured):
//   SHORT_RADAR_CONFIG          path to the tier config JSON
//   SHORT_RADAR_TIER_TTL_SECS   tier cache TTL in seconds (default 300)
//   RUST_LOG                    log filter (default "info")

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use short_radar::alt_config::ConfigSet;
use short_radar::analysis::{MarketSnapshot, ShortSetupAnalyzer};
use short_radar::tier::classifier::DEFAULT_TIER_TTL;
use short_radar::tier::{format_tier_debug, TierClassifier};

const USAGE: &str = "usage: short-radar <snapshot.json> [SYMBOL] | short-radar --init-config <path>";

fn main() -> Result<()> {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [flag, path] if flag == "--init-config" => {
            ConfigSet::default().save(path)?;
            info!(path = %path, "built-in tier configs written");
            Ok(())
        }
        [snapshot] => run(snapshot, None),
        [snapshot, symbol] => run(snapshot, Some(symbol.as_str())),
        _ => bail!(USAGE),
    }
}

fn run(snapshot_path: &str, symbol: Option<&str>) -> Result<()> {
    let path = Path::new(snapshot_path);
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot from {}", path.display()))?;
    let snapshot: MarketSnapshot = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse snapshot from {}", path.display()))?;

    let symbol = symbol
        .map(str::to_uppercase)
        .or_else(|| path.file_stem().map(|s| s.to_string_lossy().to_uppercase()))
        .unwrap_or_else(|| "UNKNOWN".to_string());

    let configs = match std::env::var("SHORT_RADAR_CONFIG") {
        Ok(config_path) => ConfigSet::load_or_default(config_path),
        Err(_) => ConfigSet::default(),
    };

    let ttl = tier_ttl_from_env();
    let analyzer = ShortSetupAnalyzer::new(TierClassifier::with_ttl(ttl), configs);
    let report = analyzer.analyze(&symbol, &snapshot);

    debug!("\n{}", format_tier_debug(&symbol, &report.tier));

    let json = serde_json::to_string_pretty(&report).context("failed to serialise analysis report")?;
    println!("{json}");
    Ok(())
}

fn tier_ttl_from_env() -> Duration {
    match std::env::var("SHORT_RADAR_TIER_TTL_SECS") {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(e) => {
                warn!(value = %raw, error = %e, "invalid SHORT_RADAR_TIER_TTL_SECS, using default");
                DEFAULT_TIER_TTL
            }
        },
        Err(_) => DEFAULT_TIER_TTL,
    }
}
