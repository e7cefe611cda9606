use anyhow::{Context, Result};
use bakestimator::{prelude::*, rpc::RpcClient};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Estimate baking and endorsement opportunities, required deposits and
/// rewards on a Tezos network.
#[derive(Debug, Parser)]
#[command(name = "bakestimator", version, about, long_about = None)]
struct Args {
    /// Calculate estimates for this number of cycles. May be repeated.
    /// Defaults to the network's preserved cycles.
    #[arg(short, long = "cycles", value_name = "CYCLES")]
    cycles: Vec<u64>,
    /// Number of rolls used for baking (roll-based protocols).
    #[arg(short, long, default_value_t = 1)]
    rolls: u64,
    /// Probability that reported "max" values are not exceeded.
    #[arg(long, default_value_t = EstimationBuilder::DEFAULT_CONFIDENCE)]
    confidence: f64,
    /// Name of the Tezos network.
    #[arg(short, long, default_value = "main")]
    network: Network,
    /// Custom URL for the Tezos node RPC, overrides the one derived from
    /// --network.
    #[arg(long, env = "TEZOS_RPC", value_name = "URL")]
    rpc: Option<String>,
    /// Baker's own balance in tez (stake-based protocols).
    #[arg(long, default_value_t = 6_000.0)]
    full_balance: f64,
    /// Balance delegated to the baker in tez (stake-based protocols).
    #[arg(long, default_value_t = 0.0)]
    delegated_balance: f64,
    /// Frozen deposit limit in tez (stake-based protocols).
    #[arg(long)]
    deposit_limit: Option<f64>,
    /// Minimal staking balance for selection, in rolls (stake-based
    /// protocols).
    #[arg(long, default_value_t = 1)]
    eligibility_rolls: u64,
    /// Output format: text, csv or json.
    #[arg(long, default_value = "text")]
    format: Format,
}

impl Args {
    fn holdings(&self) -> BakerHoldings {
        BakerHoldings {
            rolls: self.rolls,
            full_balance: self.full_balance,
            delegated_balance: self.delegated_balance,
            deposit_limit: self.deposit_limit,
            eligibility_rolls: self.eligibility_rolls,
        }
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so reports on stdout can be piped.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bakestimator=warn")),
        )
        .init();

    let args = Args::parse();

    let client = match &args.rpc {
        Some(url) => RpcClient::new(url)?,
        None => RpcClient::for_network(args.network)?,
    };
    let snapshot = NetworkSnapshot::fetch(&client).with_context(|| {
        format!("failed to fetch network data from {}", client.base_url())
    })?;
    tracing::info!(
        protocol = snapshot.constants.kind(),
        blocks_per_cycle = snapshot.constants.blocks_per_cycle(),
        rpc = client.base_url(),
        "using network constants"
    );

    let config = EstimatorConfig::default();
    let preserved_cycles = snapshot.params.preserved_cycles;
    println!("preserved cycles: {}", preserved_cycles);
    println!(
        "roll size: {}",
        snapshot.params.tokens_per_roll / config.micro_units_per_token
    );
    println!();

    let cycles = if args.cycles.is_empty() {
        vec![preserved_cycles]
    } else {
        args.cycles.clone()
    };

    let group = EstimationBuilder::new()
        .constants(snapshot.constants)
        .stake(snapshot.stake_input(&args.holdings(), &config))
        .cycles_iter(cycles)
        .confidence(args.confidence)
        .config(config)
        .build_group()?;

    for result in group.run_all()? {
        println!("{}", result.table(args.format));
    }

    Ok(())
}
