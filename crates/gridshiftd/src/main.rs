//! gridshiftd — the GridShift daemon.
//!
//! Assembles the rebalancer against a cluster backend and runs the sweep
//! loop until shutdown.
//!
//! # Usage
//!
//! ```text
//! gridshiftd standalone --sweep-interval 30 --seed cluster.toml
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;

use gridshift_cluster::InMemoryCluster;
use gridshift_rebalance::{BalancerConfig, Rebalancer};
use gridshift_usage::Thresholds;

mod seed;

#[derive(Parser)]
#[command(name = "gridshiftd", about = "GridShift rebalancing daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run against an in-process cluster (single binary, local use).
    Standalone {
        /// Pause between sweeps in seconds.
        #[arg(long, default_value = "30")]
        sweep_interval: u64,

        /// Eviction grace period in seconds.
        #[arg(long, default_value = "30")]
        eviction_grace: u64,

        /// CPU percentage above which a machine is overloaded.
        #[arg(long, default_value = "60.0")]
        cpu_high: f64,

        /// CPU percentage below which a machine may be underutilized.
        #[arg(long, default_value = "40.0")]
        cpu_low: f64,

        /// Memory percentage above which a machine is overloaded.
        #[arg(long, default_value = "60.0")]
        memory_high: f64,

        /// Memory percentage below which a machine may be underutilized.
        #[arg(long, default_value = "40.0")]
        memory_low: f64,

        /// TOML file describing machines, workloads, and budgets to seed.
        #[arg(long)]
        seed: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gridshiftd=debug,gridshift=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Standalone {
            sweep_interval,
            eviction_grace,
            cpu_high,
            cpu_low,
            memory_high,
            memory_low,
            seed,
        } => {
            let config = BalancerConfig {
                thresholds: Thresholds {
                    cpu_high,
                    cpu_low,
                    memory_high,
                    memory_low,
                },
                sweep_interval: Duration::from_secs(sweep_interval),
                eviction_grace: Duration::from_secs(eviction_grace),
            };
            run_standalone(config, seed).await
        }
    }
}

async fn run_standalone(config: BalancerConfig, seed: Option<PathBuf>) -> anyhow::Result<()> {
    info!("GridShift daemon starting in standalone mode");

    let cluster = InMemoryCluster::new();
    if let Some(path) = seed {
        let seed = seed::ClusterSeed::from_file(&path)?;
        seed.populate(&cluster);
        info!(path = ?path, "cluster seeded");
    }

    let rebalancer = Rebalancer::new(cluster).with_config(config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move {
        rebalancer.run(shutdown_rx).await;
    });

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    let _ = shutdown_tx.send(true);
    let _ = handle.await;

    info!("GridShift daemon stopped");
    Ok(())
}
