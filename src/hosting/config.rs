use crate::Coins;
use clap::Parser;

/// Server configuration.
#[derive(Clone, Debug, Parser)]
#[command(name = "coinduel", about = "Real-time staked coin flips and chess")]
pub struct Config {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub bind: String,
    /// HTTP worker threads.
    #[arg(long, default_value_t = 4)]
    pub workers: usize,
    /// Largest allowed stake.
    #[arg(long, default_value_t = 10_000)]
    pub max_stake: Coins,
    /// Balance a previously unseen account opens with.
    #[arg(long, default_value_t = 1_000)]
    pub opening_balance: Coins,
    /// Pending challenges older than this many hours expire.
    #[arg(long, default_value_t = 24)]
    pub expire_hours: i64,
    /// Seconds between expiry sweeps.
    #[arg(long, default_value_t = 300)]
    pub sweep_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::parse_from(["coinduel"])
    }
}
