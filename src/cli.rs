//! Command-line surface of the `swap-desk` binary.

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "swap-desk")]
#[command(about = "Search tokens, quote and execute swaps through the Jupiter Ultra API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Token pair and amount shared by the quoting commands.
#[derive(Debug, Clone, Args)]
pub struct PairArgs {
    /// Token to sell, by mint address or symbol
    #[arg(long)]
    pub input: String,
    /// Token to buy, by mint address or symbol
    #[arg(long)]
    pub output: String,
    /// Amount of the input token in display units, e.g. `1.5`
    #[arg(long)]
    pub amount: String,
    /// Slippage tolerance in basis points (defaults to DEFAULT_SLIPPAGE_BPS)
    #[arg(long)]
    pub slippage_bps: Option<u16>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the token directory
    Search {
        query: String,
        /// Show at most this many results
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Fetch a single quote
    Quote {
        #[command(flatten)]
        pair: PairArgs,
        /// Taker wallet address
        #[arg(long, env = "TAKER_ADDRESS")]
        taker: Option<String>,
    },
    /// Keep a quote fresh and report RPC latency until interrupted
    Watch {
        #[command(flatten)]
        pair: PairArgs,
    },
    /// Create an order and print the transaction to sign
    Order {
        #[command(flatten)]
        pair: PairArgs,
        /// Taker wallet address
        #[arg(long, env = "TAKER_ADDRESS")]
        taker: String,
    },
    /// Submit a signed transaction for an existing order
    Submit {
        #[arg(long)]
        request_id: String,
        /// Signed transaction, base64 encoded
        #[arg(long)]
        signed_transaction: String,
    },
    /// Measure RPC latency once
    Ping,
    /// Compare the three summation implementations
    Sum { n: i64 },
    /// Print the wallet listing review
    Review {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}
