use anyhow::Result;
use clap::Parser;
use log::info;

use minimax_chess::uci::{UciHandler, DEFAULT_DEPTH, ENGINE_NAME};

/// UCI chess engine searching a fixed number of plies with alpha-beta minimax
#[derive(Parser, Debug)]
#[command(name = ENGINE_NAME, version, about)]
struct Args {
    /// Search depth in plies for `go` without an explicit depth
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_DEPTH,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    depth: u32,
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout is reserved for the protocol
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    info!("starting {} with depth {}", ENGINE_NAME, args.depth);

    let mut uci = UciHandler::new(args.depth);
    uci.run()
}
