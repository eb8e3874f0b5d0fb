use clap::Parser;
use ldpc_sim::cli::Args;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    Args::parse().run()
}
