//! # ULM Main Entry Point
//!
//! Executable entry point for **ULM (Universal Locale Manager)**. It
//! initializes logging, loads the configuration, and executes the CLI
//! command provided by the user.

use clap::Parser;
use ulm::cli::Cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args = Cli::parse();
    args.run()
}
