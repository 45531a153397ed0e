//! ec2-provision: launch and register a single EC2 host

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ec2_provision::cli::{self, Cli};
use ec2_provision::output::json::format_error;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    let json = args.json;
    match args.run().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(cli::EXIT_FAILURE),
        Err(e) => {
            if json {
                match format_error(&format!("{e:#}"), cli::error_code_for(&e)) {
                    Ok(obj) => println!("{obj}"),
                    Err(_) => eprintln!("Error: {e:#}"),
                }
            } else {
                eprintln!("Error: {e:#}");
            }
            ExitCode::from(cli::exit_code_for(&e))
        }
    }
}
