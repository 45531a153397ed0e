//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::Parser;

use crate::app::{AppContext, OutputFlags};
use crate::commands;
use crate::domain::error::ProvisionError;

/// Exit code for configuration errors, launch errors and instances that never ran.
pub const EXIT_FAILURE: u8 = 1;
/// Exit code when the instance is running but a later step failed.
pub const EXIT_POST_LAUNCH: u8 = 3;

/// Launch and register a single EC2 host from layered YAML configuration
#[derive(Parser)]
#[command(name = "ec2-provision", version)]
pub struct Cli {
    #[command(flatten)]
    pub launch: commands::launch::LaunchArgs,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,
}

impl Cli {
    /// Execute the provisioning run.
    ///
    /// Returns `Ok(false)` when the run finished without a running instance.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, launch or a post-launch step fails.
    pub async fn run(self) -> Result<bool> {
        let Cli {
            launch,
            json,
            quiet,
            no_color,
        } = self;
        let app = AppContext::new(&OutputFlags {
            no_color,
            quiet,
            json,
        });
        commands::launch::run(&launch, &app).await
    }
}

fn post_launch(err: &anyhow::Error) -> bool {
    err.chain().any(|e| {
        matches!(
            e.downcast_ref::<ProvisionError>(),
            Some(ProvisionError::PostLaunch { .. })
        )
    })
}

/// Process exit code for a failed run.
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    if post_launch(err) {
        EXIT_POST_LAUNCH
    } else {
        EXIT_FAILURE
    }
}

/// Machine-readable error code used in `--json` error objects.
#[must_use]
pub fn error_code_for(err: &anyhow::Error) -> &'static str {
    if post_launch(err) {
        "post_launch_failed"
    } else {
        "provision_failed"
    }
}
