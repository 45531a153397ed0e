//! `ec2-provision <CONFIG_FILE>`: resolve the configuration and provision one host.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::poll::PollPolicy;
use crate::application::services::provision::InstanceProvisioner;
use crate::application::services::resolve::{ConfigPaths, resolve_run_config};
use crate::domain::instance::region_for_zone;
use crate::domain::settings::DEFAULT_SETTINGS_FILE;

/// Arguments for a provisioning run.
#[derive(Args, Debug)]
pub struct LaunchArgs {
    /// Instance configuration (YAML); wins over the base template and the profile defaults
    #[arg(value_name = "CONFIG_FILE")]
    pub config: PathBuf,

    /// Base YAML template merged under the instance configuration
    #[arg(long, value_name = "FILE")]
    pub base: Option<PathBuf>,

    /// Settings file with profile defaults, user-data templates and the descriptor directory
    #[arg(
        long,
        value_name = "FILE",
        env = "EC2_PROVISION_SETTINGS",
        default_value = DEFAULT_SETTINGS_FILE
    )]
    pub settings: PathBuf,

    /// Seconds between two instance status polls
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval: u64,

    /// Give up waiting for `running` after this many seconds, 0 = never
    #[arg(long, value_name = "SECS", default_value_t = 900)]
    pub timeout: u64,

    /// Print the effective configuration and exit without calling AWS
    #[arg(long)]
    pub print_config: bool,
}

impl LaunchArgs {
    fn config_paths(&self) -> ConfigPaths {
        ConfigPaths {
            settings: self.settings.clone(),
            base: self.base.clone(),
            instance: self.config.clone(),
        }
    }

    /// Polling policy built from `--poll-interval` and `--timeout`.
    #[must_use]
    pub fn poll_policy(&self) -> PollPolicy {
        let interval = Duration::from_secs(self.poll_interval);
        if self.timeout == 0 {
            PollPolicy::unbounded(interval)
        } else {
            PollPolicy {
                interval,
                timeout: Some(Duration::from_secs(self.timeout)),
                max_attempts: None,
            }
        }
    }
}

/// Run one provisioning pass.
///
/// Returns `Ok(false)` when the instance was launched but never reached
/// `running`.
///
/// # Errors
///
/// Returns an error if the configuration cannot be resolved, an AWS call
/// before the wait fails, or a post-launch step fails.
pub async fn run(args: &LaunchArgs, app: &AppContext) -> Result<bool> {
    let resolved = resolve_run_config(&app.loader, &args.config_paths())?;
    let renderer = app.renderer();

    if args.print_config {
        renderer.render_config(&resolved.layer)?;
        return Ok(true);
    }

    let config = &resolved.config;
    let region = region_for_zone(&config.ec2.availability_zone);
    tracing::info!(hostname = %config.hostname, region, public = config.public, "provisioning host");
    app.output
        .header(&format!("Provisioning {} in {region}", config.hostname));

    let aws = app.aws(region);
    let reporter = app.terminal_reporter();
    let provisioner = InstanceProvisioner::new(
        &aws,
        &aws,
        &app.fs,
        &reporter,
        &resolved.settings,
        args.poll_policy(),
    );
    let outcome = provisioner.run(config).await?;

    renderer.render_outcome(&outcome)?;
    Ok(outcome.is_ready())
}
