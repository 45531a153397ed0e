//! Human-readable terminal renderer.

use anyhow::{Context, Result};

use crate::application::services::provision::ProvisionOutcome;
use crate::domain::config::ConfigLayer;
use crate::domain::instance::InstanceStatus;
use crate::output::OutputContext;

/// Renders run results as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the outcome of a provisioning run.
    ///
    /// The final status line is printed even in quiet mode.
    pub fn render_outcome(&self, outcome: &ProvisionOutcome) {
        match outcome {
            ProvisionOutcome::Ready(report) => {
                let address = report
                    .public_dns_name
                    .as_deref()
                    .or(report.public_ip.as_deref())
                    .unwrap_or(&report.private_ip);
                println!(
                    "New instance \"{}\" accessible at {address}",
                    report.instance_id
                );
                self.ctx.kv("Private IP:", &report.private_ip);
                if let Some(ip) = &report.public_ip {
                    self.ctx.kv("Public IP:", ip);
                }
                for record in &report.dns_records {
                    self.ctx.kv("DNS:", record);
                }
                self.ctx
                    .kv("Descriptor:", &report.descriptor_path.display().to_string());
            }
            ProvisionOutcome::NotRunning {
                instance_id,
                last_status,
                ..
            } => {
                let status = last_status
                    .as_ref()
                    .map_or("unknown", InstanceStatus::as_str);
                self.ctx.error(&format!("Instance status: {status}"));
                self.ctx.kv("Instance:", instance_id);
            }
        }
    }

    /// Print the effective configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if YAML serialization fails.
    pub fn render_config(&self, layer: &ConfigLayer) -> Result<()> {
        let out = serde_yaml::to_string(layer).context("YAML serialization failed")?;
        print!("{out}");
        Ok(())
    }
}
