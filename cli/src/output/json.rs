//! JSON output helpers.
//!
//! Every `--json` code path prints exactly one pretty-printed object on
//! stdout; progress and logs go elsewhere.

use anyhow::{Context, Result};

use crate::application::services::provision::ProvisionOutcome;
use crate::domain::config::ConfigLayer;

/// Stateless renderer for `--json` mode.
pub struct JsonRenderer;

impl JsonRenderer {
    /// Print the outcome of a provisioning run.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_outcome(&self, outcome: &ProvisionOutcome) -> Result<()> {
        println!("{}", format_outcome(outcome)?);
        Ok(())
    }

    /// Print the effective configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer has keys JSON cannot represent.
    pub fn render_config(&self, layer: &ConfigLayer) -> Result<()> {
        let out = serde_json::to_string_pretty(layer).context("JSON serialization failed")?;
        println!("{out}");
        Ok(())
    }
}

/// Format a provisioning outcome as a JSON object.
///
/// ```json
/// { "status": "ready", "instance_id": "i-…", "private_ip": "10.0.0.5", … }
/// { "status": "not_running", "instance_id": "i-…", "last_status": "pending", "exhausted": true }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_outcome(outcome: &ProvisionOutcome) -> Result<String> {
    let obj = match outcome {
        ProvisionOutcome::Ready(report) => {
            let mut obj = serde_json::to_value(report).context("JSON serialization failed")?;
            obj["status"] = serde_json::Value::from("ready");
            obj
        }
        ProvisionOutcome::NotRunning {
            instance_id,
            last_status,
            exhausted,
        } => serde_json::json!({
            "status": "not_running",
            "instance_id": instance_id,
            "last_status": last_status,
            "exhausted": exhausted,
        }),
    };
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Format a JSON error object.
///
/// ```json
/// { "error": true, "message": "...", "code": "..." }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}
