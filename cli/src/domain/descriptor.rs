//! Hiera host descriptor: the YAML file Puppet reads for a provisioned host.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::config::EffectiveConfig;

#[derive(Serialize)]
struct HostDescriptor<'a> {
    roles: &'a [String],
}

/// Render the descriptor: `roles` in block style, then `hiera_data` verbatim.
///
/// # Errors
///
/// Returns an error if the roles cannot be serialized.
pub fn render(roles: &[String], hiera_data: &str) -> Result<String, serde_yaml::Error> {
    let mut out = serde_yaml::to_string(&HostDescriptor { roles })?;
    out.push_str(hiera_data);
    Ok(out)
}

/// `<hostname>.<private domain>.yaml`
#[must_use]
pub fn file_name(hostname: &str, private_domain: &str) -> String {
    format!("{hostname}.{private_domain}.yaml")
}

/// Full descriptor path for a host under the Hiera hosts directory.
#[must_use]
pub fn path_for(hiera_host_path: &Path, config: &EffectiveConfig) -> PathBuf {
    hiera_host_path.join(file_name(&config.hostname, &config.route53.private_domain))
}
