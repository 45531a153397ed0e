//! Layered configuration: recursive merge and the typed effective config.
//!
//! Pure functions only. No I/O and no async.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::domain::error::ConfigError;

/// One configuration source (profile defaults, base template, instance config).
///
/// `serde_yaml::Value` is already a tagged sum type over scalars, sequences
/// and mappings, so merging is a pattern match over the variant pair.
pub type ConfigLayer = Value;

// ── Merge ────────────────────────────────────────────────────────────────────

/// Merge `defaults` underneath `config`.
///
/// Keys present in both mappings are merged recursively with `config` still on
/// the winning side. Keys only in `defaults` are copied in. If either side is
/// not a mapping, `config` is returned unchanged and `defaults` is dropped at
/// that level; sequences and scalars are replaced, never concatenated.
#[must_use]
pub fn merge_layers(defaults: ConfigLayer, config: ConfigLayer) -> ConfigLayer {
    match (defaults, config) {
        (Value::Mapping(defaults), Value::Mapping(mut config)) => {
            for (key, default_value) in defaults {
                match config.get_mut(&key) {
                    Some(slot) => {
                        let value = std::mem::replace(slot, Value::Null);
                        *slot = merge_layers(default_value, value);
                    }
                    None => {
                        config.insert(key, default_value);
                    }
                }
            }
            Value::Mapping(config)
        }
        (_, config) => config,
    }
}

/// Resolve the three layers into one effective configuration.
///
/// The base template is merged underneath the instance config first, then the
/// profile defaults underneath that result.
#[must_use]
pub fn resolve(
    profile_defaults: ConfigLayer,
    base: Option<ConfigLayer>,
    instance: ConfigLayer,
) -> ConfigLayer {
    let with_base = match base {
        Some(base) => merge_layers(base, instance),
        None => instance,
    };
    merge_layers(profile_defaults, with_base)
}

// ── Effective config schema ──────────────────────────────────────────────────

/// Typed view of the merged configuration used by a provisioning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConfig {
    /// Short hostname, e.g. `db1`.
    pub hostname: String,
    /// Whether the host gets an Elastic IP and a public DNS record.
    pub public: bool,
    pub ec2: Ec2Config,
    pub route53: Route53Config,
    /// Puppet roles written to the host descriptor.
    #[serde(default)]
    pub puppet_roles: Vec<String>,
    /// Raw Hiera YAML appended verbatim to the host descriptor.
    #[serde(default)]
    pub hiera_data: String,
}

/// EC2 launch parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ec2Config {
    pub availability_zone: String,
    pub ami: String,
    pub key: String,
    pub instance_type: String,
    /// Root volume size in GiB.
    pub root_volume_size: u32,
    #[serde(default)]
    pub ebs_optimized: bool,
    pub subnet: String,
    #[serde(default)]
    pub security_groups: Vec<String>,
}

/// Route53 zones the host is registered under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route53Config {
    #[serde(default)]
    pub public_domain: String,
    pub private_domain: String,
}

impl EffectiveConfig {
    /// Deserialize the merged layer into the typed configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEffectiveConfig`] if a required key is
    /// missing or has the wrong type after merging, and
    /// [`ConfigError::MissingPublicDomain`] for a public host without a
    /// public zone.
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_value(layer.clone()).map_err(ConfigError::InvalidEffectiveConfig)?;
        if config.public && config.route53.public_domain.trim().is_empty() {
            return Err(ConfigError::MissingPublicDomain {
                hostname: config.hostname,
            });
        }
        Ok(config)
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
