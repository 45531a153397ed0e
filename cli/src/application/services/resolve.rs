//! Application service: load the configuration documents and resolve them.
//!
//! Every failure here happens before any external call is made.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_yaml::{Mapping, Value};

use crate::application::ports::LayerLoader;
use crate::domain::config::{self, ConfigLayer, EffectiveConfig};
use crate::domain::error::ConfigError;
use crate::domain::settings::Settings;

/// Where the three documents of a run live.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub settings: PathBuf,
    pub base: Option<PathBuf>,
    pub instance: PathBuf,
}

/// Output of [`resolve_run_config`].
#[derive(Debug, Clone)]
pub struct ResolvedRun {
    pub settings: Settings,
    /// Merged layer, kept for `--print-config`.
    pub layer: ConfigLayer,
    pub config: EffectiveConfig,
}

/// Load settings, the optional base template and the instance config, then
/// resolve the effective configuration.
///
/// # Errors
///
/// Returns an error if a file cannot be read or parsed, a layer is not a
/// mapping, or the merged result is missing required keys.
pub fn resolve_run_config(loader: &impl LayerLoader, paths: &ConfigPaths) -> Result<ResolvedRun> {
    let settings = loader
        .load_settings(&paths.settings)
        .context("loading settings")?;
    let base = paths
        .base
        .as_deref()
        .map(|path| load_mapping(loader, path))
        .transpose()
        .context("loading base template")?;
    let instance = load_mapping(loader, &paths.instance).context("loading instance config")?;

    tracing::debug!(
        settings = %paths.settings.display(),
        base = ?paths.base,
        instance = %paths.instance.display(),
        "resolving configuration layers"
    );

    let layer = config::resolve(settings.profile_defaults.clone(), base, instance);
    let effective = EffectiveConfig::from_layer(&layer)?;
    Ok(ResolvedRun {
        settings,
        layer,
        config: effective,
    })
}

/// Load a layer that must be a mapping; an empty document counts as `{}`.
fn load_mapping(loader: &impl LayerLoader, path: &Path) -> Result<ConfigLayer> {
    match loader.load_layer(path)? {
        Value::Null => Ok(Value::Mapping(Mapping::new())),
        layer @ Value::Mapping(_) => Ok(layer),
        _ => Err(ConfigError::NotAMapping {
            path: path.display().to_string(),
        }
        .into()),
    }
}
