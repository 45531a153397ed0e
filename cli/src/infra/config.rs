//! Infrastructure implementation of the `LayerLoader` port.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::LayerLoader;
use crate::domain::config::ConfigLayer;
use crate::domain::settings::Settings;

/// Production implementation of `LayerLoader` that reads YAML files from disk.
pub struct YamlFileLoader;

impl YamlFileLoader {
    fn read(path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
    }
}

impl LayerLoader for YamlFileLoader {
    fn load_settings(&self, path: &Path) -> Result<Settings> {
        let content = Self::read(path)?;
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    fn load_layer(&self, path: &Path) -> Result<ConfigLayer> {
        let content = Self::read(path)?;
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }
}
