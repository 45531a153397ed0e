//! Process-wide settings loaded once from `settings.yaml`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::config::ConfigLayer;

/// Default location of the settings file, relative to the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "settings.yaml";

/// Settings shared by every run. Immutable after load; passed by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Lowest-precedence configuration layer.
    #[serde(rename = "profileDefaults", default)]
    pub profile_defaults: ConfigLayer,
    /// cloud-config template with `$HOSTNAME`, `$PUBLIC_DOMAIN` and
    /// `$PRIVATE_DOMAIN` placeholders.
    pub cloud_config: String,
    /// Shell script shipped as the second user-data part.
    pub user_script: String,
    /// Directory receiving one Hiera descriptor per host.
    #[serde(rename = "hieraHostPath")]
    pub hiera_host_path: PathBuf,
}
