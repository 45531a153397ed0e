//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod descriptor;
pub mod dns;
pub mod error;
pub mod instance;
pub mod settings;
pub mod user_data;

pub use config::{ConfigLayer, Ec2Config, EffectiveConfig, Route53Config, merge_layers, resolve};
pub use dns::DnsRecord;
pub use error::{ConfigError, PostLaunchStep, ProviderError, ProvisionError};
pub use instance::{
    AddressAllocation, InstanceStatus, LaunchSpec, NetworkInterface, ProvisionedInstance,
    region_for_zone,
};
pub use settings::Settings;
