//! Typed domain error enums.
//!
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator. `main` inspects [`ProvisionError`] to pick the exit
//! code, so post-launch failures stay distinguishable from launch failures.

use std::fmt;

use thiserror::Error;

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while loading and resolving configuration layers.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{path}: expected a YAML mapping at the top level")]
    NotAMapping { path: String },

    #[error("effective configuration is incomplete or mistyped")]
    InvalidEffectiveConfig(#[source] serde_yaml::Error),

    #[error("host {hostname} is public but route53.publicDomain is not set")]
    MissingPublicDomain { hostname: String },
}

// ── Provider errors ───────────────────────────────────────────────────────────

/// Errors raised by the cloud provider adapters.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("`aws {command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("unexpected response from `aws {command}`")]
    BadResponse {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("`aws {command}` returned no instance")]
    MissingInstance { command: String },

    #[error("Route53 hosted zone '{0}' not found")]
    ZoneNotFound(String),
}

// ── Provisioning errors ───────────────────────────────────────────────────────

/// A step that runs only after the instance reached `running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostLaunchStep {
    PrivateDnsRecord,
    PublicDnsRecord,
    HostDescriptor,
    NameTag,
}

impl fmt::Display for PostLaunchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PrivateDnsRecord => "private DNS record",
            Self::PublicDnsRecord => "public DNS record",
            Self::HostDescriptor => "host descriptor",
            Self::NameTag => "Name tag",
        })
    }
}

/// Errors from the provisioning sequence that need operator follow-up.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(
        "instance {instance_id} is running but the {step} step failed; \
         finish it by hand (the instance was not terminated)"
    )]
    PostLaunch {
        step: PostLaunchStep,
        instance_id: String,
        #[source]
        source: anyhow::Error,
    },
}
