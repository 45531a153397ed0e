//! Compute instance types: lifecycle status, launch spec, provisioned handle.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::domain::config::EffectiveConfig;

/// Root device of the launched image.
pub const ROOT_DEVICE: &str = "/dev/sda1";
/// General-purpose SSD.
pub const ROOT_VOLUME_TYPE: &str = "gp2";
/// A shutdown from inside the guest stops the instance; it is never terminated.
pub const SHUTDOWN_BEHAVIOR: &str = "stop";

// ── Status ────────────────────────────────────────────────────────────────────

/// Instance lifecycle state as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceStatus {
    Pending,
    Running,
    ShuttingDown,
    Terminated,
    Stopping,
    Stopped,
    /// Any state string we do not recognise, kept verbatim.
    Other(String),
}

impl InstanceStatus {
    #[must_use]
    pub fn parse(state: &str) -> Self {
        match state {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "shutting-down" => Self::ShuttingDown,
            "terminated" => Self::Terminated,
            "stopping" => Self::Stopping,
            "stopped" => Self::Stopped,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::ShuttingDown => "shutting-down",
            Self::Terminated => "terminated",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Other(s) => s,
        }
    }

    /// States a freshly launched instance never leaves on its own towards
    /// `running`; polling stops as soon as one is observed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::ShuttingDown | Self::Terminated | Self::Stopping | Self::Stopped
        )
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for InstanceStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ── Provider handles ──────────────────────────────────────────────────────────

/// Snapshot of the provider-owned instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionedInstance {
    pub instance_id: String,
    pub private_ip: Option<String>,
    pub public_ip: Option<String>,
    pub public_dns_name: Option<String>,
    pub status: InstanceStatus,
}

/// A created elastic network interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterface {
    pub id: String,
}

/// A VPC-scoped public address allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressAllocation {
    pub allocation_id: String,
    pub public_ip: String,
}

// ── Launch spec ───────────────────────────────────────────────────────────────

/// An existing network interface attached at launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAttachment {
    pub network_interface_id: String,
    pub device_index: u32,
}

/// An EBS volume in the block device mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDevice {
    pub device_name: String,
    pub volume_size_gib: u32,
    pub volume_type: String,
    pub delete_on_termination: bool,
}

/// Everything the provider needs to launch one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub image_id: String,
    pub key_name: String,
    pub instance_type: String,
    pub user_data: String,
    pub monitoring: bool,
    pub disable_api_termination: bool,
    pub shutdown_behavior: String,
    pub tenancy: String,
    pub ebs_optimized: bool,
    pub network_interfaces: Vec<InterfaceAttachment>,
    pub block_devices: Vec<BlockDevice>,
}

impl LaunchSpec {
    /// Launch parameters for a host: monitoring off, termination protection
    /// on, stop on shutdown, and a root volume that outlives the instance.
    #[must_use]
    pub fn for_host(
        config: &EffectiveConfig,
        interface: &NetworkInterface,
        user_data: String,
    ) -> Self {
        Self {
            image_id: config.ec2.ami.clone(),
            key_name: config.ec2.key.clone(),
            instance_type: config.ec2.instance_type.clone(),
            user_data,
            monitoring: false,
            disable_api_termination: true,
            shutdown_behavior: SHUTDOWN_BEHAVIOR.to_string(),
            tenancy: "default".to_string(),
            ebs_optimized: config.ec2.ebs_optimized,
            network_interfaces: vec![InterfaceAttachment {
                network_interface_id: interface.id.clone(),
                device_index: 0,
            }],
            block_devices: vec![BlockDevice {
                device_name: ROOT_DEVICE.to_string(),
                volume_size_gib: config.ec2.root_volume_size,
                volume_type: ROOT_VOLUME_TYPE.to_string(),
                delete_on_termination: false,
            }],
        }
    }
}

/// Derive the region from an availability zone (`us-east-1a` → `us-east-1`).
///
/// A value that already names a region is returned unchanged.
#[must_use]
pub fn region_for_zone(zone: &str) -> &str {
    let mut chars = zone.chars().rev();
    match (chars.next(), chars.next()) {
        (Some(last), Some(prev)) if last.is_ascii_lowercase() && prev.is_ascii_digit() => {
            &zone[..zone.len() - 1]
        }
        _ => zone,
    }
}
