//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::Path;
use std::process::Output;

use anyhow::Result;

use crate::domain::{
    AddressAllocation, ConfigLayer, DnsRecord, LaunchSpec, NetworkInterface, ProvisionedInstance,
    Settings,
};

// ── Compute Port ──────────────────────────────────────────────────────────────

/// Compute and network operations against the cloud provider.
///
/// Implementations are bound to a single region at construction time.
#[allow(async_fn_in_trait)]
pub trait ComputeProvider {
    /// Create a network interface in `subnet` with the given security groups.
    async fn create_network_interface(
        &self,
        subnet: &str,
        security_groups: &[String],
    ) -> Result<NetworkInterface>;
    /// Allocate a new VPC-scoped public address.
    async fn allocate_address(&self) -> Result<AddressAllocation>;
    /// Associate an allocated address with a network interface.
    async fn associate_address(
        &self,
        allocation: &AddressAllocation,
        interface: &NetworkInterface,
    ) -> Result<()>;
    /// Launch one instance and return its initial snapshot.
    async fn launch_instance(&self, spec: &LaunchSpec) -> Result<ProvisionedInstance>;
    /// Fetch the current snapshot of an instance.
    async fn describe_instance(&self, instance_id: &str) -> Result<ProvisionedInstance>;
    /// Add a single tag to an instance.
    async fn add_tag(&self, instance_id: &str, key: &str, value: &str) -> Result<()>;
}

// ── DNS Port ──────────────────────────────────────────────────────────────────

/// DNS record management.
#[allow(async_fn_in_trait)]
pub trait DnsProvider {
    /// Create `record` in its hosted zone. Fails if the record already exists.
    async fn create_record(&self, record: &DnsRecord) -> Result<()>;
}

// ── Filesystem Ports ──────────────────────────────────────────────────────────

/// Writes the host descriptor handed to configuration management.
#[allow(async_fn_in_trait)]
pub trait DescriptorWriter {
    /// Write `contents` to `path`, replacing any existing file.
    async fn write_descriptor(&self, path: &Path, contents: &str) -> Result<()>;
}

/// Loads the YAML documents a run is configured from.
pub trait LayerLoader {
    /// Load and parse the settings file.
    fn load_settings(&self, path: &Path) -> Result<Settings>;
    /// Load one configuration layer (instance config or base template).
    fn load_layer(&self, path: &Path) -> Result<ConfigLayer>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program to completion and capture its output.
    ///
    /// Implementations enforce their own timeout and must kill the child
    /// when it fires.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait: no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// A long wait begins (e.g. polling for instance readiness).
    fn wait_started(&self, message: &str);
    /// The wait started by `wait_started` is over.
    fn wait_finished(&self, ok: bool, message: &str);
}
