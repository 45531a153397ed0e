//! Shared mock ports for unit tests.
//!
//! Each mock records the calls it receives so tests can assert on ordering
//! and arguments without touching AWS or the filesystem.

#![allow(clippy::expect_used, dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use ec2_provision::application::ports::{
    CommandRunner, ComputeProvider, DescriptorWriter, DnsProvider, ProgressReporter,
};
use ec2_provision::domain::dns::DnsRecord;
use ec2_provision::domain::instance::{
    AddressAllocation, InstanceStatus, LaunchSpec, NetworkInterface, ProvisionedInstance,
};

pub const INSTANCE_ID: &str = "i-0db1";
pub const INTERFACE_ID: &str = "eni-0db1";
pub const ALLOCATION_ID: &str = "eipalloc-0db1";
pub const PRIVATE_IP: &str = "10.0.1.20";
pub const PUBLIC_IP: &str = "54.1.2.3";
pub const PUBLIC_DNS: &str = "ec2-54-1-2-3.compute-1.amazonaws.com";

// ── Mock: compute ─────────────────────────────────────────────────────────────

/// One scripted answer to `describe_instance`.
#[derive(Debug, Clone)]
pub enum Describe {
    Status(InstanceStatus),
    Fail,
}

/// `ComputeProvider` that answers `describe_instance` from a script and
/// records every call as a short string.
pub struct ScriptedCompute {
    pub calls: Mutex<Vec<String>>,
    pub launched: Mutex<Option<LaunchSpec>>,
    script: Mutex<VecDeque<Describe>>,
    /// Answer once the script runs out.
    fallback: Describe,
    fail_launch: bool,
    fail_tag: bool,
}

impl ScriptedCompute {
    pub fn new(script: Vec<Describe>, fallback: Describe) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            launched: Mutex::new(None),
            script: Mutex::new(script.into()),
            fallback,
            fail_launch: false,
            fail_tag: false,
        }
    }

    /// `pending` once, then `running`.
    pub fn starts_normally() -> Self {
        Self::new(
            vec![Describe::Status(InstanceStatus::Pending)],
            Describe::Status(InstanceStatus::Running),
        )
    }

    pub fn failing_launch(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    pub fn failing_tag(mut self) -> Self {
        self.fail_tag = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn describe_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with("describe_instance"))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("lock").push(call);
    }
}

fn instance(status: InstanceStatus) -> ProvisionedInstance {
    let running = status == InstanceStatus::Running;
    ProvisionedInstance {
        instance_id: INSTANCE_ID.to_string(),
        private_ip: Some(PRIVATE_IP.to_string()),
        public_ip: running.then(|| PUBLIC_IP.to_string()),
        public_dns_name: running.then(|| PUBLIC_DNS.to_string()),
        status,
    }
}

impl ComputeProvider for ScriptedCompute {
    async fn create_network_interface(
        &self,
        subnet: &str,
        security_groups: &[String],
    ) -> Result<NetworkInterface> {
        self.record(format!(
            "create_network_interface {subnet} {}",
            security_groups.join(",")
        ));
        Ok(NetworkInterface {
            id: INTERFACE_ID.to_string(),
        })
    }

    async fn allocate_address(&self) -> Result<AddressAllocation> {
        self.record("allocate_address".to_string());
        Ok(AddressAllocation {
            allocation_id: ALLOCATION_ID.to_string(),
            public_ip: PUBLIC_IP.to_string(),
        })
    }

    async fn associate_address(
        &self,
        allocation: &AddressAllocation,
        interface: &NetworkInterface,
    ) -> Result<()> {
        self.record(format!(
            "associate_address {} {}",
            allocation.allocation_id, interface.id
        ));
        Ok(())
    }

    async fn launch_instance(&self, spec: &LaunchSpec) -> Result<ProvisionedInstance> {
        self.record("launch_instance".to_string());
        if self.fail_launch {
            anyhow::bail!("InsufficientInstanceCapacity");
        }
        *self.launched.lock().expect("lock") = Some(spec.clone());
        Ok(ProvisionedInstance {
            private_ip: None,
            ..instance(InstanceStatus::Pending)
        })
    }

    async fn describe_instance(&self, instance_id: &str) -> Result<ProvisionedInstance> {
        self.record(format!("describe_instance {instance_id}"));
        let next = self
            .script
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match next {
            Describe::Status(status) => Ok(instance(status)),
            Describe::Fail => anyhow::bail!("RequestLimitExceeded"),
        }
    }

    async fn add_tag(&self, instance_id: &str, key: &str, value: &str) -> Result<()> {
        self.record(format!("add_tag {instance_id} {key}={value}"));
        if self.fail_tag {
            anyhow::bail!("UnauthorizedOperation");
        }
        Ok(())
    }
}

// ── Mock: DNS ─────────────────────────────────────────────────────────────────

/// `DnsProvider` that records every record; fails for `fail_zone`.
#[derive(Default)]
pub struct RecordingDns {
    pub records: Mutex<Vec<DnsRecord>>,
    pub fail_zone: Option<String>,
}

impl RecordingDns {
    pub fn failing_for(zone: &str) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail_zone: Some(zone.to_string()),
        }
    }

    pub fn records(&self) -> Vec<DnsRecord> {
        self.records.lock().expect("lock").clone()
    }
}

impl DnsProvider for RecordingDns {
    async fn create_record(&self, record: &DnsRecord) -> Result<()> {
        if self.fail_zone.as_deref() == Some(record.zone.as_str()) {
            anyhow::bail!("hosted zone {} not found", record.zone);
        }
        self.records.lock().expect("lock").push(record.clone());
        Ok(())
    }
}

// ── Mock: descriptor writer ───────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingWriter {
    pub writes: Mutex<Vec<(PathBuf, String)>>,
}

impl RecordingWriter {
    pub fn writes(&self) -> Vec<(PathBuf, String)> {
        self.writes.lock().expect("lock").clone()
    }
}

impl DescriptorWriter for RecordingWriter {
    async fn write_descriptor(&self, path: &Path, contents: &str) -> Result<()> {
        self.writes
            .lock()
            .expect("lock")
            .push((path.to_path_buf(), contents.to_string()));
        Ok(())
    }
}

// ── Mock: progress reporter ──────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingReporter {
    pub events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("lock").clone()
    }

    fn push(&self, event: String) {
        self.events.lock().expect("lock").push(event);
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.push(format!("success: {message}"));
    }
    fn warn(&self, message: &str) {
        self.push(format!("warn: {message}"));
    }
    fn wait_started(&self, message: &str) {
        self.push(format!("wait: {message}"));
    }
    fn wait_finished(&self, ok: bool, message: &str) {
        self.push(format!("done({ok}): {message}"));
    }
}

// ── Mock: command runner ──────────────────────────────────────────────────────

/// Shared view of the argv lists a [`MockCommandRunner`] received.
pub type CallLog = Arc<Mutex<Vec<Vec<String>>>>;

/// `CommandRunner` that returns canned outputs in order and records argv.
pub struct MockCommandRunner {
    calls: CallLog,
    outputs: Mutex<VecDeque<Output>>,
}

impl MockCommandRunner {
    /// The runner plus a handle on its call log, which stays readable after
    /// the runner is moved into an adapter.
    pub fn new(outputs: Vec<Output>) -> (Self, CallLog) {
        let calls = CallLog::default();
        let runner = Self {
            calls: Arc::clone(&calls),
            outputs: Mutex::new(outputs.into()),
        };
        (runner, calls)
    }
}

impl CommandRunner for MockCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        let mut argv = vec![program.to_string()];
        argv.extend(args.iter().map(ToString::to_string));
        self.calls.lock().expect("lock").push(argv);
        self.outputs
            .lock()
            .expect("lock")
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("unexpected command: {program} {}", args.join(" ")))
    }
}
