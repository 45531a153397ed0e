//! Tests for the `InstanceProvisioner` application service.
//!
//! Every port is mocked; assertions are on the calls each mock recorded.

#![allow(clippy::expect_used)]

use std::path::PathBuf;
use std::time::Duration;

use ec2_provision::application::services::poll::PollPolicy;
use ec2_provision::application::services::provision::{InstanceProvisioner, ProvisionOutcome};
use ec2_provision::domain::config::EffectiveConfig;
use ec2_provision::domain::error::{PostLaunchStep, ProvisionError};
use ec2_provision::domain::instance::InstanceStatus;

use crate::helpers::{db1_config, private_config, settings};
use crate::mocks::{
    ALLOCATION_ID, Describe, INSTANCE_ID, INTERFACE_ID, PRIVATE_IP, PUBLIC_DNS, PUBLIC_IP,
    RecordingDns, RecordingReporter, RecordingWriter, ScriptedCompute,
};

fn fast_policy() -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(1),
        timeout: None,
        max_attempts: Some(10),
    }
}

struct Harness {
    compute: ScriptedCompute,
    dns: RecordingDns,
    writer: RecordingWriter,
    reporter: RecordingReporter,
}

impl Harness {
    fn new(compute: ScriptedCompute, dns: RecordingDns) -> Self {
        Self {
            compute,
            dns,
            writer: RecordingWriter::default(),
            reporter: RecordingReporter::default(),
        }
    }

    async fn run(&self, config: &EffectiveConfig) -> anyhow::Result<ProvisionOutcome> {
        let settings = settings();
        InstanceProvisioner::new(
            &self.compute,
            &self.dns,
            &self.writer,
            &self.reporter,
            &settings,
            fast_policy(),
        )
        .run(config)
        .await
    }
}

fn post_launch_step(err: &anyhow::Error) -> Option<(PostLaunchStep, String)> {
    err.chain().find_map(|e| match e.downcast_ref::<ProvisionError>() {
        Some(ProvisionError::PostLaunch {
            step, instance_id, ..
        }) => Some((*step, instance_id.clone())),
        None => None,
    })
}

// ── Happy path ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_public_host_end_to_end() {
    let h = Harness::new(ScriptedCompute::starts_normally(), RecordingDns::default());

    let outcome = h.run(&db1_config()).await.expect("run");

    let ProvisionOutcome::Ready(report) = outcome else {
        panic!("expected Ready, got {outcome:?}");
    };
    assert_eq!(report.instance_id, INSTANCE_ID);
    assert_eq!(report.private_ip, PRIVATE_IP);
    assert_eq!(report.public_ip.as_deref(), Some(PUBLIC_IP));
    assert_eq!(report.public_dns_name.as_deref(), Some(PUBLIC_DNS));
    assert_eq!(
        report.dns_records,
        vec!["db1.priv.example.com", "db1.pub.example.com"]
    );

    assert_eq!(
        h.compute.calls(),
        vec![
            "create_network_interface subnet-0a sg-db".to_string(),
            "allocate_address".to_string(),
            format!("associate_address {ALLOCATION_ID} {INTERFACE_ID}"),
            "launch_instance".to_string(),
            format!("describe_instance {INSTANCE_ID}"),
            format!("describe_instance {INSTANCE_ID}"),
            format!("add_tag {INSTANCE_ID} Name=db1"),
        ]
    );

    let records = h.dns.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].zone, "priv.example.com");
    assert_eq!(records[0].value, PRIVATE_IP);
    assert_eq!(records[1].zone, "pub.example.com");
    assert_eq!(records[1].value, PUBLIC_IP);
    assert!(records.iter().all(|r| r.record_type == "A" && r.ttl == 300));

    let writes = h.writer.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(
        writes[0].0,
        PathBuf::from("/srv/hiera/hosts/db1.priv.example.com.yaml")
    );
    assert_eq!(
        writes[0].1,
        "roles:\n- db\nmysql::server::root_password: secret\n"
    );
}

#[tokio::test]
async fn test_launch_uses_merged_settings_and_user_data() {
    let h = Harness::new(ScriptedCompute::starts_normally(), RecordingDns::default());
    h.run(&db1_config()).await.expect("run");

    let spec = h
        .compute
        .launched
        .lock()
        .expect("lock")
        .clone()
        .expect("launched");
    assert_eq!(spec.image_id, "ami-0db1");
    assert_eq!(spec.key_name, "ops");
    assert_eq!(spec.instance_type, "m5.large");
    assert!(spec.ebs_optimized);
    assert_eq!(spec.block_devices[0].volume_size_gib, 100);
    assert_eq!(spec.network_interfaces[0].network_interface_id, INTERFACE_ID);
    assert!(spec.user_data.contains("hostname: db1\n"));
    assert!(spec.user_data.contains("fqdn: db1.priv.example.com\n"));
    assert!(spec.user_data.contains("Content-Type: text/x-shellscript"));
}

#[tokio::test]
async fn test_private_host_skips_public_address_and_record() {
    let h = Harness::new(ScriptedCompute::starts_normally(), RecordingDns::default());

    let outcome = h.run(&private_config()).await.expect("run");

    let ProvisionOutcome::Ready(report) = outcome else {
        panic!("expected Ready, got {outcome:?}");
    };
    assert!(report.public_ip.is_none());
    assert_eq!(report.dns_records, vec!["db1.priv.example.com"]);
    assert!(
        !h.compute
            .calls()
            .iter()
            .any(|c| c.contains("allocate_address") || c.contains("associate_address"))
    );
    assert_eq!(h.dns.records().len(), 1);
}

#[tokio::test]
async fn test_reporter_sees_each_stage_in_order() {
    let h = Harness::new(ScriptedCompute::starts_normally(), RecordingDns::default());
    h.run(&db1_config()).await.expect("run");

    let events = h.reporter.events();
    let position = |needle: &str| {
        events
            .iter()
            .position(|e| e.contains(needle))
            .unwrap_or_else(|| panic!("missing {needle} in {events:?}"))
    };
    assert!(position("creating network interface") < position("allocating public address"));
    assert!(position("allocating public address") < position("launching instance"));
    assert!(position("launching instance") < position("waiting for instance"));
    assert!(position("done(true)") < position("creating DNS records"));
    assert!(position("writing host descriptor") < position("host registered"));
}

// ── Instance never runs ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_terminal_status_skips_registration() {
    let compute = ScriptedCompute::new(
        vec![Describe::Status(InstanceStatus::Pending)],
        Describe::Status(InstanceStatus::Terminated),
    );
    let h = Harness::new(compute, RecordingDns::default());

    let outcome = h.run(&db1_config()).await.expect("run");

    match outcome {
        ProvisionOutcome::NotRunning {
            instance_id,
            last_status,
            exhausted,
        } => {
            assert_eq!(instance_id, INSTANCE_ID);
            assert_eq!(last_status, Some(InstanceStatus::Terminated));
            assert!(!exhausted);
        }
        ProvisionOutcome::Ready(_) => panic!("expected NotRunning"),
    }
    assert_eq!(h.compute.describe_count(), 2);
    assert!(h.dns.records().is_empty());
    assert!(h.writer.writes().is_empty());
    assert!(!h.compute.calls().iter().any(|c| c.starts_with("add_tag")));
    assert!(
        h.reporter
            .events()
            .contains(&"done(false): instance status: terminated".to_string())
    );
}

#[tokio::test]
async fn test_error_status_fails_after_retry_bound() {
    let compute = ScriptedCompute::new(
        Vec::new(),
        Describe::Status(InstanceStatus::Other("error".to_string())),
    );
    let h = Harness::new(compute, RecordingDns::default());

    let outcome = h.run(&db1_config()).await.expect("run");

    assert!(!outcome.is_ready());
    assert_eq!(h.compute.describe_count(), 10);
    assert!(h.dns.records().is_empty());
    assert!(
        h.reporter
            .events()
            .iter()
            .any(|e| e.starts_with("warn: gave up waiting"))
    );
}

// ── Failures ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_launch_failure_is_not_post_launch() {
    let h = Harness::new(
        ScriptedCompute::starts_normally().failing_launch(),
        RecordingDns::default(),
    );

    let err = h.run(&db1_config()).await.expect_err("launch fails");

    assert!(post_launch_step(&err).is_none(), "got: {err:#}");
    assert!(format!("{err:#}").contains("launching instance"), "got: {err:#}");
    assert_eq!(h.compute.describe_count(), 0);
}

#[tokio::test]
async fn test_public_dns_failure_is_post_launch() {
    let h = Harness::new(
        ScriptedCompute::starts_normally(),
        RecordingDns::failing_for("pub.example.com"),
    );

    let err = h.run(&db1_config()).await.expect_err("dns fails");

    assert_eq!(
        post_launch_step(&err),
        Some((PostLaunchStep::PublicDnsRecord, INSTANCE_ID.to_string()))
    );
    assert_eq!(h.dns.records().len(), 1, "private record stays in place");
    assert!(h.writer.writes().is_empty());
    assert!(!h.compute.calls().iter().any(|c| c.starts_with("add_tag")));
}

#[tokio::test]
async fn test_tag_failure_is_post_launch_after_descriptor() {
    let h = Harness::new(
        ScriptedCompute::starts_normally().failing_tag(),
        RecordingDns::default(),
    );

    let err = h.run(&db1_config()).await.expect_err("tag fails");

    assert_eq!(
        post_launch_step(&err),
        Some((PostLaunchStep::NameTag, INSTANCE_ID.to_string()))
    );
    assert_eq!(h.writer.writes().len(), 1);
}
