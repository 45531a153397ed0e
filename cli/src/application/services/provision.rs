//! Application service: the provisioning sequence for one host.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.
//!
//! Side effects are ordered and non-transactional: nothing is rolled back
//! when a later step fails.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::ports::{
    ComputeProvider, DescriptorWriter, DnsProvider, ProgressReporter,
};
use crate::application::services::poll::{PollOutcome, PollPolicy, wait_until_running};
use crate::domain::config::EffectiveConfig;
use crate::domain::descriptor;
use crate::domain::dns::DnsRecord;
use crate::domain::error::{PostLaunchStep, ProvisionError};
use crate::domain::instance::{
    AddressAllocation, InstanceStatus, LaunchSpec, ProvisionedInstance,
};
use crate::domain::settings::Settings;
use crate::domain::user_data::{build_user_data, new_boundary};

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionReport {
    pub hostname: String,
    pub instance_id: String,
    pub private_ip: String,
    pub public_ip: Option<String>,
    pub public_dns_name: Option<String>,
    /// Fully qualified names of the DNS records created.
    pub dns_records: Vec<String>,
    pub descriptor_path: PathBuf,
    pub provisioned_at: DateTime<Utc>,
}

/// Outcome of [`InstanceProvisioner::run`].
#[derive(Debug)]
pub enum ProvisionOutcome {
    /// The instance is running, registered in DNS, described and tagged.
    Ready(ProvisionReport),
    /// The instance never reached `running`; nothing after launch was done.
    NotRunning {
        instance_id: String,
        last_status: Option<InstanceStatus>,
        exhausted: bool,
    },
}

impl ProvisionOutcome {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Drives compute, DNS and the descriptor writer through the provisioning
/// sequence, exactly once per run.
pub struct InstanceProvisioner<'a, C, D, W, R> {
    compute: &'a C,
    dns: &'a D,
    writer: &'a W,
    reporter: &'a R,
    settings: &'a Settings,
    policy: PollPolicy,
}

impl<'a, C, D, W, R> InstanceProvisioner<'a, C, D, W, R>
where
    C: ComputeProvider,
    D: DnsProvider,
    W: DescriptorWriter,
    R: ProgressReporter,
{
    pub fn new(
        compute: &'a C,
        dns: &'a D,
        writer: &'a W,
        reporter: &'a R,
        settings: &'a Settings,
        policy: PollPolicy,
    ) -> Self {
        Self {
            compute,
            dns,
            writer,
            reporter,
            settings,
            policy,
        }
    }

    /// Run the provisioning sequence.
    ///
    /// # Errors
    ///
    /// Errors before or during launch are returned with context. Errors after
    /// the instance reached `running` are wrapped in
    /// [`ProvisionError::PostLaunch`] because the instance already exists.
    pub async fn run(&self, config: &EffectiveConfig) -> Result<ProvisionOutcome> {
        let reporter = self.reporter;
        let user_data = build_user_data(self.settings, config, &new_boundary());

        // Step 1: Network interface.
        reporter.step("creating network interface...");
        let interface = self
            .compute
            .create_network_interface(&config.ec2.subnet, &config.ec2.security_groups)
            .await
            .context("creating network interface")?;
        tracing::info!(interface = %interface.id, subnet = %config.ec2.subnet, "network interface created");

        // Step 2: Public address.
        let address = if config.public {
            reporter.step("allocating public address...");
            let allocation = self
                .compute
                .allocate_address()
                .await
                .context("allocating public address")?;
            self.compute
                .associate_address(&allocation, &interface)
                .await
                .context("associating public address")?;
            tracing::info!(
                allocation = %allocation.allocation_id,
                public_ip = %allocation.public_ip,
                "public address associated"
            );
            Some(allocation)
        } else {
            None
        };

        // Step 3: Launch.
        reporter.step("launching instance...");
        let spec = LaunchSpec::for_host(config, &interface, user_data);
        let launched = self
            .compute
            .launch_instance(&spec)
            .await
            .context("launching instance")?;
        tracing::info!(instance_id = %launched.instance_id, "instance launched");
        reporter.success(&format!("instance {} launched", launched.instance_id));

        // Step 4: Wait for running.
        reporter.wait_started("waiting for instance to start...");
        let instance =
            match wait_until_running(self.compute, &launched.instance_id, &self.policy).await {
                PollOutcome::Running(instance) => {
                    reporter.wait_finished(true, "instance running");
                    instance
                }
                PollOutcome::Stalled {
                    last_status,
                    exhausted,
                } => {
                    let status = last_status
                        .as_ref()
                        .map_or("unknown", InstanceStatus::as_str);
                    reporter.wait_finished(false, &format!("instance status: {status}"));
                    if exhausted {
                        reporter.warn(&format!(
                            "gave up waiting; {} was left in place",
                            launched.instance_id
                        ));
                    }
                    return Ok(ProvisionOutcome::NotRunning {
                        instance_id: launched.instance_id,
                        last_status,
                        exhausted,
                    });
                }
            };

        // Step 5: Register the host.
        let report = self
            .register_host(config, &instance, address.as_ref())
            .await?;
        Ok(ProvisionOutcome::Ready(report))
    }

    /// DNS records, host descriptor and Name tag for a running instance.
    async fn register_host(
        &self,
        config: &EffectiveConfig,
        instance: &ProvisionedInstance,
        address: Option<&AddressAllocation>,
    ) -> Result<ProvisionReport> {
        let instance_id = instance.instance_id.as_str();
        let post_launch = |step: PostLaunchStep| {
            move |source: anyhow::Error| ProvisionError::PostLaunch {
                step,
                instance_id: instance_id.to_owned(),
                source,
            }
        };
        let mut dns_records = Vec::new();

        self.reporter.step("creating DNS records...");
        let private_ip = instance
            .private_ip
            .clone()
            .context("instance reported no private IP address")
            .map_err(post_launch(PostLaunchStep::PrivateDnsRecord))?;
        let private = DnsRecord::a(&config.route53.private_domain, &config.hostname, &private_ip);
        self.dns
            .create_record(&private)
            .await
            .map_err(post_launch(PostLaunchStep::PrivateDnsRecord))?;
        tracing::info!(record = %private.fqdn(), value = %private.value, "private DNS record created");
        dns_records.push(private.fqdn());

        let public_ip = address
            .map(|a| a.public_ip.clone())
            .or_else(|| instance.public_ip.clone());
        if config.public {
            let ip = public_ip
                .as_deref()
                .context("no public IP address for a public host")
                .map_err(post_launch(PostLaunchStep::PublicDnsRecord))?;
            let public = DnsRecord::a(&config.route53.public_domain, &config.hostname, ip);
            self.dns
                .create_record(&public)
                .await
                .map_err(post_launch(PostLaunchStep::PublicDnsRecord))?;
            tracing::info!(record = %public.fqdn(), value = %public.value, "public DNS record created");
            dns_records.push(public.fqdn());
        }

        self.reporter.step("writing host descriptor...");
        let descriptor_path = descriptor::path_for(&self.settings.hiera_host_path, config);
        let contents = descriptor::render(&config.puppet_roles, &config.hiera_data)
            .context("rendering host descriptor")
            .map_err(post_launch(PostLaunchStep::HostDescriptor))?;
        self.writer
            .write_descriptor(&descriptor_path, &contents)
            .await
            .map_err(post_launch(PostLaunchStep::HostDescriptor))?;
        tracing::info!(path = %descriptor_path.display(), "host descriptor written");

        self.compute
            .add_tag(instance_id, "Name", &config.hostname)
            .await
            .map_err(post_launch(PostLaunchStep::NameTag))?;
        self.reporter.success("host registered");

        Ok(ProvisionReport {
            hostname: config.hostname.clone(),
            instance_id: instance_id.to_owned(),
            private_ip,
            public_ip: if config.public { public_ip } else { None },
            public_dns_name: instance.public_dns_name.clone(),
            dns_records,
            descriptor_path,
            provisioned_at: Utc::now(),
        })
    }
}
