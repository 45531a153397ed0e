//! Infrastructure implementation of the compute and DNS ports.
//!
//! `AwsCli<R>` routes every EC2 and Route53 call through the `aws` command
//! line client via a `CommandRunner`, with `--output json` responses parsed
//! into serde structs.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};

use crate::application::ports::{CommandRunner, ComputeProvider, DnsProvider};
use crate::domain::dns::DnsRecord;
use crate::domain::error::ProviderError;
use crate::domain::instance::{
    AddressAllocation, InstanceStatus, LaunchSpec, NetworkInterface, ProvisionedInstance,
};

/// The AWS command line client.
pub const AWS_PROGRAM: &str = "aws";

/// Adapter that drives EC2 and Route53 through the `aws` CLI.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without spawning real processes.
pub struct AwsCli<R: CommandRunner> {
    runner: R,
    region: String,
}

impl<R: CommandRunner> AwsCli<R> {
    /// Create an adapter bound to `region`.
    pub fn new(runner: R, region: impl Into<String>) -> Self {
        Self {
            runner,
            region: region.into(),
        }
    }

    /// Run `aws <service> <operation> <args…>` and return its stdout.
    async fn invoke(&self, service: &str, operation: &str, args: &[&str]) -> Result<Vec<u8>> {
        let mut full = vec![service, operation];
        full.extend_from_slice(args);
        full.extend_from_slice(&["--region", self.region.as_str(), "--output", "json"]);

        let command = format!("{service} {operation}");
        tracing::debug!(%command, region = %self.region, "invoking aws cli");
        let output = self
            .runner
            .run(AWS_PROGRAM, &full)
            .await
            .with_context(|| format!("aws {command}"))?;
        if !output.status.success() {
            return Err(ProviderError::CommandFailed {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(output.stdout)
    }

    /// Like [`Self::invoke`] but parses the JSON response.
    async fn call<T: DeserializeOwned>(
        &self,
        service: &str,
        operation: &str,
        args: &[&str],
    ) -> Result<T> {
        let stdout = self.invoke(service, operation, args).await?;
        serde_json::from_slice(&stdout).map_err(|source| {
            ProviderError::BadResponse {
                command: format!("{service} {operation}"),
                source,
            }
            .into()
        })
    }

    async fn hosted_zone_id(&self, zone: &str) -> Result<String> {
        let response: HostedZonesResponse = self
            .call(
                "route53",
                "list-hosted-zones-by-name",
                &["--dns-name", zone, "--max-items", "1"],
            )
            .await?;
        let wanted = zone.trim_end_matches('.');
        response
            .hosted_zones
            .into_iter()
            .find(|z| z.name.trim_end_matches('.') == wanted)
            .map(|z| z.id.trim_start_matches("/hostedzone/").to_string())
            .ok_or_else(|| ProviderError::ZoneNotFound(zone.to_string()).into())
    }
}

impl<R: CommandRunner> ComputeProvider for AwsCli<R> {
    async fn create_network_interface(
        &self,
        subnet: &str,
        security_groups: &[String],
    ) -> Result<NetworkInterface> {
        let mut args = vec!["--subnet-id", subnet];
        if !security_groups.is_empty() {
            args.push("--groups");
            args.extend(security_groups.iter().map(String::as_str));
        }
        let response: CreateNetworkInterfaceResponse = self
            .call("ec2", "create-network-interface", &args)
            .await?;
        Ok(NetworkInterface {
            id: response.network_interface.network_interface_id,
        })
    }

    async fn allocate_address(&self) -> Result<AddressAllocation> {
        let response: AllocateAddressResponse = self
            .call("ec2", "allocate-address", &["--domain", "vpc"])
            .await?;
        Ok(AddressAllocation {
            allocation_id: response.allocation_id,
            public_ip: response.public_ip,
        })
    }

    async fn associate_address(
        &self,
        allocation: &AddressAllocation,
        interface: &NetworkInterface,
    ) -> Result<()> {
        let _: IgnoredAny = self
            .call(
                "ec2",
                "associate-address",
                &[
                    "--allocation-id",
                    &allocation.allocation_id,
                    "--network-interface-id",
                    &interface.id,
                ],
            )
            .await?;
        Ok(())
    }

    async fn launch_instance(&self, spec: &LaunchSpec) -> Result<ProvisionedInstance> {
        let args = run_instances_args(spec);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let response: RunInstancesResponse = self.call("ec2", "run-instances", &args).await?;
        response
            .instances
            .into_iter()
            .next()
            .map(InstanceDescription::into_instance)
            .ok_or_else(|| {
                ProviderError::MissingInstance {
                    command: "ec2 run-instances".to_string(),
                }
                .into()
            })
    }

    async fn describe_instance(&self, instance_id: &str) -> Result<ProvisionedInstance> {
        let response: DescribeInstancesResponse = self
            .call("ec2", "describe-instances", &["--instance-ids", instance_id])
            .await?;
        response
            .reservations
            .into_iter()
            .flat_map(|r| r.instances)
            .next()
            .map(InstanceDescription::into_instance)
            .ok_or_else(|| {
                ProviderError::MissingInstance {
                    command: "ec2 describe-instances".to_string(),
                }
                .into()
            })
    }

    async fn add_tag(&self, instance_id: &str, key: &str, value: &str) -> Result<()> {
        let tag = format!("Key={key},Value={value}");
        self.invoke(
            "ec2",
            "create-tags",
            &["--resources", instance_id, "--tags", &tag],
        )
        .await?;
        Ok(())
    }
}

impl<R: CommandRunner> DnsProvider for AwsCli<R> {
    async fn create_record(&self, record: &DnsRecord) -> Result<()> {
        let zone_id = self.hosted_zone_id(&record.zone).await?;
        let batch = change_batch(record).to_string();
        let _: IgnoredAny = self
            .call(
                "route53",
                "change-resource-record-sets",
                &["--hosted-zone-id", &zone_id, "--change-batch", &batch],
            )
            .await?;
        Ok(())
    }
}

// ── Request builders ──────────────────────────────────────────────────────────

/// Arguments for `aws ec2 run-instances`.
#[must_use]
pub fn run_instances_args(spec: &LaunchSpec) -> Vec<String> {
    let interfaces: Vec<serde_json::Value> = spec
        .network_interfaces
        .iter()
        .map(|nic| {
            serde_json::json!({
                "NetworkInterfaceId": nic.network_interface_id,
                "DeviceIndex": nic.device_index,
            })
        })
        .collect();
    let block_devices: Vec<serde_json::Value> = spec
        .block_devices
        .iter()
        .map(|dev| {
            serde_json::json!({
                "DeviceName": dev.device_name,
                "Ebs": {
                    "VolumeSize": dev.volume_size_gib,
                    "VolumeType": dev.volume_type,
                    "DeleteOnTermination": dev.delete_on_termination,
                },
            })
        })
        .collect();

    vec![
        "--image-id".to_string(),
        spec.image_id.clone(),
        "--key-name".to_string(),
        spec.key_name.clone(),
        "--instance-type".to_string(),
        spec.instance_type.clone(),
        "--count".to_string(),
        "1".to_string(),
        "--user-data".to_string(),
        spec.user_data.clone(),
        "--monitoring".to_string(),
        format!("Enabled={}", spec.monitoring),
        if spec.disable_api_termination {
            "--disable-api-termination"
        } else {
            "--enable-api-termination"
        }
        .to_string(),
        "--instance-initiated-shutdown-behavior".to_string(),
        spec.shutdown_behavior.clone(),
        "--placement".to_string(),
        format!("Tenancy={}", spec.tenancy),
        if spec.ebs_optimized {
            "--ebs-optimized"
        } else {
            "--no-ebs-optimized"
        }
        .to_string(),
        "--network-interfaces".to_string(),
        serde_json::Value::Array(interfaces).to_string(),
        "--block-device-mappings".to_string(),
        serde_json::Value::Array(block_devices).to_string(),
    ]
}

/// Route53 change batch creating `record`.
#[must_use]
pub fn change_batch(record: &DnsRecord) -> serde_json::Value {
    let mut batch = serde_json::json!({
        "Changes": [{
            "Action": "CREATE",
            "ResourceRecordSet": {
                "Name": record.fqdn(),
                "Type": record.record_type,
                "TTL": record.ttl,
                "ResourceRecords": [{ "Value": record.value }],
            },
        }],
    });
    if !record.comment.is_empty() {
        batch["Comment"] = serde_json::Value::from(record.comment.as_str());
    }
    batch
}

// ── Response shapes ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateNetworkInterfaceResponse {
    network_interface: NetworkInterfaceDescription,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NetworkInterfaceDescription {
    network_interface_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AllocateAddressResponse {
    allocation_id: String,
    public_ip: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RunInstancesResponse {
    #[serde(default)]
    instances: Vec<InstanceDescription>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeInstancesResponse {
    #[serde(default)]
    reservations: Vec<Reservation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Reservation {
    #[serde(default)]
    instances: Vec<InstanceDescription>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstanceDescription {
    instance_id: String,
    #[serde(default)]
    private_ip_address: Option<String>,
    #[serde(default)]
    public_ip_address: Option<String>,
    #[serde(default)]
    public_dns_name: Option<String>,
    state: InstanceStateDescription,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstanceStateDescription {
    name: String,
}

impl InstanceDescription {
    fn into_instance(self) -> ProvisionedInstance {
        ProvisionedInstance {
            instance_id: self.instance_id,
            private_ip: self.private_ip_address,
            public_ip: self.public_ip_address,
            public_dns_name: self.public_dns_name.filter(|name| !name.is_empty()),
            status: InstanceStatus::parse(&self.state.name),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HostedZonesResponse {
    #[serde(default)]
    hosted_zones: Vec<HostedZone>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HostedZone {
    id: String,
    name: String,
}
