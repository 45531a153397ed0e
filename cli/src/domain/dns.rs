//! DNS record value type.

/// TTL applied to every record we create, in seconds.
pub const DEFAULT_TTL: u32 = 300;

/// A single resource record to create in a hosted zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Hosted zone name, e.g. `priv.example.com`.
    pub zone: String,
    /// Record label inside the zone, e.g. `db1`.
    pub name: String,
    pub record_type: String,
    pub value: String,
    pub ttl: u32,
    pub comment: String,
}

impl DnsRecord {
    /// An `A` record with the default TTL and no comment.
    #[must_use]
    pub fn a(zone: &str, name: &str, address: &str) -> Self {
        Self {
            zone: zone.to_string(),
            name: name.to_string(),
            record_type: "A".to_string(),
            value: address.to_string(),
            ttl: DEFAULT_TTL,
            comment: String::new(),
        }
    }

    /// Fully qualified record name.
    #[must_use]
    pub fn fqdn(&self) -> String {
        format!("{}.{}", self.name, self.zone)
    }
}
