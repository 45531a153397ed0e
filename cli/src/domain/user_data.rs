//! EC2 user data: cloud-config rendering and the multipart MIME envelope.
//!
//! cloud-init accepts a `multipart/mixed` document whose parts are routed by
//! content type. We ship two parts: the rendered cloud-config and the user
//! script.

use uuid::Uuid;

use crate::domain::config::EffectiveConfig;
use crate::domain::settings::Settings;

/// Values substituted into the cloud-config template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloudConfigParams<'a> {
    pub hostname: &'a str,
    pub public_domain: &'a str,
    pub private_domain: &'a str,
}

impl<'a> CloudConfigParams<'a> {
    #[must_use]
    pub fn from_config(config: &'a EffectiveConfig) -> Self {
        Self {
            hostname: &config.hostname,
            public_domain: &config.route53.public_domain,
            private_domain: &config.route53.private_domain,
        }
    }

    /// Match a placeholder at the start of `tail` (the text after a `$`).
    fn lookup(&self, tail: &str) -> Option<(usize, &'a str)> {
        [
            ("HOSTNAME", self.hostname),
            ("PUBLIC_DOMAIN", self.public_domain),
            ("PRIVATE_DOMAIN", self.private_domain),
        ]
        .into_iter()
        .find(|(token, _)| tail.starts_with(token))
        .map(|(token, value)| (token.len(), value))
    }
}

/// Render the cloud-config template in a single pass.
///
/// Substituted values are never rescanned, so a hostname containing `$` can
/// not expand into another placeholder. Unknown `$` sequences are kept.
#[must_use]
pub fn render_cloud_config(template: &str, params: &CloudConfigParams<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        if let Some((len, value)) = params.lookup(tail) {
            out.push_str(value);
            rest = &tail[len..];
        } else {
            out.push('$');
            rest = tail;
        }
    }
    out.push_str(rest);
    out
}

// ── MIME envelope ─────────────────────────────────────────────────────────────

/// One attachment of the user-data document.
#[derive(Debug, Clone, Copy)]
pub struct UserDataPart<'a> {
    /// MIME subtype under `text/`, e.g. `cloud-config`.
    pub subtype: &'a str,
    pub filename: &'a str,
    pub body: &'a str,
}

/// Generate a fresh multipart boundary.
#[must_use]
pub fn new_boundary() -> String {
    format!("==============={}==", Uuid::new_v4().simple())
}

/// Assemble a `multipart/mixed` document from the given parts.
#[must_use]
pub fn multipart_document(parts: &[UserDataPart<'_>], boundary: &str) -> String {
    let mut doc = format!(
        "Content-Type: multipart/mixed; boundary=\"{boundary}\"\nMIME-Version: 1.0\n\n"
    );
    for part in parts {
        let (charset, encoding) = if part.body.is_ascii() {
            ("us-ascii", "7bit")
        } else {
            ("utf-8", "8bit")
        };
        doc.push_str(&format!("--{boundary}\n"));
        doc.push_str(&format!(
            "Content-Type: text/{}; charset=\"{charset}\"\n",
            part.subtype
        ));
        doc.push_str("MIME-Version: 1.0\n");
        doc.push_str(&format!("Content-Transfer-Encoding: {encoding}\n"));
        doc.push_str(&format!(
            "Content-Disposition: attachment; filename=\"{}\"\n\n",
            part.filename
        ));
        doc.push_str(part.body);
        if !part.body.ends_with('\n') {
            doc.push('\n');
        }
    }
    doc.push_str(&format!("--{boundary}--\n"));
    doc
}

/// Build the complete user-data payload for one host.
#[must_use]
pub fn build_user_data(settings: &Settings, config: &EffectiveConfig, boundary: &str) -> String {
    let cloud_config =
        render_cloud_config(&settings.cloud_config, &CloudConfigParams::from_config(config));
    multipart_document(
        &[
            UserDataPart {
                subtype: "cloud-config",
                filename: "cloud-config.txt",
                body: &cloud_config,
            },
            UserDataPart {
                subtype: "x-shellscript",
                filename: "user-script.txt",
                body: &settings.user_script,
            },
        ],
        boundary,
    )
}
