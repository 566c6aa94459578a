//! Runtime client identity type.
//!
//! The identity is rebuilt from the forwarded certificate headers on every
//! request and never outlives the response it was built for.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Identity of a client whose certificate was verified by the front proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientIdentity {
    /// Whether the proxy reported a successful certificate verification.
    pub verified: bool,
    /// Subject distinguished name, as forwarded.
    pub subject_dn: Option<String>,
    /// Issuer distinguished name, as forwarded.
    pub issuer_dn: Option<String>,
    /// Certificate serial, in whatever encoding the proxy uses.
    pub serial: Option<String>,
    /// Certificate fingerprint, in whatever encoding the proxy uses.
    pub fingerprint: Option<String>,
    /// First `CN=` attribute of the subject DN.
    pub common_name: Option<String>,
}

impl ClientIdentity {
    /// Build a verified identity from the raw certificate attributes.
    ///
    /// The common name is derived from `subject_dn`.
    pub fn from_certificate(
        subject_dn: Option<String>,
        issuer_dn: Option<String>,
        serial: Option<String>,
        fingerprint: Option<String>,
    ) -> Self {
        let common_name = common_name_from_dn(subject_dn.as_deref());

        Self {
            verified: true,
            subject_dn,
            issuer_dn,
            serial,
            fingerprint,
            common_name,
        }
    }

    /// Name used to greet the client: the common name, then the full subject DN,
    /// then `"Unknown"`.
    pub fn display_name(&self) -> &str {
        self.common_name
            .as_deref()
            .or(self.subject_dn.as_deref())
            .unwrap_or("Unknown")
    }
}

/// Extract the first `CN=` value from a distinguished name.
///
/// This is a plain substring match: the value runs up to the next comma, escaped
/// commas are not recognized, and only the first `CN=` counts.
pub fn common_name_from_dn(dn: Option<&str>) -> Option<String> {
    static CN_PATTERN: OnceLock<Regex> = OnceLock::new();

    let dn = dn.filter(|dn| !dn.is_empty())?;
    let pattern = CN_PATTERN.get_or_init(|| Regex::new("CN=([^,]+)").expect("CN pattern should be valid"));

    pattern
        .captures(dn)
        .and_then(|captures| captures.get(1))
        .map(|value| value.as_str().to_owned())
}
