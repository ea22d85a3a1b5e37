//! Site variants and host classification.
//!
//! One deployment serves several variants, each on its own subdomain:
//! `www.<domain>` (or the bare domain) is the landing page, `faculty.`,
//! `terms.` and `privacy.` are the others. Local hosts pick the variant from
//! a `?subdomain=` query parameter instead.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Hosts that select the variant by query parameter.
const LOCAL_HOSTS: &[&str] = &["localhost", "127.0.0.1"];

/// A site variant, selected by subdomain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SiteVariant {
    Main,
    Faculty,
    Terms,
    Privacy,
    /// A subdomain with no page behind it
    Unknown(String),
}

impl SiteVariant {
    /// The variants that have pages.
    pub const KNOWN: [SiteVariant; 4] = [
        SiteVariant::Main,
        SiteVariant::Faculty,
        SiteVariant::Terms,
        SiteVariant::Privacy,
    ];

    /// Parse a variant name. Empty names and `www` mean [`SiteVariant::Main`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "main" | "www" => Self::Main,
            "faculty" => Self::Faculty,
            "terms" => Self::Terms,
            "privacy" => Self::Privacy,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Classify a request by its `Host` header and `subdomain` query value.
    pub fn classify(host: &str, subdomain_query: Option<&str>) -> Self {
        let hostname = strip_port(host).to_ascii_lowercase();

        if LOCAL_HOSTS.contains(&hostname.as_str()) {
            return subdomain_query.map(Self::from_name).unwrap_or(Self::Main);
        }

        let labels: Vec<&str> = hostname.split('.').collect();
        if labels.len() <= 2 {
            return Self::Main;
        }

        Self::from_name(labels[0])
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Main => "main",
            Self::Faculty => "faculty",
            Self::Terms => "terms",
            Self::Privacy => "privacy",
            Self::Unknown(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Public URL of this variant. With a dev port, the local URL instead.
    pub fn url(&self, domain: &str, dev_port: Option<u16>) -> String {
        if let Some(port) = dev_port {
            return format!("http://localhost:{}?subdomain={}", port, self.as_str());
        }

        match self {
            Self::Main => format!("https://www.{}", domain),
            other => format!("https://{}.{}", other.as_str(), domain),
        }
    }
}

/// Drop a trailing `:port` from a host, leaving bracketed IPv6 hosts alone.
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return host;
    }
    host.split(':').next().unwrap_or(host)
}

impl fmt::Display for SiteVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for SiteVariant {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<SiteVariant> for String {
    fn from(variant: SiteVariant) -> Self {
        variant.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn local_hosts_use_query() {
        assert_eq!(
            SiteVariant::classify("localhost:5173", None),
            SiteVariant::Main
        );
        assert_eq!(
            SiteVariant::classify("localhost:5173", Some("faculty")),
            SiteVariant::Faculty
        );
        assert_eq!(
            SiteVariant::classify("127.0.0.1", Some("privacy")),
            SiteVariant::Privacy
        );
        assert_eq!(
            SiteVariant::classify("localhost", Some("")),
            SiteVariant::Main
        );
    }

    #[test]
    fn production_hosts_use_first_label() {
        assert_eq!(
            SiteVariant::classify("jrmsu-gcare.com", None),
            SiteVariant::Main
        );
        assert_eq!(
            SiteVariant::classify("www.jrmsu-gcare.com", None),
            SiteVariant::Main
        );
        assert_eq!(
            SiteVariant::classify("terms.jrmsu-gcare.com", Some("privacy")),
            SiteVariant::Terms
        );
        assert_eq!(
            SiteVariant::classify("Blog.JRMSU-gcare.com:443", None),
            SiteVariant::Unknown("blog".to_string())
        );
    }

    #[test]
    fn urls_round_trip_through_classify() {
        for variant in SiteVariant::KNOWN {
            let url = variant.url("jrmsu-gcare.com", None);
            let host = url.trim_start_matches("https://");
            assert_eq!(SiteVariant::classify(host, None), variant);
        }

        assert_eq!(
            SiteVariant::Terms.url("jrmsu-gcare.com", Some(5173)),
            "http://localhost:5173?subdomain=terms"
        );
        assert_eq!(
            SiteVariant::Main.url("jrmsu-gcare.com", None),
            "https://www.jrmsu-gcare.com"
        );
    }

    #[test]
    fn deserializes_from_name() {
        #[derive(Deserialize)]
        struct Page {
            variant: SiteVariant,
        }

        let page: Page = toml::from_str("variant = \"terms\"").unwrap();
        assert_eq!(page.variant, SiteVariant::Terms);

        let page: Page = toml::from_str("variant = \"news\"").unwrap();
        assert!(!page.variant.is_known());
    }
}
