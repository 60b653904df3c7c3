//! Application bundles: immutable, named, versioned stacks a resource can
//! reference.

use chrono::{DateTime, Utc};
use semver::Version;
use serde::{Deserialize, Serialize};

/// Which kind of resource a bundle applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundleKind {
    ControlPlane,
    KubernetesCluster,
}

/// An opaque application reference; the core never interprets its contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationReference {
    pub name: String,
    pub version: String,
}

/// An immutable, named version of a deployable stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationBundle {
    pub name: String,
    pub version: String,
    pub kind: BundleKind,
    #[serde(default)]
    pub preview: bool,
    pub end_of_life: Option<DateTime<Utc>>,
    #[serde(default)]
    pub applications: Vec<ApplicationReference>,
}

impl ApplicationBundle {
    /// Parse `version` as semver. Bundles that fail to parse are excluded
    /// from catalogue construction; this is the parse step the
    /// catalogue calls to decide that.
    pub fn parsed_version(&self) -> Result<Version, semver::Error> {
        Version::parse(&self.version)
    }

    pub fn is_preview(&self) -> bool {
        self.preview
    }

    pub fn is_past_end_of_life(&self, now: DateTime<Utc>) -> bool {
        self.end_of_life.is_some_and(|eol| eol <= now)
    }

    pub fn has_end_of_life(&self) -> bool {
        self.end_of_life.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bundle(name: &str, version: &str, preview: bool, eol: Option<DateTime<Utc>>) -> ApplicationBundle {
        ApplicationBundle {
            name: name.to_string(),
            version: version.to_string(),
            kind: BundleKind::ControlPlane,
            preview,
            end_of_life: eol,
            applications: vec![],
        }
    }

    #[test]
    fn parses_valid_semver() {
        let b = bundle("v1.2.0", "1.2.0", false, None);
        assert_eq!(b.parsed_version().unwrap(), Version::new(1, 2, 0));
    }

    #[test]
    fn rejects_unparseable_version() {
        let b = bundle("bad", "not-a-version", false, None);
        assert!(b.parsed_version().is_err());
    }

    #[test]
    fn end_of_life_precedence() {
        let past = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let future = Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap();

        let expired = bundle("v1", "1.0.0", false, Some(past));
        assert!(expired.is_past_end_of_life(Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap()));

        let alive = bundle("v2", "1.1.0", false, Some(future));
        assert!(!alive.is_past_end_of_life(Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap()));
    }

    #[test]
    fn kind_serializes_kebab_case_for_the_store_file_format() {
        let b = bundle("v1.2.0", "1.2.0", false, None);
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["kind"], "control-plane");
    }
}
