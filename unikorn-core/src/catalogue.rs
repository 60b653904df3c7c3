//! Bundle catalogue: picks the upgrade target for a kind and
//! resolves lookups of currently-referenced bundles.

use std::collections::HashMap;

use tracing::warn;

use crate::bundle::{ApplicationBundle, BundleKind};

/// The filtered, version-sorted set of bundles of one kind, plus the
/// upgrade target chosen from it.
pub struct BundleCatalogue {
    target: Option<ApplicationBundle>,
    by_name: HashMap<String, ApplicationBundle>,
}

impl BundleCatalogue {
    /// Build a catalogue from every bundle the store returned for `kind`.
    /// Bundles with an unparseable version are dropped (with a warning) and
    /// never reachable by name, since a resource cannot validly reference
    /// one (a resource cannot validly reference a bundle that doesn't parse).
    pub fn build(bundles: Vec<ApplicationBundle>, kind: BundleKind) -> Self {
        let mut by_name = HashMap::new();
        let mut candidates: Vec<(semver::Version, ApplicationBundle)> = Vec::new();

        for bundle in bundles {
            if bundle.kind != kind {
                continue;
            }
            let version = match bundle.parsed_version() {
                Ok(v) => v,
                Err(e) => {
                    warn!(bundle = %bundle.name, error = %e, "dropping bundle with unparseable version");
                    continue;
                }
            };
            by_name.insert(bundle.name.clone(), bundle.clone());
            candidates.push((version, bundle));
        }

        // Stable sort: ties (equal semver) keep the store's listing order.
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        let target = candidates
            .into_iter()
            .filter(|(_, b)| !b.is_preview() && !b.has_end_of_life())
            .last()
            .map(|(_, b)| b);

        Self { target, by_name }
    }

    /// The highest-version, non-preview, non-EOL bundle, if any exists.
    pub fn target(&self) -> Option<&ApplicationBundle> {
        self.target.as_ref()
    }

    /// Resolve a bundle by name, including preview and EOL bundles, so a
    /// resource's current reference always resolves as long as the bundle
    /// still exists in the store.
    pub fn lookup(&self, name: &str) -> Option<&ApplicationBundle> {
        self.by_name.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bundle(name: &str, version: &str, kind: BundleKind, preview: bool, eol: Option<chrono::DateTime<Utc>>) -> ApplicationBundle {
        ApplicationBundle {
            name: name.to_string(),
            version: version.to_string(),
            kind,
            preview,
            end_of_life: eol,
            applications: vec![],
        }
    }

    #[test]
    fn picks_highest_non_preview_non_eol() {
        let past = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bundles = vec![
            bundle("v1.0.0", "1.0.0", BundleKind::ControlPlane, false, Some(past)),
            bundle("v1.1.0", "1.1.0", BundleKind::ControlPlane, false, None),
            bundle("v1.2.0", "1.2.0", BundleKind::ControlPlane, false, None),
        ];
        let cat = BundleCatalogue::build(bundles, BundleKind::ControlPlane);
        assert_eq!(cat.target().unwrap().name, "v1.2.0");
    }

    #[test]
    fn preview_is_never_a_target_but_is_resolvable() {
        let bundles = vec![
            bundle("v1.1.0", "1.1.0", BundleKind::ControlPlane, false, None),
            bundle("v2.0.0-preview", "2.0.0-alpha.1", BundleKind::ControlPlane, true, None),
        ];
        let cat = BundleCatalogue::build(bundles, BundleKind::ControlPlane);
        assert_eq!(cat.target().unwrap().name, "v1.1.0");
        assert!(cat.lookup("v2.0.0-preview").is_some());
    }

    #[test]
    fn eol_bundle_resolvable_but_not_target() {
        let past = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bundles = vec![bundle("v1.0.0", "1.0.0", BundleKind::ControlPlane, false, Some(past))];
        let cat = BundleCatalogue::build(bundles, BundleKind::ControlPlane);
        assert!(cat.target().is_none());
        assert!(cat.lookup("v1.0.0").is_some());
    }

    #[test]
    fn no_candidates_when_everything_preview_or_eol() {
        let past = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bundles = vec![
            bundle("v1.0.0", "1.0.0", BundleKind::ControlPlane, false, Some(past)),
            bundle("v2.0.0-preview", "2.0.0-alpha.1", BundleKind::ControlPlane, true, None),
        ];
        let cat = BundleCatalogue::build(bundles, BundleKind::ControlPlane);
        assert!(cat.target().is_none());
    }

    #[test]
    fn filters_by_kind() {
        let bundles = vec![
            bundle("cp-v1", "1.0.0", BundleKind::ControlPlane, false, None),
            bundle("kc-v1", "1.5.0", BundleKind::KubernetesCluster, false, None),
        ];
        let cat = BundleCatalogue::build(bundles, BundleKind::ControlPlane);
        assert_eq!(cat.target().unwrap().name, "cp-v1");
        assert!(cat.lookup("kc-v1").is_none());
    }

    #[test]
    fn unparseable_version_is_dropped_entirely() {
        let bundles = vec![bundle("bad", "not-a-version", BundleKind::ControlPlane, false, None)];
        let cat = BundleCatalogue::build(bundles, BundleKind::ControlPlane);
        assert!(cat.target().is_none());
        assert!(cat.lookup("bad").is_none());
    }
}
