//! Managed resources: control planes and workload clusters, treated
//! identically by the scheduler via one shared contract, avoiding ad-hoc
//! downcasting between resource kinds.

use serde::{Deserialize, Serialize};

use crate::bundle::BundleKind;
use crate::policy::AutoUpgradePolicy;

/// Shared behaviour the scheduler needs from any resource kind it manages.
/// `ControlPlane` and `KubernetesCluster` both implement it; the scheduler
/// never downcasts or matches on a concrete type.
pub trait ManagedResource: Clone + Send + Sync + 'static {
    fn bundle_kind() -> BundleKind;

    fn stable_id(&self) -> &str;
    fn current_bundle_name(&self) -> &str;
    fn set_bundle_name(&mut self, name: String);
    fn upgrade_policy(&self) -> Option<&AutoUpgradePolicy>;
    fn is_deleting(&self) -> bool;

    /// Name of this resource, for log context and store keys.
    fn name(&self) -> &str;
    /// Owning project label, for log context.
    fn project(&self) -> &str;
    /// Owning control-plane label, if this resource is a workload cluster.
    fn control_plane(&self) -> Option<&str>;
}

/// A control plane: a virtual cluster running Cluster-API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPlane {
    pub name: String,
    pub project: String,
    pub bundle_name: String,
    pub upgrade_policy: Option<AutoUpgradePolicy>,
    pub stable_id: String,
    pub deleting: bool,
}

impl ManagedResource for ControlPlane {
    fn bundle_kind() -> BundleKind {
        BundleKind::ControlPlane
    }

    fn stable_id(&self) -> &str {
        &self.stable_id
    }

    fn current_bundle_name(&self) -> &str {
        &self.bundle_name
    }

    fn set_bundle_name(&mut self, name: String) {
        self.bundle_name = name;
    }

    fn upgrade_policy(&self) -> Option<&AutoUpgradePolicy> {
        self.upgrade_policy.as_ref()
    }

    fn is_deleting(&self) -> bool {
        self.deleting
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn project(&self) -> &str {
        &self.project
    }

    fn control_plane(&self) -> Option<&str> {
        None
    }
}

/// A workload cluster provisioned by a control plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KubernetesCluster {
    pub name: String,
    pub project: String,
    pub control_plane: String,
    pub bundle_name: String,
    pub upgrade_policy: Option<AutoUpgradePolicy>,
    pub stable_id: String,
    pub deleting: bool,
}

impl ManagedResource for KubernetesCluster {
    fn bundle_kind() -> BundleKind {
        BundleKind::KubernetesCluster
    }

    fn stable_id(&self) -> &str {
        &self.stable_id
    }

    fn current_bundle_name(&self) -> &str {
        &self.bundle_name
    }

    fn set_bundle_name(&mut self, name: String) {
        self.bundle_name = name;
    }

    fn upgrade_policy(&self) -> Option<&AutoUpgradePolicy> {
        self.upgrade_policy.as_ref()
    }

    fn is_deleting(&self) -> bool {
        self.deleting
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn project(&self) -> &str {
        &self.project
    }

    fn control_plane(&self) -> Option<&str> {
        Some(&self.control_plane)
    }
}

/// The kind of a resource's parent, per the label convention below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentKind {
    Project,
    ControlPlane,
}

/// Read a child resource's parent off its labels, without following an
/// owning reference graph: parent lookups are re-modelled as label reads the
/// store resolves, rather than walking owner references that could cycle.
pub fn parent_of(child: &KubernetesCluster) -> (ParentKind, String) {
    (ParentKind::ControlPlane, child.control_plane.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster() -> KubernetesCluster {
        KubernetesCluster {
            name: "cluster-a".to_string(),
            project: "proj-1".to_string(),
            control_plane: "cp-1".to_string(),
            bundle_name: "v1.0.0".to_string(),
            upgrade_policy: None,
            stable_id: "stable-1".to_string(),
            deleting: false,
        }
    }

    #[test]
    fn parent_of_reads_control_plane_label() {
        let c = cluster();
        let (kind, name) = parent_of(&c);
        assert_eq!(kind, ParentKind::ControlPlane);
        assert_eq!(name, "cp-1");
    }

    #[test]
    fn set_bundle_name_mutates_in_place() {
        let mut c = cluster();
        c.set_bundle_name("v1.1.0".to_string());
        assert_eq!(c.current_bundle_name(), "v1.1.0");
    }
}
