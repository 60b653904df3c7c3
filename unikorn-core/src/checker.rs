//! The upgrade checker: the per-tick control loop for one resource kind.

use std::marker::PhantomData;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::bundle::{ApplicationBundle, BundleKind};
use crate::catalogue::BundleCatalogue;
use crate::clock::Clock;
use crate::error::CheckerError;
use crate::policy::AutoUpgradePolicy;
use crate::resource::ManagedResource;
use crate::scheduler::TickRunner;
use crate::store::ResourceStore;
use crate::window;

/// Ties the leaves (clock, entropy, time-window evaluator, bundle
/// catalogue) to one resource kind's store.
pub struct UpgradeChecker<R, BS, RS>
where
    R: ManagedResource,
    BS: ResourceStore<ApplicationBundle>,
    RS: ResourceStore<R>,
{
    bundle_store: BS,
    resource_store: RS,
    clock: Arc<dyn Clock>,
    _resource: PhantomData<R>,
}

impl<R, BS, RS> UpgradeChecker<R, BS, RS>
where
    R: ManagedResource,
    BS: ResourceStore<ApplicationBundle>,
    RS: ResourceStore<R>,
{
    pub fn new(bundle_store: BS, resource_store: RS, clock: Arc<dyn Clock>) -> Self {
        Self {
            bundle_store,
            resource_store,
            clock,
            _resource: PhantomData,
        }
    }

    fn log_controlplane_field(resource: &R) -> Option<String> {
        match R::bundle_kind() {
            BundleKind::ControlPlane => Some(resource.name().to_string()),
            BundleKind::KubernetesCluster => resource.control_plane().map(str::to_string),
        }
    }

    fn log_cluster_field(resource: &R) -> Option<String> {
        match R::bundle_kind() {
            BundleKind::KubernetesCluster => Some(resource.name().to_string()),
            BundleKind::ControlPlane => None,
        }
    }

    /// Run one tick for this resource kind.
    pub async fn check(&self, cancel: &CancellationToken) -> Result<(), CheckerError> {
        let now = self.clock.now();

        let bundles = self.bundle_store.list(cancel).await?;
        let catalogue = BundleCatalogue::build(bundles, R::bundle_kind());
        let target = catalogue
            .target()
            .ok_or(CheckerError::NoUpgradeCandidates { kind: R::bundle_kind() })?
            .clone();

        let resources = self.resource_store.list(cancel).await?;

        for mut resource in resources {
            if resource.is_deleting() {
                continue;
            }

            let project = resource.project().to_string();
            let controlplane = Self::log_controlplane_field(&resource);
            let cluster = Self::log_cluster_field(&resource);

            let current = catalogue
                .lookup(resource.current_bundle_name())
                .ok_or_else(|| CheckerError::MissingBundle {
                    resource: resource.name().to_string(),
                    bundle_name: resource.current_bundle_name().to_string(),
                })?
                .clone();

            if current.is_preview() {
                info!(project = %project, controlplane = ?controlplane, cluster = ?cluster, "bundle in preview");
                continue;
            }

            if current.name == target.name {
                info!(project = %project, controlplane = ?controlplane, cluster = ?cluster, "already latest");
                continue;
            }

            let policy = match resource.upgrade_policy() {
                Some(p) => p.clone(),
                None => {
                    if !current.is_past_end_of_life(now) {
                        info!(project = %project, controlplane = ?controlplane, cluster = ?cluster, "auto-upgrade disabled");
                        continue;
                    }
                    info!(project = %project, controlplane = ?controlplane, cluster = ?cluster, "auto-upgrade disabled, forcing due to end-of-life");
                    AutoUpgradePolicy::Auto
                }
            };

            let Some(w) = window::evaluate(&policy, resource.stable_id(), now) else {
                continue;
            };
            if !w.contains(now) {
                continue;
            }

            info!(
                project = %project,
                controlplane = ?controlplane,
                cluster = ?cluster,
                from = %current.name,
                to = %target.name,
                start = %w.start,
                end = %w.end,
                "bundle upgrading"
            );
            resource.set_bundle_name(target.name.clone());
            self.resource_store.update(&resource, cancel).await?;
        }

        Ok(())
    }
}

/// Every `UpgradeChecker` is a `TickRunner`, regardless of which resource
/// kind and store types it was built with, so the root loop can hold them
/// in one `Vec<Box<dyn TickRunner>>`.
#[async_trait::async_trait]
impl<R, BS, RS> TickRunner for UpgradeChecker<R, BS, RS>
where
    R: ManagedResource,
    BS: ResourceStore<ApplicationBundle>,
    RS: ResourceStore<R>,
{
    fn name(&self) -> &'static str {
        match R::bundle_kind() {
            BundleKind::ControlPlane => "control-plane",
            BundleKind::KubernetesCluster => "kubernetes-cluster",
        }
    }

    async fn check(&self, cancel: &CancellationToken) -> Result<(), CheckerError> {
        UpgradeChecker::check(self, cancel).await
    }
}
