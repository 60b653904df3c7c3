//! Error kinds the checker surfaces, classified by behaviour rather than by
//! type.

use thiserror::Error;

use crate::bundle::BundleKind;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CheckerError {
    /// No non-preview, non-EOL bundle exists for this kind. The tick aborts
    /// for this kind only; the next tick starts over.
    #[error("no upgrade candidates for kind {kind:?}")]
    NoUpgradeCandidates { kind: BundleKind },

    /// A resource references a bundle that no longer exists in the store.
    /// Treated as a hard but non-fatal error: the tick aborts to surface the
    /// inconsistency to an operator (an open design question, resolved in
    /// favor of aborting rather than silently skipping the resource).
    #[error("resource {resource} references missing bundle {bundle_name}")]
    MissingBundle { resource: String, bundle_name: String },

    /// Store read/write failure, transient or an optimistic-concurrency
    /// conflict. Both bubble up identically: log and let the next tick
    /// retry from scratch.
    #[error(transparent)]
    Store(#[from] StoreError),
}
