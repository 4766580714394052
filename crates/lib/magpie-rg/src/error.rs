use magpie_rhi::{DescriptorHeapType, ResourceKind, RhiError};
use thiserror::Error;

/// Faults raised while building or running a frame graph.
///
/// Every variant here is a programmer or configuration error: a frame cannot
/// be rendered once one occurs, and retrying will not help. Callers are
/// expected to propagate these up and abort the frame loop.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("input `{edge}` has no wired producer")]
    UnresolvedInput { edge: String },

    #[error("input `{edge}` was read before being wired for this traversal")]
    InputNotBound { edge: String },

    #[error("relay `{relay}` resolved to nothing through `{chain}`")]
    RelayUnresolved { relay: String, chain: String },

    #[error("dependency cycle detected: {chain}")]
    DependencyCycle { chain: String },

    #[error("a pass named `{name}` is already registered")]
    DuplicatePass { name: String },

    #[error("a resource named `{name}` is already registered")]
    DuplicateResource { name: String },

    #[error("resource `{resource}` has no `{heap:?}` view")]
    MissingDescriptor {
        resource: String,
        heap: DescriptorHeapType,
    },

    #[error("wire `{edge}` expected a {expected:?} resource, found {found:?}")]
    WireTypeMismatch {
        edge: String,
        expected: ResourceKind,
        found: ResourceKind,
    },

    #[error("pass `{pass}` failed during startup")]
    PassStartup {
        pass: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("pass `{pass}` failed during execution")]
    PassExecution {
        pass: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Rhi(#[from] RhiError),
}
