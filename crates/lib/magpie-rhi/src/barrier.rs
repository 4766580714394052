use crate::resource::ResourceHandle;
use crate::state::ResourceState;

/// One resource state transition, recorded into a command list in batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub resource: ResourceHandle,
    pub before: ResourceState,
    pub after: ResourceState,
}

impl StateTransition {
    pub fn new(resource: ResourceHandle, before: ResourceState, after: ResourceState) -> Self {
        Self {
            resource,
            before,
            after,
        }
    }
}
