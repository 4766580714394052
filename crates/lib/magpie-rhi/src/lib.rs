mod state;
mod descriptor;
mod barrier;
mod resource;
mod context;

pub use state::ResourceState;
pub use descriptor::{CpuDescriptor, DescriptorHeapType, GpuDescriptor};
pub use barrier::StateTransition;
pub use resource::{
    DescriptorView, Format, ResourceBinding, ResourceDesc, ResourceHandle, ResourceKind,
};
pub use context::{CommandRecorder, CommandSlot, RenderContext, RhiError};
