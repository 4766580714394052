/// Descriptor heap categories a resource view can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorHeapType {
    CbvSrvUav,
    Sampler,
    RenderTarget,
    DepthStencil,
}

impl DescriptorHeapType {
    pub const COUNT: usize = 4;

    pub(crate) fn index(self) -> usize {
        match self {
            DescriptorHeapType::CbvSrvUav => 0,
            DescriptorHeapType::Sampler => 1,
            DescriptorHeapType::RenderTarget => 2,
            DescriptorHeapType::DepthStencil => 3,
        }
    }
}

/// CPU-visible descriptor handle. Opaque to everything above the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CpuDescriptor(pub u64);

impl CpuDescriptor {
    /// Sentinel used where a slot is optional (e.g. no depth target bound).
    pub const INVALID: CpuDescriptor = CpuDescriptor(u64::MAX);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

/// GPU-visible descriptor handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuDescriptor(pub u64);

impl GpuDescriptor {
    pub const INVALID: GpuDescriptor = GpuDescriptor(u64::MAX);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}
