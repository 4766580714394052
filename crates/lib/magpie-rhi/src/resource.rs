use crate::descriptor::{CpuDescriptor, DescriptorHeapType, GpuDescriptor};

/// Opaque handle of a native GPU object. The device owns the object; the
/// graph only passes the handle around and into barriers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceHandle(pub u64);

/// Texel formats the resource factory understands.
///
/// Deliberately tiny: the graph never inspects formats, it only forwards them
/// to the device when asking for a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Rgba8Unorm,
    Bgra8Unorm,
    Rgba16Float,
    Depth32Float,
}

/// Creation parameters handed to the resource factory.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceDesc {
    RenderTarget {
        width: u32,
        height: u32,
        format: Format,
        clear: [f32; 4],
    },
    DepthStencil {
        width: u32,
        height: u32,
    },
    Buffer {
        size: usize,
    },
}

impl ResourceDesc {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceDesc::RenderTarget { .. } => ResourceKind::RenderTarget,
            ResourceDesc::DepthStencil { .. } => ResourceKind::DepthStencil,
            ResourceDesc::Buffer { .. } => ResourceKind::Buffer,
        }
    }
}

/// Variant tag of a created resource, checked by typed wire handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    RenderTarget,
    DepthStencil,
    Buffer,
}

/// One view of a resource inside a descriptor heap.
#[derive(Debug, Clone, Copy)]
pub struct DescriptorView {
    pub cpu: CpuDescriptor,
    pub gpu: Option<GpuDescriptor>,
}

/// What the factory returns: the native handle plus whichever heap views the
/// resource was created with. Views the device did not create stay `None`;
/// asking for one of those is a caller error surfaced by the graph layer.
#[derive(Debug, Clone)]
pub struct ResourceBinding {
    resource: ResourceHandle,
    views: [Option<DescriptorView>; DescriptorHeapType::COUNT],
}

impl ResourceBinding {
    pub fn new(resource: ResourceHandle) -> Self {
        Self {
            resource,
            views: [None; DescriptorHeapType::COUNT],
        }
    }

    pub fn with_view(mut self, heap: DescriptorHeapType, view: DescriptorView) -> Self {
        self.views[heap.index()] = Some(view);
        self
    }

    pub fn resource(&self) -> ResourceHandle {
        self.resource
    }

    pub fn view(&self, heap: DescriptorHeapType) -> Option<&DescriptorView> {
        self.views[heap.index()].as_ref()
    }

    pub fn cpu_descriptor(&self, heap: DescriptorHeapType) -> Option<CpuDescriptor> {
        self.view(heap).map(|view| view.cpu)
    }

    pub fn gpu_descriptor(&self, heap: DescriptorHeapType) -> Option<GpuDescriptor> {
        self.view(heap).and_then(|view| view.gpu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_views() {
        let binding = ResourceBinding::new(ResourceHandle(7)).with_view(
            DescriptorHeapType::RenderTarget,
            DescriptorView {
                cpu: CpuDescriptor(1),
                gpu: None,
            },
        );

        assert_eq!(binding.resource(), ResourceHandle(7));
        assert_eq!(
            binding.cpu_descriptor(DescriptorHeapType::RenderTarget),
            Some(CpuDescriptor(1))
        );
        assert_eq!(binding.gpu_descriptor(DescriptorHeapType::RenderTarget), None);
        assert!(binding.view(DescriptorHeapType::CbvSrvUav).is_none());
    }
}
