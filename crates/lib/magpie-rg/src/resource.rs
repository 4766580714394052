use std::collections::HashMap;

use magpie_rhi::{
    CpuDescriptor, DescriptorHeapType, GpuDescriptor, RenderContext, ResourceBinding,
    ResourceDesc, ResourceHandle, ResourceKind,
};

use crate::error::GraphError;

/// Stable id of a resource inside its graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(pub(crate) u32);

impl ResourceId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A graph-owned GPU-visible object: a name, its variant tag and the native
/// binding the device handed back. Passive data; all transition logic lives
/// in the scheduler.
pub struct Resource {
    name: String,
    kind: ResourceKind,
    binding: ResourceBinding,
}

impl Resource {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn handle(&self) -> ResourceHandle {
        self.binding.resource()
    }

    pub fn binding(&self) -> &ResourceBinding {
        &self.binding
    }

    pub fn cpu_descriptor(&self, heap: DescriptorHeapType) -> Result<CpuDescriptor, GraphError> {
        self.binding
            .cpu_descriptor(heap)
            .ok_or_else(|| GraphError::MissingDescriptor {
                resource: self.name.clone(),
                heap,
            })
    }

    pub fn gpu_descriptor(&self, heap: DescriptorHeapType) -> Result<GpuDescriptor, GraphError> {
        self.binding
            .gpu_descriptor(heap)
            .ok_or_else(|| GraphError::MissingDescriptor {
                resource: self.name.clone(),
                heap,
            })
    }
}

/// Name-keyed arena of all resources a graph owns.
pub(crate) struct ResourceTable {
    entries: Vec<Resource>,
    ids: HashMap<String, ResourceId>,
}

impl ResourceTable {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            ids: HashMap::new(),
        }
    }

    /// Ask the context's factory for a new resource and take ownership of
    /// the returned binding.
    pub(crate) fn create<C: RenderContext>(
        &mut self,
        context: &mut C,
        name: &str,
        desc: &ResourceDesc,
    ) -> Result<ResourceId, GraphError> {
        if self.ids.contains_key(name) {
            return Err(GraphError::DuplicateResource {
                name: name.to_string(),
            });
        }

        let binding = context.create_resource(name, desc)?;
        Ok(self.insert(name, desc.kind(), binding))
    }

    /// Adopt an externally created binding (e.g. the swapchain backbuffer).
    /// The native object stays owned by whoever created it.
    pub(crate) fn import(
        &mut self,
        name: &str,
        kind: ResourceKind,
        binding: ResourceBinding,
    ) -> Result<ResourceId, GraphError> {
        if self.ids.contains_key(name) {
            return Err(GraphError::DuplicateResource {
                name: name.to_string(),
            });
        }

        Ok(self.insert(name, kind, binding))
    }

    fn insert(&mut self, name: &str, kind: ResourceKind, binding: ResourceBinding) -> ResourceId {
        let id = ResourceId(self.entries.len() as u32);
        self.entries.push(Resource {
            name: name.to_string(),
            kind,
            binding,
        });
        self.ids.insert(name.to_string(), id);
        id
    }

    pub(crate) fn get(&self, id: ResourceId) -> &Resource {
        &self.entries[id.index()]
    }

    pub(crate) fn id(&self, name: &str) -> Option<ResourceId> {
        self.ids.get(name).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
