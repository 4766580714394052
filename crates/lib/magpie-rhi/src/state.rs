/// Hardware-visible state of a GPU resource.
///
/// Every edge in the render graph declares the state it requires its resource
/// to be in; the scheduler diffs producer state against consumer state and
/// records a transition barrier when they differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// Placeholder for edges that have not declared a state yet.
    /// Scheduling an edge left in this state is a graph construction bug.
    Invalid,
    RenderTarget,
    DepthWrite,
    DepthRead,
    PixelShaderResource,
    NonPixelShaderResource,
    CopySource,
    CopyDest,
    VertexAndConstantBuffer,
    IndexBuffer,
    Present,
}

impl Default for ResourceState {
    fn default() -> Self {
        ResourceState::Invalid
    }
}

impl std::fmt::Display for ResourceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceState::Invalid => "invalid",
            ResourceState::RenderTarget => "render-target",
            ResourceState::DepthWrite => "depth-write",
            ResourceState::DepthRead => "depth-read",
            ResourceState::PixelShaderResource => "pixel-shader-resource",
            ResourceState::NonPixelShaderResource => "non-pixel-shader-resource",
            ResourceState::CopySource => "copy-source",
            ResourceState::CopyDest => "copy-dest",
            ResourceState::VertexAndConstantBuffer => "vertex-and-constant-buffer",
            ResourceState::IndexBuffer => "index-buffer",
            ResourceState::Present => "present",
        };
        f.write_str(name)
    }
}
