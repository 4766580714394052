use std::marker::PhantomData;

use magpie_rhi::{RenderContext, ResourceKind, ResourceState};

use crate::error::GraphError;
use crate::pass::{PassId, PassNode};
use crate::resource::ResourceId;

/// Identity of an input edge: (pass, declaration index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputRef {
    pub(crate) pass: PassId,
    pub(crate) index: u32,
}

/// Identity of an output edge: (pass, declaration index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputRef {
    pub(crate) pass: PassId,
    pub(crate) index: u32,
}

impl InputRef {
    pub fn pass(self) -> PassId {
        self.pass
    }
}

impl OutputRef {
    pub fn pass(self) -> PassId {
        self.pass
    }
}

/// A consuming slot on a pass. `bound` is the live binding for the current
/// traversal, set by the scheduler right before the pass runs; reading an
/// input that was never bound is a graph fault.
pub(crate) struct InputEdge {
    pub(crate) name: String,
    pub(crate) state: ResourceState,
    pub(crate) bound: Option<OutputRef>,
}

/// Closed set of producing edge shapes.
pub(crate) enum OutputKind {
    /// Bound directly to a resource; state fixed at construction.
    Source {
        state: ResourceState,
        resource: ResourceId,
    },
    /// Forwards every query to another input at query time. Lets a pass
    /// re-export a resource it consumes without touching it.
    Relay { input: InputRef },
}

pub(crate) struct OutputEdge {
    pub(crate) name: String,
    pub(crate) kind: OutputKind,
}

pub(crate) fn input_label<C: RenderContext>(passes: &[PassNode<C>], r: InputRef) -> String {
    let node = &passes[r.pass.index()];
    format!("in:{}:{}", node.name, node.inputs[r.index as usize].name)
}

pub(crate) fn output_label<C: RenderContext>(passes: &[PassNode<C>], r: OutputRef) -> String {
    let node = &passes[r.pass.index()];
    format!("out:{}:{}", node.name, node.outputs[r.index as usize].name)
}

/// Declared state of an output. For a relay this is the delegate input's
/// declared state, re-read on every query.
pub(crate) fn output_state<C: RenderContext>(
    passes: &[PassNode<C>],
    r: OutputRef,
) -> ResourceState {
    match &passes[r.pass.index()].outputs[r.index as usize].kind {
        OutputKind::Source { state, .. } => *state,
        OutputKind::Relay { input } => {
            passes[input.pass.index()].inputs[input.index as usize].state
        }
    }
}

/// Walk an output down to the resource that terminates it, tunnelling
/// through relay chains via the delegate inputs' live bindings.
pub(crate) fn resolve_output<C: RenderContext>(
    passes: &[PassNode<C>],
    r: OutputRef,
) -> Result<ResourceId, GraphError> {
    let mut path: Vec<OutputRef> = Vec::new();
    let mut current = r;

    loop {
        // a relay chain longer than the total output count must be circular
        if path.len() > passes.iter().map(|node| node.outputs.len()).sum() {
            return Err(GraphError::DependencyCycle {
                chain: chain_labels(passes, &path),
            });
        }
        path.push(current);

        match &passes[current.pass.index()].outputs[current.index as usize].kind {
            OutputKind::Source { resource, .. } => return Ok(*resource),
            OutputKind::Relay { input } => {
                let edge = &passes[input.pass.index()].inputs[input.index as usize];
                match edge.bound {
                    Some(next) => current = next,
                    None => {
                        return Err(GraphError::RelayUnresolved {
                            relay: output_label(passes, r),
                            chain: format!(
                                "{} -> {}",
                                chain_labels(passes, &path),
                                input_label(passes, *input)
                            ),
                        })
                    }
                }
            }
        }
    }
}

/// Resource currently feeding an input. Requires the input to have been
/// bound for this traversal.
pub(crate) fn resolve_input<C: RenderContext>(
    passes: &[PassNode<C>],
    r: InputRef,
) -> Result<ResourceId, GraphError> {
    let edge = &passes[r.pass.index()].inputs[r.index as usize];
    let bound = edge.bound.ok_or_else(|| GraphError::InputNotBound {
        edge: input_label(passes, r),
    })?;
    resolve_output(passes, bound)
}

fn chain_labels<C: RenderContext>(passes: &[PassNode<C>], path: &[OutputRef]) -> String {
    path.iter()
        .map(|r| output_label(passes, *r))
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Render target wire.
pub struct RT;
/// Depth stencil wire.
pub struct DS;
/// Buffer wire.
pub struct Buf;

/// Compile-time tag naming which resource variant a wire is expected to
/// carry. Checked once per resolution, before any descriptor is handed out.
pub trait ResourceMarker {
    const KIND: ResourceKind;
}

impl ResourceMarker for RT {
    const KIND: ResourceKind = ResourceKind::RenderTarget;
}

impl ResourceMarker for DS {
    const KIND: ResourceKind = ResourceKind::DepthStencil;
}

impl ResourceMarker for Buf {
    const KIND: ResourceKind = ResourceKind::Buffer;
}

/// An input reference paired with the resource variant the consuming code
/// expects to find behind it.
pub struct WireHandle<M: ResourceMarker> {
    raw: InputRef,
    _marker: PhantomData<M>,
}

impl<M: ResourceMarker> WireHandle<M> {
    pub fn new(input: InputRef) -> Self {
        Self {
            raw: input,
            _marker: PhantomData,
        }
    }

    pub fn raw(&self) -> InputRef {
        self.raw
    }
}

impl<M: ResourceMarker> Clone for WireHandle<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: ResourceMarker> Copy for WireHandle<M> {}

impl<M: ResourceMarker> From<InputRef> for WireHandle<M> {
    fn from(input: InputRef) -> Self {
        Self::new(input)
    }
}

#[cfg(test)]
mod tests {
    use magpie_rhi::{CommandSlot, ResourceState};

    use crate::edge::{output_state, resolve_input, resolve_output};
    use crate::error::GraphError;
    use crate::graph::Graph;
    use crate::test_context::{rt_desc, Decl, StagePass, TestContext};

    #[test]
    fn test_unbound_input_faults_on_read() {
        let mut ctx = TestContext::new();
        let mut graph = Graph::new();

        let post = graph
            .add_pass(&mut ctx, "post", CommandSlot::Post, StagePass::new("post", vec![
                Decl::Input("color", ResourceState::PixelShaderResource),
            ]))
            .unwrap();

        let input = graph.input_ref(post, "color").unwrap();
        let err = resolve_input(&graph.passes, input).unwrap_err();
        match err {
            GraphError::InputNotBound { edge } => assert_eq!(edge, "in:post:color"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_relay_through_unbound_input_names_the_chain() {
        let mut ctx = TestContext::new();
        let mut graph = Graph::new();

        let post = graph
            .add_pass(&mut ctx, "post", CommandSlot::Post, StagePass::new("post", vec![
                Decl::Input("color", ResourceState::PixelShaderResource),
                Decl::Relay("color", "color"),
            ]))
            .unwrap();

        let relay = graph.output_ref(post, "color").unwrap();
        let err = resolve_output(&graph.passes, relay).unwrap_err();
        match err {
            GraphError::RelayUnresolved { relay, chain } => {
                assert_eq!(relay, "out:post:color");
                assert!(chain.contains("in:post:color"), "chain was `{chain}`");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    /// A relay never caches: rebinding its delegate input between two queries
    /// resolves to the new producer immediately.
    #[test]
    fn test_relay_tracks_delegate_rebinding() {
        let mut ctx = TestContext::new();
        let mut graph = Graph::new();

        let first = graph
            .add_pass(&mut ctx, "first", CommandSlot::Direct, StagePass::new("first", vec![
                Decl::Source("out", ResourceState::RenderTarget, rt_desc()),
            ]))
            .unwrap();
        let second = graph
            .add_pass(&mut ctx, "second", CommandSlot::Direct, StagePass::new("second", vec![
                Decl::Source("out", ResourceState::CopySource, rt_desc()),
            ]))
            .unwrap();
        let post = graph
            .add_pass(&mut ctx, "post", CommandSlot::Post, StagePass::new("post", vec![
                Decl::Input("color", ResourceState::PixelShaderResource),
                Decl::Relay("color", "color"),
            ]))
            .unwrap();

        let input = graph.input_ref(post, "color").unwrap();
        let relay = graph.output_ref(post, "color").unwrap();

        graph.bind_input(input, graph.output_ref(first, "out").unwrap());
        let resolved_first = resolve_output(&graph.passes, relay).unwrap();
        assert_eq!(resolved_first, graph.resource_id("first/out").unwrap());

        graph.bind_input(input, graph.output_ref(second, "out").unwrap());
        let resolved_second = resolve_output(&graph.passes, relay).unwrap();
        assert_eq!(resolved_second, graph.resource_id("second/out").unwrap());

        // the relay's state is its delegate's declared state, not the producer's
        assert_eq!(
            output_state(&graph.passes, relay),
            ResourceState::PixelShaderResource
        );
    }
}
