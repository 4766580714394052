use magpie_rhi::{
    CommandSlot, CpuDescriptor, DescriptorHeapType, GpuDescriptor, RenderContext, ResourceDesc,
    ResourceState,
};

use crate::edge::{
    input_label, resolve_input, InputEdge, InputRef, OutputEdge, OutputKind, OutputRef,
    ResourceMarker, WireHandle,
};
use crate::error::GraphError;
use crate::resource::{Resource, ResourceId, ResourceTable};

/// Stable id of a pass inside its graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassId(pub(crate) u32);

impl PassId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A unit of GPU work with declared input and output slots.
///
/// `setup` runs once at registration and declares the pass's edges and owned
/// resources. `init`/`shutdown` are optional lifecycle hooks driven by
/// [`Graph::start`](crate::Graph::start) and [`Graph::stop`](crate::Graph::stop),
/// independent of per-frame execution. `execute` records the pass's own GPU
/// work; the scheduler has already applied every barrier its inputs need by
/// the time it is called.
pub trait RenderPass<C: RenderContext>: 'static {
    fn setup(&mut self, setup: &mut PassSetup<'_, C>) -> Result<(), GraphError>;

    fn init(&mut self, _context: &mut C) -> anyhow::Result<()> {
        Ok(())
    }

    fn shutdown(&mut self, _context: &mut C) {}

    fn execute(&mut self, api: &mut PassApi<'_, C>) -> anyhow::Result<()>;
}

/// Arena entry for one registered pass.
pub(crate) struct PassNode<C: RenderContext> {
    pub(crate) name: String,
    pub(crate) slot: CommandSlot,
    pub(crate) inputs: Vec<InputEdge>,
    pub(crate) outputs: Vec<OutputEdge>,
    /// Taken out of the node while the pass runs, so the scheduler can keep
    /// reading the arena underneath it.
    pub(crate) logic: Option<Box<dyn RenderPass<C>>>,
}

/// Edge and resource declaration surface handed to [`RenderPass::setup`].
pub struct PassSetup<'a, C: RenderContext> {
    pub(crate) pass: PassId,
    pub(crate) node: &'a mut PassNode<C>,
    pub(crate) resources: &'a mut ResourceTable,
    pub(crate) context: &'a mut C,
}

impl<'a, C: RenderContext> PassSetup<'a, C> {
    /// Declare a consuming slot requiring `state`. Starts unwired; the graph
    /// faults at traversal time if it is still unwired then.
    pub fn input(&mut self, name: &str, state: ResourceState) -> InputRef {
        let index = self.node.inputs.len() as u32;
        self.node.inputs.push(InputEdge {
            name: name.to_string(),
            state,
            bound: None,
        });
        InputRef {
            pass: self.pass,
            index,
        }
    }

    /// Declare a producing slot bound directly to `resource`, which this
    /// pass's `execute` leaves in `state`.
    pub fn source(&mut self, name: &str, state: ResourceState, resource: ResourceId) -> OutputRef {
        let index = self.node.outputs.len() as u32;
        self.node.outputs.push(OutputEdge {
            name: name.to_string(),
            kind: OutputKind::Source { state, resource },
        });
        OutputRef {
            pass: self.pass,
            index,
        }
    }

    /// Declare a producing slot that re-exports whatever feeds `input`,
    /// untouched. All queries tunnel through to the input at query time.
    pub fn relay(&mut self, name: &str, input: InputRef) -> OutputRef {
        let index = self.node.outputs.len() as u32;
        self.node.outputs.push(OutputEdge {
            name: name.to_string(),
            kind: OutputKind::Relay { input },
        });
        OutputRef {
            pass: self.pass,
            index,
        }
    }

    /// Create a graph-owned resource through the context's factory.
    pub fn create_resource(
        &mut self,
        name: &str,
        desc: &ResourceDesc,
    ) -> Result<ResourceId, GraphError> {
        self.resources.create(self.context, name, desc)
    }

    pub fn context(&mut self) -> &mut C {
        self.context
    }
}

/// Execution surface handed to [`RenderPass::execute`].
///
/// Gives the pass its slot's command recorder and read access to whatever its
/// wired inputs currently resolve to.
pub struct PassApi<'a, C: RenderContext> {
    pub(crate) context: &'a mut C,
    pub(crate) slot: CommandSlot,
    pub(crate) passes: &'a [PassNode<C>],
    pub(crate) resources: &'a ResourceTable,
}

impl<'a, C: RenderContext> PassApi<'a, C> {
    pub fn context(&mut self) -> &mut C {
        self.context
    }

    /// The command recorder this pass's slot records into.
    pub fn recorder(&mut self) -> &mut C::Recorder {
        self.context.recorder(self.slot)
    }

    /// Resource currently feeding `input`.
    pub fn resource(&self, input: InputRef) -> Result<&Resource, GraphError> {
        let id = resolve_input(self.passes, input)?;
        Ok(self.resources.get(id))
    }

    /// Resource a source output of this pass is bound to.
    pub fn output_resource(&self, output: OutputRef) -> Result<&Resource, GraphError> {
        let id = crate::edge::resolve_output(self.passes, output)?;
        Ok(self.resources.get(id))
    }

    pub fn cpu_descriptor(
        &self,
        input: InputRef,
        heap: DescriptorHeapType,
    ) -> Result<CpuDescriptor, GraphError> {
        self.resource(input)?.cpu_descriptor(heap)
    }

    pub fn gpu_descriptor(
        &self,
        input: InputRef,
        heap: DescriptorHeapType,
    ) -> Result<GpuDescriptor, GraphError> {
        self.resource(input)?.gpu_descriptor(heap)
    }

    /// Resolve a typed wire, checking the resource variant it promised.
    pub fn wire<M: ResourceMarker>(&self, handle: WireHandle<M>) -> Result<&Resource, GraphError> {
        let resource = self.resource(handle.raw())?;
        if resource.kind() != M::KIND {
            return Err(GraphError::WireTypeMismatch {
                edge: input_label(self.passes, handle.raw()),
                expected: M::KIND,
                found: resource.kind(),
            });
        }
        Ok(resource)
    }
}

#[cfg(test)]
mod tests {
    use magpie_rhi::{CommandSlot, DescriptorHeapType, ResourceDesc, ResourceState};

    use crate::edge::{WireHandle, Buf, RT};
    use crate::error::GraphError;
    use crate::graph::Graph;
    use crate::pass::{PassApi, PassSetup, RenderPass};
    use crate::test_context::{rt_desc, Decl, StagePass, TestContext};

    /// Consumes one wire and checks the typed-handle contract from inside
    /// `execute`, where wires are resolvable.
    struct WireCheckPass {
        expect_mismatch: bool,
        wire: Option<WireHandle<RT>>,
    }

    impl RenderPass<TestContext> for WireCheckPass {
        fn setup(&mut self, setup: &mut PassSetup<'_, TestContext>) -> Result<(), GraphError> {
            let input = setup.input("tex", ResourceState::PixelShaderResource);
            self.wire = Some(WireHandle::new(input));
            Ok(())
        }

        fn execute(&mut self, api: &mut PassApi<'_, TestContext>) -> anyhow::Result<()> {
            let wire = self.wire.unwrap();

            if self.expect_mismatch {
                match api.wire(wire) {
                    Ok(_) => panic!("expected a wire type mismatch"),
                    Err(GraphError::WireTypeMismatch { edge, .. }) => {
                        assert_eq!(edge, "in:check:tex");
                    }
                    Err(other) => panic!("unexpected error: {other}"),
                }
                // the untyped buffer view still resolves fine
                let buffer: WireHandle<Buf> = WireHandle::new(wire.raw());
                api.wire(buffer)?;
            } else {
                let resource = api.wire(wire)?;
                resource.cpu_descriptor(DescriptorHeapType::RenderTarget)?;

                // the descriptor helpers delegate through the bound producer
                api.cpu_descriptor(wire.raw(), DescriptorHeapType::RenderTarget)?;
                api.gpu_descriptor(wire.raw(), DescriptorHeapType::CbvSrvUav)?;

                let err = resource
                    .cpu_descriptor(DescriptorHeapType::DepthStencil)
                    .unwrap_err();
                assert!(matches!(err, GraphError::MissingDescriptor { .. }));
            }

            Ok(())
        }
    }

    #[test]
    fn test_typed_wire_resolves_matching_resource() {
        let mut ctx = TestContext::new();
        let mut graph = Graph::new();

        let producer = graph
            .add_pass(&mut ctx, "scene", CommandSlot::Scene, StagePass::new("scene", vec![
                Decl::Source("color", ResourceState::PixelShaderResource, rt_desc()),
            ]))
            .unwrap();
        let consumer = graph
            .add_pass(&mut ctx, "check", CommandSlot::Post, WireCheckPass {
                expect_mismatch: false,
                wire: None,
            })
            .unwrap();

        graph.link(
            graph.input_ref(consumer, "tex").unwrap(),
            graph.output_ref(producer, "color").unwrap(),
        );

        graph.execute(&mut ctx, consumer).unwrap();
    }

    #[test]
    fn test_typed_wire_rejects_wrong_resource_kind() {
        let mut ctx = TestContext::new();
        let mut graph = Graph::new();

        let producer = graph
            .add_pass(&mut ctx, "upload", CommandSlot::Direct, StagePass::new("upload", vec![
                Decl::Source(
                    "staging",
                    ResourceState::PixelShaderResource,
                    ResourceDesc::Buffer { size: 256 },
                ),
            ]))
            .unwrap();
        let consumer = graph
            .add_pass(&mut ctx, "check", CommandSlot::Post, WireCheckPass {
                expect_mismatch: true,
                wire: None,
            })
            .unwrap();

        graph.link(
            graph.input_ref(consumer, "tex").unwrap(),
            graph.output_ref(producer, "staging").unwrap(),
        );

        graph.execute(&mut ctx, consumer).unwrap();
    }
}
