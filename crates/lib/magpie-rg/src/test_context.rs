//! Shared mock context for the scheduler tests: a single journaling recorder
//! stands in for every command slot so tests observe one global command order.

use magpie_rhi::{
    CommandRecorder, CommandSlot, CpuDescriptor, DescriptorHeapType, DescriptorView,
    GpuDescriptor, RenderContext, ResourceBinding, ResourceDesc, ResourceHandle, ResourceState,
    RhiError, StateTransition,
};

use crate::error::GraphError;
use crate::pass::{PassApi, PassSetup, RenderPass};
use crate::InputRef;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Recorded {
    Transition(Vec<StateTransition>),
    Marker(&'static str),
}

#[derive(Default)]
pub(crate) struct TestRecorder {
    pub(crate) recorded: Vec<Recorded>,
}

impl TestRecorder {
    pub(crate) fn mark(&mut self, label: &'static str) {
        self.recorded.push(Recorded::Marker(label));
    }
}

impl CommandRecorder for TestRecorder {
    fn transition(&mut self, barriers: &[StateTransition]) {
        // the scheduler promises to never submit an empty batch
        assert!(!barriers.is_empty());
        self.recorded.push(Recorded::Transition(barriers.to_vec()));
    }
}

#[derive(Default)]
pub(crate) struct TestContext {
    pub(crate) recorder: TestRecorder,
    next_resource: u64,
    pub(crate) frames_begun: u32,
    pub(crate) frames_ended: u32,
    pub(crate) submits: u32,
    pub(crate) presents: u32,
}

impl TestContext {
    pub(crate) fn new() -> Self {
        Default::default()
    }

    pub(crate) fn markers(&self) -> Vec<&'static str> {
        self.recorder
            .recorded
            .iter()
            .filter_map(|op| match op {
                Recorded::Marker(label) => Some(*label),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn transitions(&self) -> Vec<Vec<StateTransition>> {
        self.recorder
            .recorded
            .iter()
            .filter_map(|op| match op {
                Recorded::Transition(batch) => Some(batch.clone()),
                _ => None,
            })
            .collect()
    }
}

impl RenderContext for TestContext {
    type Recorder = TestRecorder;

    fn create_resource(
        &mut self,
        _name: &str,
        desc: &ResourceDesc,
    ) -> Result<ResourceBinding, RhiError> {
        self.next_resource += 1;
        let handle = ResourceHandle(self.next_resource);
        let base = self.next_resource * 16;

        let binding = match desc {
            ResourceDesc::RenderTarget { .. } => ResourceBinding::new(handle)
                .with_view(
                    DescriptorHeapType::RenderTarget,
                    DescriptorView {
                        cpu: CpuDescriptor(base),
                        gpu: None,
                    },
                )
                .with_view(
                    DescriptorHeapType::CbvSrvUav,
                    DescriptorView {
                        cpu: CpuDescriptor(base + 1),
                        gpu: Some(GpuDescriptor(base + 2)),
                    },
                ),
            ResourceDesc::DepthStencil { .. } => ResourceBinding::new(handle).with_view(
                DescriptorHeapType::DepthStencil,
                DescriptorView {
                    cpu: CpuDescriptor(base),
                    gpu: None,
                },
            ),
            ResourceDesc::Buffer { .. } => ResourceBinding::new(handle).with_view(
                DescriptorHeapType::CbvSrvUav,
                DescriptorView {
                    cpu: CpuDescriptor(base),
                    gpu: Some(GpuDescriptor(base + 1)),
                },
            ),
        };

        Ok(binding)
    }

    fn begin_frame(&mut self) {
        self.frames_begun += 1;
    }

    fn recorder(&mut self, _slot: CommandSlot) -> &mut TestRecorder {
        &mut self.recorder
    }

    fn end_frame(&mut self) {
        self.frames_ended += 1;
    }

    fn submit(&mut self) -> Result<(), RhiError> {
        self.submits += 1;
        Ok(())
    }

    fn present(&mut self) -> Result<(), RhiError> {
        self.presents += 1;
        Ok(())
    }
}

/// Declarative edge list for [`StagePass`].
pub(crate) enum Decl {
    Input(&'static str, ResourceState),
    Source(&'static str, ResourceState, ResourceDesc),
    /// Relay of an input declared earlier in the same list.
    Relay(&'static str, &'static str),
}

pub(crate) fn rt_desc() -> ResourceDesc {
    ResourceDesc::RenderTarget {
        width: 64,
        height: 64,
        format: magpie_rhi::Format::Rgba8Unorm,
        clear: [0.0, 0.0, 0.0, 1.0],
    }
}

/// A pass that declares whatever `Decl`s it is given and records a marker
/// with its label when executed.
pub(crate) struct StagePass {
    label: &'static str,
    decls: Vec<Decl>,
}

impl StagePass {
    pub(crate) fn new(label: &'static str, decls: Vec<Decl>) -> Self {
        Self { label, decls }
    }
}

impl RenderPass<TestContext> for StagePass {
    fn setup(&mut self, setup: &mut PassSetup<'_, TestContext>) -> Result<(), GraphError> {
        let mut inputs: Vec<(&'static str, InputRef)> = Vec::new();

        for decl in &self.decls {
            match decl {
                Decl::Input(name, state) => {
                    let input = setup.input(name, *state);
                    inputs.push((*name, input));
                }
                Decl::Source(name, state, desc) => {
                    let resource = setup.create_resource(&format!("{}/{}", self.label, name), desc)?;
                    setup.source(name, *state, resource);
                }
                Decl::Relay(name, of) => {
                    let input = inputs
                        .iter()
                        .find(|(input_name, _)| input_name == of)
                        .expect("relay of undeclared input")
                        .1;
                    setup.relay(name, input);
                }
            }
        }

        Ok(())
    }

    fn execute(&mut self, api: &mut PassApi<'_, TestContext>) -> anyhow::Result<()> {
        api.recorder().mark(self.label);
        Ok(())
    }
}
