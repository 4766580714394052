use std::sync::Arc;

use parking_lot::Mutex;

use magpie_rg::{Graph, GraphError, PassApi, PassId, PassSetup, RenderPass, WireHandle, RT};
use magpie_rhi::{
    CommandSlot, CpuDescriptor, DescriptorHeapType, Format, ResourceDesc, ResourceState,
};

use crate::context::{DebugContext, DebugRecorder};

const SCENE_WIDTH: u32 = 1920;
const SCENE_HEIGHT: u32 = 1080;
const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 720;

const CLEAR_COLOUR: [f32; 4] = [0.0, 0.2, 0.4, 1.0];
const LETTERBOX: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

struct DrawCall {
    label: &'static str,
    index_count: u32,
}

/// Draw commands gated behind asynchronous uploads.
///
/// Upload callbacks append entries; `apply` replays whatever has completed so
/// far. A draw never reaches the command stream before its data is resident.
#[derive(Default, Clone)]
struct DeferredDraws {
    draws: Arc<Mutex<Vec<DrawCall>>>,
}

impl DeferredDraws {
    fn push(&self, draw: DrawCall) {
        self.draws.lock().push(draw);
    }

    fn apply(&self, recorder: &mut DebugRecorder) {
        for draw in self.draws.lock().iter() {
            recorder.draw_indexed(draw.label, draw.index_count);
        }
    }
}

/// Owns the backbuffer and exposes it to the rest of the frame.
#[derive(Default)]
struct GlobalPass;

impl RenderPass<DebugContext> for GlobalPass {
    fn setup(&mut self, setup: &mut PassSetup<'_, DebugContext>) -> Result<(), GraphError> {
        let backbuffer = setup.create_resource(
            "backbuffer",
            &ResourceDesc::RenderTarget {
                width: WINDOW_WIDTH,
                height: WINDOW_HEIGHT,
                format: Format::Bgra8Unorm,
                clear: LETTERBOX,
            },
        )?;
        setup.source("rtv", ResourceState::Present, backbuffer);
        Ok(())
    }

    fn execute(&mut self, _api: &mut PassApi<'_, DebugContext>) -> anyhow::Result<()> {
        // nothing to record; the backbuffer just enters the frame here
        Ok(())
    }
}

/// Renders the world into its own colour target.
#[derive(Default)]
struct ScenePass {
    target: Option<magpie_rg::OutputRef>,
    depth: Option<magpie_rg::OutputRef>,
    draws: DeferredDraws,
}

impl RenderPass<DebugContext> for ScenePass {
    fn setup(&mut self, setup: &mut PassSetup<'_, DebugContext>) -> Result<(), GraphError> {
        let target = setup.create_resource(
            "scene-target",
            &ResourceDesc::RenderTarget {
                width: SCENE_WIDTH,
                height: SCENE_HEIGHT,
                format: Format::Rgba16Float,
                clear: CLEAR_COLOUR,
            },
        )?;
        self.target = Some(setup.source("scene-target", ResourceState::RenderTarget, target));

        let depth = setup.create_resource(
            "scene-depth",
            &ResourceDesc::DepthStencil {
                width: SCENE_WIDTH,
                height: SCENE_HEIGHT,
            },
        )?;
        self.depth = Some(setup.source("depth", ResourceState::DepthWrite, depth));

        Ok(())
    }

    fn init(&mut self, context: &mut DebugContext) -> anyhow::Result<()> {
        // mesh data arrives asynchronously; the draw is queued only once the
        // upload has flushed
        let draws = self.draws.clone();
        context.upload("scene mesh", 36 * 32, move || {
            draws.push(DrawCall {
                label: "scene mesh",
                index_count: 36,
            });
        });
        Ok(())
    }

    fn execute(&mut self, api: &mut PassApi<'_, DebugContext>) -> anyhow::Result<()> {
        let target = api.output_resource(self.target.expect("scene target not declared"))?;
        let rtv = target.cpu_descriptor(DescriptorHeapType::RenderTarget)?;

        let depth = api.output_resource(self.depth.expect("scene depth not declared"))?;
        let dsv = depth.cpu_descriptor(DescriptorHeapType::DepthStencil)?;

        let recorder = api.recorder();
        recorder.set_viewport(SCENE_WIDTH, SCENE_HEIGHT);
        recorder.set_render_target(rtv, dsv);
        recorder.clear_render_target(rtv, CLEAR_COLOUR);
        self.draws.apply(recorder);
        Ok(())
    }
}

/// Composites the scene target onto the backbuffer, letterboxed, and
/// re-exports both resources for the passes after it.
#[derive(Default)]
struct PostPass {
    scene_in: Option<WireHandle<RT>>,
    rtv_in: Option<WireHandle<RT>>,
    draws: DeferredDraws,
}

impl RenderPass<DebugContext> for PostPass {
    fn setup(&mut self, setup: &mut PassSetup<'_, DebugContext>) -> Result<(), GraphError> {
        let scene = setup.input("scene-target", ResourceState::PixelShaderResource);
        self.scene_in = Some(WireHandle::new(scene));
        setup.relay("scene-target", scene);

        let rtv = setup.input("rtv", ResourceState::RenderTarget);
        self.rtv_in = Some(WireHandle::new(rtv));
        setup.relay("rtv", rtv);

        Ok(())
    }

    fn init(&mut self, context: &mut DebugContext) -> anyhow::Result<()> {
        let draws = self.draws.clone();
        context.upload("screen quad", 4 * 20 + 6 * 4, move || {
            draws.push(DrawCall {
                label: "screen quad",
                index_count: 6,
            });
        });
        Ok(())
    }

    fn execute(&mut self, api: &mut PassApi<'_, DebugContext>) -> anyhow::Result<()> {
        let target = api.wire(self.rtv_in.expect("rtv wire not declared"))?;
        let rtv = target.cpu_descriptor(DescriptorHeapType::RenderTarget)?;

        let scene = api.wire(self.scene_in.expect("scene wire not declared"))?;
        let srv = scene.gpu_descriptor(DescriptorHeapType::CbvSrvUav)?;

        let recorder = api.recorder();
        recorder.set_viewport(WINDOW_WIDTH, WINDOW_HEIGHT);
        recorder.set_render_target(rtv, CpuDescriptor::INVALID);
        recorder.clear_render_target(rtv, LETTERBOX);
        recorder.bind_texture(srv);
        self.draws.apply(recorder);
        Ok(())
    }
}

/// Terminal pass: wants the backbuffer back in present state.
#[derive(Default)]
struct PresentPass {
    rtv_in: Option<magpie_rg::InputRef>,
}

impl RenderPass<DebugContext> for PresentPass {
    fn setup(&mut self, setup: &mut PassSetup<'_, DebugContext>) -> Result<(), GraphError> {
        self.rtv_in = Some(setup.input("rtv", ResourceState::Present));
        setup.input("scene-target", ResourceState::PixelShaderResource);
        Ok(())
    }

    fn execute(&mut self, api: &mut PassApi<'_, DebugContext>) -> anyhow::Result<()> {
        let backbuffer = api.resource(self.rtv_in.expect("rtv input not declared"))?;
        let handle = backbuffer.handle();

        let recorder = api.recorder();
        recorder.record(format!("queue present of res#{}", handle.0));
        Ok(())
    }
}

fn wire(
    graph: &mut Graph<DebugContext>,
    consumer: PassId,
    input: &str,
    producer: PassId,
    output: &str,
) {
    let input = graph
        .input_ref(consumer, input)
        .expect("input edge must be declared");
    let output = graph
        .output_ref(producer, output)
        .expect("output edge must be declared");
    graph.link(input, output);
}

/// The whole frame wired together:
/// global and scene feed post, post re-exports both targets to present.
pub fn build_world_graph(
    context: &mut DebugContext,
) -> Result<(Graph<DebugContext>, PassId), GraphError> {
    let mut graph = Graph::new();

    let global = graph.add_pass(context, "global", CommandSlot::Direct, GlobalPass)?;
    let scene = graph.add_pass(context, "scene", CommandSlot::Scene, ScenePass::default())?;
    let post = graph.add_pass(context, "post", CommandSlot::Post, PostPass::default())?;
    let present = graph.add_pass(context, "present", CommandSlot::Direct, PresentPass::default())?;

    // post.rtv <= global.rtv
    wire(&mut graph, post, "rtv", global, "rtv");
    // post.scene-target <= scene.scene-target
    wire(&mut graph, post, "scene-target", scene, "scene-target");
    // present.rtv <= post.rtv
    wire(&mut graph, present, "rtv", post, "rtv");
    // present.scene-target <= post.scene-target
    wire(&mut graph, present, "scene-target", post, "scene-target");

    Ok((graph, present))
}
