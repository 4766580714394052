use std::collections::HashMap;

use magpie_rhi::{CommandSlot, RenderContext, ResourceBinding, ResourceDesc, ResourceKind};

use crate::edge::{InputRef, OutputRef};
use crate::error::GraphError;
use crate::graph_builder::GraphBuilder;
use crate::pass::{PassApi, PassId, PassNode, PassSetup, RenderPass};
use crate::resource::{Resource, ResourceId, ResourceTable};

/// The frame graph: owns every pass and resource, plus the wiring table
/// mapping each input to the output currently feeding it.
///
/// Passes, resources and wires are registered during a setup phase; after
/// that the graph is driven once per frame with [`Graph::execute`], which
/// schedules the subgraph reachable from the given root. The context is lent
/// to the graph per call and never stored.
pub struct Graph<C: RenderContext> {
    pub(crate) passes: Vec<PassNode<C>>,
    pass_ids: HashMap<String, PassId>,
    pub(crate) resources: ResourceTable,
    /// input -> the output it is reading from
    pub(crate) wires: HashMap<InputRef, OutputRef>,
}

impl<C: RenderContext + 'static> Graph<C> {
    pub fn new() -> Self {
        Self {
            passes: Vec::new(),
            pass_ids: HashMap::new(),
            resources: ResourceTable::new(),
            wires: HashMap::new(),
        }
    }

    /// Register a pass and run its `setup` to declare edges and resources.
    /// Pass names are unique within a graph.
    pub fn add_pass<P: RenderPass<C>>(
        &mut self,
        context: &mut C,
        name: &str,
        slot: CommandSlot,
        mut pass: P,
    ) -> Result<PassId, GraphError> {
        if self.pass_ids.contains_key(name) {
            return Err(GraphError::DuplicatePass {
                name: name.to_string(),
            });
        }

        let id = PassId(self.passes.len() as u32);
        let mut node = PassNode {
            name: name.to_string(),
            slot,
            inputs: Vec::new(),
            outputs: Vec::new(),
            logic: None,
        };

        {
            let mut setup = PassSetup {
                pass: id,
                node: &mut node,
                resources: &mut self.resources,
                context,
            };
            pass.setup(&mut setup)?;
        }

        node.logic = Some(Box::new(pass));
        self.pass_ids.insert(name.to_string(), id);
        self.passes.push(node);

        log::trace!("registered pass `{}`", name);
        Ok(id)
    }

    /// Create a graph-owned resource through the context's factory.
    pub fn add_resource(
        &mut self,
        context: &mut C,
        name: &str,
        desc: &ResourceDesc,
    ) -> Result<ResourceId, GraphError> {
        self.resources.create(context, name, desc)
    }

    /// Adopt an externally owned binding (e.g. the swapchain backbuffer).
    pub fn import_resource(
        &mut self,
        name: &str,
        kind: ResourceKind,
        binding: ResourceBinding,
    ) -> Result<ResourceId, GraphError> {
        self.resources.import(name, kind, binding)
    }

    pub fn resource(&self, id: ResourceId) -> &Resource {
        self.resources.get(id)
    }

    pub fn resource_id(&self, name: &str) -> Option<ResourceId> {
        self.resources.id(name)
    }

    pub fn pass_id(&self, name: &str) -> Option<PassId> {
        self.pass_ids.get(name).copied()
    }

    pub fn pass_name(&self, id: PassId) -> &str {
        &self.passes[id.index()].name
    }

    /// Look up an input edge by its declared name.
    pub fn input_ref(&self, pass: PassId, name: &str) -> Option<InputRef> {
        self.passes[pass.index()]
            .inputs
            .iter()
            .position(|edge| edge.name == name)
            .map(|index| InputRef {
                pass,
                index: index as u32,
            })
    }

    /// Look up an output edge by its declared name.
    pub fn output_ref(&self, pass: PassId, name: &str) -> Option<OutputRef> {
        self.passes[pass.index()]
            .outputs
            .iter()
            .position(|edge| edge.name == name)
            .map(|index| OutputRef {
                pass,
                index: index as u32,
            })
    }

    /// Wire `input` to read from `output`. Relinking the same input replaces
    /// the previous wire; the new producer takes effect on the next traversal.
    pub fn link(&mut self, input: InputRef, output: OutputRef) {
        self.wires.insert(input, output);
    }

    /// Same as [`Graph::link`] with the arguments in producer-first order.
    pub fn connect(&mut self, source: OutputRef, target: InputRef) {
        self.link(target, source);
    }

    /// Run every pass's `init` hook once and submit the warm-up commands
    /// they recorded.
    pub fn start(&mut self, context: &mut C) -> Result<(), GraphError> {
        log::trace!("starting graph with {} passes", self.passes.len());
        context.begin_frame();

        for index in 0..self.passes.len() {
            let mut logic = self.passes[index]
                .logic
                .take()
                .expect("pass logic missing during start");
            let result = logic.init(context);
            self.passes[index].logic = Some(logic);

            result.map_err(|source| GraphError::PassStartup {
                pass: self.passes[index].name.clone(),
                source,
            })?;
        }

        context.end_frame();
        context.submit()?;
        Ok(())
    }

    /// Run every pass's `shutdown` hook once.
    pub fn stop(&mut self, context: &mut C) {
        for index in 0..self.passes.len() {
            let mut logic = self.passes[index]
                .logic
                .take()
                .expect("pass logic missing during stop");
            logic.shutdown(context);
            self.passes[index].logic = Some(logic);
        }
        log::trace!("graph stopped");
    }

    /// Render one frame rooted at `root`: resolve the reachable dependency
    /// tree, execute each pass exactly once in producers-first order with
    /// the barriers its inputs require, then submit and present.
    pub fn execute(&mut self, context: &mut C, root: PassId) -> Result<(), GraphError> {
        context.begin_frame();
        let result = GraphBuilder::new(self, context).execute(root);
        context.end_frame();
        result?;

        context.submit()?;
        context.present()?;
        Ok(())
    }

    /// Rebind an input's live edge for the current traversal.
    pub(crate) fn bind_input(&mut self, input: InputRef, source: OutputRef) {
        self.passes[input.pass.index()].inputs[input.index as usize].bound = Some(source);
    }

    /// Run one pass's `execute` with a scoped api. The logic box is taken
    /// out of the arena so the pass can read the arena underneath it.
    pub(crate) fn run_pass_logic(
        &mut self,
        context: &mut C,
        pass: PassId,
    ) -> Result<(), GraphError> {
        let mut logic = self.passes[pass.index()]
            .logic
            .take()
            .expect("pass logic missing during execute");

        let result = {
            let mut api = PassApi {
                context,
                slot: self.passes[pass.index()].slot,
                passes: &self.passes,
                resources: &self.resources,
            };
            logic.execute(&mut api)
        };

        self.passes[pass.index()].logic = Some(logic);

        result.map_err(|source| GraphError::PassExecution {
            pass: self.passes[pass.index()].name.clone(),
            source,
        })
    }
}

impl<C: RenderContext + 'static> Default for Graph<C> {
    fn default() -> Self {
        Self::new()
    }
}
