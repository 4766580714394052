use arrayvec::ArrayVec;

use magpie_rhi::{CommandRecorder, RenderContext, StateTransition};

use crate::edge::{input_label, output_state, resolve_output, InputRef};
use crate::error::GraphError;
use crate::graph::Graph;
use crate::pass::PassId;

const MAX_TRANSITION_PER_BATCH: usize = 64;

/// Dependency tree rooted at the frame's root pass. The same pass may appear
/// under several parents (diamond dependencies); the visited set collapses
/// the duplicates at execution time.
struct PassTree {
    pass: PassId,
    children: Vec<PassTree>,
}

/// Per-frame scheduler: resolves the dependency tree below a root, then
/// walks it post-order, wiring inputs, batching the state transitions each
/// pass needs and invoking the passes. Lives for one `execute` call.
pub(crate) struct GraphBuilder<'a, C: RenderContext> {
    graph: &'a mut Graph<C>,
    context: &'a mut C,
    visited: Vec<bool>,
}

impl<'a, C: RenderContext + 'static> GraphBuilder<'a, C> {
    pub(crate) fn new(graph: &'a mut Graph<C>, context: &'a mut C) -> Self {
        let pass_count = graph.passes.len();
        Self {
            graph,
            context,
            visited: vec![false; pass_count],
        }
    }

    pub(crate) fn execute(mut self, root: PassId) -> Result<(), GraphError> {
        let tree = self.build(root, &mut Vec::new())?;
        self.run(&tree)?;

        if log::log_enabled!(log::Level::Debug) {
            for (index, node) in self.graph.passes.iter().enumerate() {
                if !self.visited[index] {
                    log::debug!(
                        "pass `{}` is not reachable from `{}`, skipped this frame",
                        node.name,
                        self.graph.pass_name(root)
                    );
                }
            }
        }

        Ok(())
    }

    /// Phase 1: resolve the tree of producers below `pass` through the
    /// wiring table. A missing wire is fatal before anything executes. The
    /// in-progress stack catches cyclic wiring instead of recursing forever.
    fn build(&self, pass: PassId, stack: &mut Vec<PassId>) -> Result<PassTree, GraphError> {
        if stack.contains(&pass) {
            let chain = stack
                .iter()
                .chain(std::iter::once(&pass))
                .map(|id| self.graph.pass_name(*id))
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(GraphError::DependencyCycle { chain });
        }

        stack.push(pass);

        let mut children = Vec::new();
        for index in 0..self.graph.passes[pass.index()].inputs.len() {
            let input = InputRef {
                pass,
                index: index as u32,
            };
            let source = self.graph.wires.get(&input).copied().ok_or_else(|| {
                GraphError::UnresolvedInput {
                    edge: input_label(&self.graph.passes, input),
                }
            })?;

            children.push(self.build(source.pass, stack)?);
        }

        stack.pop();
        Ok(PassTree { pass, children })
    }

    /// Phase 2: post-order walk. Each pass runs at most once per frame no
    /// matter how many consumers pulled it into the tree.
    fn run(&mut self, tree: &PassTree) -> Result<(), GraphError> {
        let index = tree.pass.index();
        if self.visited[index] {
            return Ok(());
        }
        self.visited[index] = true;

        // producers first
        for child in &tree.children {
            self.run(child)?;
        }

        self.wire_barriers(tree.pass)?;

        log::trace!(
            "executing pass `{}`",
            self.graph.passes[tree.pass.index()].name
        );
        self.graph.run_pass_logic(self.context, tree.pass)
    }

    /// Rebind every input of `pass` to its current producer and record one
    /// transition for each state mismatch. Batches go to the recorder in
    /// chunks; a pass with no mismatches records nothing at all.
    fn wire_barriers(&mut self, pass: PassId) -> Result<(), GraphError> {
        let slot = self.graph.passes[pass.index()].slot;
        let input_count = self.graph.passes[pass.index()].inputs.len();

        let mut batch: ArrayVec<StateTransition, MAX_TRANSITION_PER_BATCH> = ArrayVec::new();

        for index in 0..input_count {
            let input = InputRef {
                pass,
                index: index as u32,
            };

            // refetched from the wiring table so relinks take effect here
            let source = self.graph.wires.get(&input).copied().ok_or_else(|| {
                GraphError::UnresolvedInput {
                    edge: input_label(&self.graph.passes, input),
                }
            })?;

            self.graph.bind_input(input, source);

            let before = output_state(&self.graph.passes, source);
            let after = self.graph.passes[pass.index()].inputs[index].state;
            if before == after {
                continue;
            }

            let resource = resolve_output(&self.graph.passes, source)?;
            let handle = self.graph.resources.get(resource).handle();

            if batch.is_full() {
                self.context.recorder(slot).transition(&batch);
                batch.clear();
            }
            batch.push(StateTransition::new(handle, before, after));
        }

        if !batch.is_empty() {
            self.context.recorder(slot).transition(&batch);
        }

        Ok(())
    }
}
