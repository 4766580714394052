mod edge;
mod error;
mod graph;
mod graph_builder;
mod pass;
mod resource;

pub use edge::{Buf, InputRef, OutputRef, ResourceMarker, WireHandle, DS, RT};
pub use error::GraphError;
pub use graph::Graph;
pub use pass::{PassApi, PassId, PassSetup, RenderPass};
pub use resource::{Resource, ResourceId};

#[cfg(test)]
pub(crate) mod test_context;
