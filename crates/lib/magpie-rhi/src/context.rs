use thiserror::Error;

use crate::barrier::StateTransition;
use crate::resource::{ResourceBinding, ResourceDesc};

#[derive(Debug, Error)]
pub enum RhiError {
    #[error("failed to create resource `{name}`: {reason}")]
    ResourceCreation { name: String, reason: String },

    #[error("command submission failed: {0}")]
    Submit(String),

    #[error("present failed: {0}")]
    Present(String),
}

/// Which command-recording target a pass records into.
///
/// Slots let the frame keep independent command streams (scene rendering,
/// post processing) that the context submits together in slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandSlot {
    Direct,
    Scene,
    Post,
}

impl CommandSlot {
    pub const COUNT: usize = 3;

    pub fn index(self) -> usize {
        match self {
            CommandSlot::Direct => 0,
            CommandSlot::Scene => 1,
            CommandSlot::Post => 2,
        }
    }
}

/// Recording surface the scheduler drives.
///
/// The graph itself only ever records transition barriers; concrete recorders
/// expose whatever extra recording surface their passes need.
pub trait CommandRecorder {
    /// Record a batch of resource state transitions.
    /// The scheduler never calls this with an empty batch.
    fn transition(&mut self, barriers: &[StateTransition]);
}

/// The device-side collaborator of the render graph.
///
/// Everything the graph needs from the outside world goes through here:
/// resource creation, per-frame command recording, submission and present.
/// The graph never stores a context; one is lent to it for each call.
pub trait RenderContext {
    type Recorder: CommandRecorder;

    /// Resource factory. `name` is for device-side debug labels only.
    fn create_resource(
        &mut self,
        name: &str,
        desc: &ResourceDesc,
    ) -> Result<ResourceBinding, RhiError>;

    /// Reset and open all command recorders for a new frame.
    fn begin_frame(&mut self);

    fn recorder(&mut self, slot: CommandSlot) -> &mut Self::Recorder;

    /// Close all command recorders.
    fn end_frame(&mut self);

    /// Execute the recorded command streams in slot order.
    fn submit(&mut self) -> Result<(), RhiError>;

    fn present(&mut self) -> Result<(), RhiError>;
}
