use magpie_rhi::{
    CommandRecorder, CommandSlot, CpuDescriptor, DescriptorHeapType, DescriptorView,
    GpuDescriptor, RenderContext, ResourceBinding, ResourceDesc, ResourceHandle, RhiError,
    StateTransition,
};

/// Command recorder that journals everything it is handed, one line per
/// command, so a frame can be read back from the log.
pub struct DebugRecorder {
    label: &'static str,
    commands: Vec<String>,
}

impl DebugRecorder {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            commands: Vec::new(),
        }
    }

    pub fn record(&mut self, command: String) {
        self.commands.push(command);
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.record(format!("viewport {}x{}", width, height));
    }

    pub fn set_render_target(&mut self, color: CpuDescriptor, depth: CpuDescriptor) {
        if depth.is_valid() {
            self.record(format!("render target cpu:{} depth cpu:{}", color.0, depth.0));
        } else {
            self.record(format!("render target cpu:{}", color.0));
        }
    }

    pub fn clear_render_target(&mut self, target: CpuDescriptor, colour: [f32; 4]) {
        self.record(format!("clear cpu:{} to {:?}", target.0, colour));
    }

    pub fn bind_texture(&mut self, texture: GpuDescriptor) {
        self.record(format!("bind texture gpu:{}", texture.0));
    }

    pub fn draw_indexed(&mut self, label: &str, index_count: u32) {
        self.record(format!("draw `{}` ({} indices)", label, index_count));
    }

    fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.commands)
    }
}

impl CommandRecorder for DebugRecorder {
    fn transition(&mut self, barriers: &[StateTransition]) {
        for barrier in barriers {
            self.record(format!(
                "barrier res#{} {} -> {}",
                barrier.resource.0, barrier.before, barrier.after
            ));
        }
    }
}

type UploadCallback = Box<dyn FnOnce() + Send + 'static>;

/// Stand-in device context. Resources are fabricated handles, command
/// streams end up in the log, and uploads complete when the copy queue
/// flushes at submission.
pub struct DebugContext {
    recorders: Vec<DebugRecorder>,
    pending_uploads: Vec<(String, UploadCallback)>,
    next_resource: u64,
    next_descriptor: u64,
    frame: u64,
}

impl DebugContext {
    pub fn new() -> Self {
        let recorders = vec![
            DebugRecorder::new("direct"),
            DebugRecorder::new("scene"),
            DebugRecorder::new("post"),
        ];
        debug_assert_eq!(recorders.len(), CommandSlot::COUNT);

        Self {
            recorders,
            pending_uploads: Vec::new(),
            next_resource: 0,
            next_descriptor: 0,
            frame: 0,
        }
    }

    /// Begin an asynchronous upload. `on_done` fires when the copy queue
    /// flushes with the next submission, never earlier.
    pub fn upload(&mut self, label: &str, size: usize, on_done: impl FnOnce() + Send + 'static) {
        trace!("upload `{}` queued ({} bytes)", label, size);
        self.pending_uploads
            .push((label.to_string(), Box::new(on_done)));
    }

    fn alloc_descriptor(&mut self) -> u64 {
        self.next_descriptor += 1;
        self.next_descriptor
    }
}

impl RenderContext for DebugContext {
    type Recorder = DebugRecorder;

    fn create_resource(
        &mut self,
        name: &str,
        desc: &ResourceDesc,
    ) -> Result<ResourceBinding, RhiError> {
        self.next_resource += 1;
        let handle = ResourceHandle(self.next_resource);
        debug!("created resource `{}` as res#{}: {:?}", name, handle.0, desc);

        let binding = match desc {
            ResourceDesc::RenderTarget { .. } => ResourceBinding::new(handle)
                .with_view(
                    DescriptorHeapType::RenderTarget,
                    DescriptorView {
                        cpu: CpuDescriptor(self.alloc_descriptor()),
                        gpu: None,
                    },
                )
                .with_view(
                    DescriptorHeapType::CbvSrvUav,
                    DescriptorView {
                        cpu: CpuDescriptor(self.alloc_descriptor()),
                        gpu: Some(GpuDescriptor(self.alloc_descriptor())),
                    },
                ),
            ResourceDesc::DepthStencil { .. } => ResourceBinding::new(handle).with_view(
                DescriptorHeapType::DepthStencil,
                DescriptorView {
                    cpu: CpuDescriptor(self.alloc_descriptor()),
                    gpu: None,
                },
            ),
            ResourceDesc::Buffer { .. } => ResourceBinding::new(handle).with_view(
                DescriptorHeapType::CbvSrvUav,
                DescriptorView {
                    cpu: CpuDescriptor(self.alloc_descriptor()),
                    gpu: Some(GpuDescriptor(self.alloc_descriptor())),
                },
            ),
        };

        Ok(binding)
    }

    fn begin_frame(&mut self) {
        self.frame += 1;
        trace!("frame {} begin", self.frame);
    }

    fn recorder(&mut self, slot: CommandSlot) -> &mut DebugRecorder {
        &mut self.recorders[slot.index()]
    }

    fn end_frame(&mut self) {}

    fn submit(&mut self) -> Result<(), RhiError> {
        for recorder in &mut self.recorders {
            let label = recorder.label;
            for command in recorder.drain() {
                debug!("[{}] {}", label, command);
            }
        }

        // the copy queue flushes with the submission; uploads are done now
        for (label, on_done) in self.pending_uploads.drain(..) {
            debug!("upload `{}` complete", label);
            on_done();
        }

        Ok(())
    }

    fn present(&mut self) -> Result<(), RhiError> {
        trace!("frame {} presented", self.frame);
        Ok(())
    }
}

impl Default for DebugContext {
    fn default() -> Self {
        Self::new()
    }
}
