//! The staged workflow: context/queue setup, input staging, program build,
//! dispatch and blocking readback. Each stage returns `Result` so a failure
//! anywhere unwinds to the single boundary in `main`.

use opencl3::{
    command_queue::CommandQueue,
    context::Context,
    kernel::Kernel,
    program::Program,
};
use std::{fs, path::Path, ptr};

use crate::{Access, ClError, DeviceBuffer, LaunchConfig, Selection};

/// Entry point expected in the kernel source.
pub const KERNEL_NAME: &str = "add_vectors";

/// Whole-file read of the kernel source. A missing or unreadable file is a
/// build-stage failure, reported through the same error channel as the
/// compute API.
pub fn load_kernel_source<P: AsRef<Path>>(path: P) -> Result<String, ClError> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|e| ClError::Source(format!("{}: {e}", path.display())))
}

/// Context plus the one command queue, bound to the primary selected device.
pub struct Pipeline {
    context: Context,
    queue: CommandQueue,
}

/// The three device buffers of one run: two staged inputs, one output.
pub struct Staged {
    pub a: DeviceBuffer,
    pub b: DeviceBuffer,
    pub out: DeviceBuffer,
}

impl Pipeline {
    pub fn create(selection: &Selection) -> Result<Self, ClError> {
        let device = selection.primary()?;
        let context = Context::from_device(device)?;
        let queue = CommandQueue::create(&context, device.id(), 0)?;
        Ok(Self { context, queue })
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    /// Allocates the three buffers ({read-only, read-only, write-only}, all
    /// `cfg.byte_size()` bytes) and blocking-writes A then B through the
    /// queue.
    pub fn stage_inputs(
        &self,
        cfg: &LaunchConfig,
        a: &[f32],
        b: &[f32],
    ) -> Result<Staged, ClError> {
        let bytes = cfg.byte_size();
        let mut buf_a = DeviceBuffer::new(&self.context, Access::ReadOnly, bytes)?;
        let mut buf_b = DeviceBuffer::new(&self.context, Access::ReadOnly, bytes)?;
        let buf_out = DeviceBuffer::new(&self.context, Access::WriteOnly, bytes)?;
        buf_a.write_from(&self.queue, a)?;
        buf_b.write_from(&self.queue, b)?;
        Ok(Staged { a: buf_a, b: buf_b, out: buf_out })
    }

    /// Compiles the source for the context devices and extracts the
    /// `add_vectors` entry point. The compiler log rides along in the error
    /// when the build fails.
    pub fn build_kernel(&self, source: &str) -> Result<Kernel, ClError> {
        let program = Program::create_and_build_from_source(&self.context, source, "")
            .map_err(|log| ClError::Build(log.to_string()))?;
        Ok(Kernel::create(&program, KERNEL_NAME)?)
    }

    /// Binds the buffers as positional arguments 0..=2 and enqueues a 1-D
    /// range of `vector_size` items in groups of `work_group_size`. The
    /// enqueue does not block; the blocking readback is the barrier.
    pub fn dispatch(
        &self,
        kernel: &Kernel,
        staged: &Staged,
        cfg: &LaunchConfig,
    ) -> Result<(), ClError> {
        cfg.validate()?;
        kernel.set_arg(0, staged.a.raw())?;
        kernel.set_arg(1, staged.b.raw())?;
        kernel.set_arg(2, staged.out.raw())?;
        let global = [cfg.vector_size];
        let local = [cfg.work_group_size];
        self.queue.enqueue_nd_range_kernel(
            kernel.get(),
            1,
            ptr::null(),
            global.as_ptr(),
            local.as_ptr(),
            &[],
        )?;
        Ok(())
    }

    /// Blocking read of the output buffer; the preceding dispatch has
    /// completed by the time this returns.
    pub fn read_result(&self, staged: &Staged, cfg: &LaunchConfig) -> Result<Vec<f32>, ClError> {
        let mut out = vec![0.0_f32; cfg.vector_size];
        staged.out.read_into(&self.queue, &mut out)?;
        Ok(out)
    }
}

/// The full staged workflow in one call, as used by the tests and bench.
pub fn run(
    selection: &Selection,
    cfg: &LaunchConfig,
    source: &str,
    a: &[f32],
    b: &[f32],
) -> Result<Vec<f32>, ClError> {
    let pipeline = Pipeline::create(selection)?;
    let staged = pipeline.stage_inputs(cfg, a, b)?;
    let kernel = pipeline.build_kernel(source)?;
    pipeline.dispatch(&kernel, &staged, cfg)?;
    pipeline.read_result(&staged, cfg)
}
