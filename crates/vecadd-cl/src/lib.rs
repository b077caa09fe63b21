//! Host-side building blocks for a single-run OpenCL vector addition demo:
//! device discovery, context/queue setup, buffer staging, program build and
//! a 1-D kernel dispatch with blocking readback.

pub mod buffer;
pub mod device;
pub mod pipeline;

#[cfg(feature = "trace")]
mod trace;
#[cfg(feature = "trace")]
pub use trace::{flush_csv, span, Phase, Span};

pub use buffer::{Access, DeviceBuffer};
pub use device::Selection;
pub use pipeline::{load_kernel_source, Pipeline, Staged, KERNEL_NAME};

use std::mem;

/// Single failure type for the whole workflow. Every staged operation
/// returns `Result<_, ClError>`; the one catch boundary in `main` prints
/// the message and numeric code.
#[derive(thiserror::Error, Debug)]
pub enum ClError {
    #[error("OpenCL error code {0}")]
    Api(i32),
    #[error("no OpenCL platform found")]
    NoPlatform,
    #[error("no compute device in selection")]
    NoDevice,
    #[error("kernel source unreadable: {0}")]
    Source(String),
    #[error("program build failed: {0}")]
    Build(String),
    #[error("global work size {global} is not a multiple of work-group size {local}")]
    Launch { global: usize, local: usize },
    #[error("host slice is {host} bytes but device buffer holds {device}")]
    SizeMismatch { host: usize, device: usize },
}

impl ClError {
    /// Numeric code for the top-level report. API failures keep the code the
    /// driver returned; host-side failures map onto the nearest OpenCL error
    /// constant.
    pub fn code(&self) -> i32 {
        match self {
            ClError::Api(code) => *code,
            ClError::NoPlatform => -1001, // CL_PLATFORM_NOT_FOUND_KHR
            ClError::NoDevice => -1,      // CL_DEVICE_NOT_FOUND
            ClError::Source(_) | ClError::Build(_) => -11, // CL_BUILD_PROGRAM_FAILURE
            ClError::Launch { .. } => -54, // CL_INVALID_WORK_GROUP_SIZE
            ClError::SizeMismatch { .. } => -61, // CL_INVALID_BUFFER_SIZE
        }
    }
}

impl From<opencl3::error_codes::ClError> for ClError {
    fn from(err: opencl3::error_codes::ClError) -> Self {
        ClError::Api(err.0)
    }
}

/// Launch geometry for the one kernel. The defaults reproduce the classic
/// demo sizes; both values are runtime-configurable but `vector_size` must
/// stay an exact multiple of `work_group_size`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Elements per vector, also the global work size.
    pub vector_size: usize,
    /// Work-items per work-group (local size).
    pub work_group_size: usize,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self { vector_size: 1024, work_group_size: 256 }
    }
}

impl LaunchConfig {
    /// Checked before every dispatch: both sizes non-zero, global evenly
    /// divisible by local.
    pub fn validate(&self) -> Result<(), ClError> {
        if self.vector_size == 0
            || self.work_group_size == 0
            || self.vector_size % self.work_group_size != 0
        {
            return Err(ClError::Launch {
                global: self.vector_size,
                local: self.work_group_size,
            });
        }
        Ok(())
    }

    /// Byte size shared by all three device buffers.
    pub fn byte_size(&self) -> usize {
        self.vector_size * mem::size_of::<f32>()
    }
}

/// Renders the result the way the demo prints it: bracketed, each value
/// followed by a comma and a space.
pub fn format_result(values: &[f32]) -> String {
    let mut out = String::from("[ ");
    for v in values {
        out.push_str(&format!("{v}, "));
    }
    out.push(']');
    out
}
