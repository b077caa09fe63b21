//! Byte-sized device buffers with a declared access mode, plus the blocking
//! host<->device transfers the demo relies on for ordering.

use bytemuck::{cast_slice, cast_slice_mut};
use opencl3::{
    command_queue::CommandQueue,
    context::Context,
    memory::{Buffer, CL_MEM_READ_ONLY, CL_MEM_WRITE_ONLY},
    types::CL_BLOCKING,
};
use std::{mem, ptr};

use crate::ClError;

/// Access mode from the device's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    WriteOnly,
}

impl Access {
    fn flags(self) -> u64 {
        match self {
            Access::ReadOnly => CL_MEM_READ_ONLY,
            Access::WriteOnly => CL_MEM_WRITE_ONLY,
        }
    }
}

/// Device-side allocation owned by the context, tracked by byte size so a
/// mismatched host slice is rejected before it reaches the driver.
pub struct DeviceBuffer {
    buf: Buffer<u8>,
    bytes: usize,
}

impl DeviceBuffer {
    pub fn new(context: &Context, access: Access, bytes: usize) -> Result<Self, ClError> {
        let buf = Buffer::<u8>::create(context, access.flags(), bytes, ptr::null_mut())?;
        Ok(Self { buf, bytes })
    }

    pub fn len_bytes(&self) -> usize {
        self.bytes
    }

    /// Underlying OpenCL buffer, for kernel argument binding.
    pub fn raw(&self) -> &Buffer<u8> {
        &self.buf
    }

    fn check_len(&self, host_bytes: usize) -> Result<(), ClError> {
        if host_bytes != self.bytes {
            return Err(ClError::SizeMismatch { host: host_bytes, device: self.bytes });
        }
        Ok(())
    }

    /// Blocking host->device copy; device contents equal `host` on return.
    pub fn write_from(&mut self, queue: &CommandQueue, host: &[f32]) -> Result<(), ClError> {
        self.check_len(host.len() * mem::size_of::<f32>())?;
        queue.enqueue_write_buffer(&mut self.buf, CL_BLOCKING, 0, cast_slice(host), &[])?;
        Ok(())
    }

    /// Blocking device->host copy; also the synchronization barrier for any
    /// dispatch enqueued ahead of it on the same queue.
    pub fn read_into(&self, queue: &CommandQueue, host: &mut [f32]) -> Result<(), ClError> {
        self.check_len(host.len() * mem::size_of::<f32>())?;
        queue.enqueue_read_buffer(&self.buf, CL_BLOCKING, 0, cast_slice_mut(host), &[])?;
        Ok(())
    }
}
