//! Device selection and the capability report.
//!
//! Selection is an explicit value rather than an ambient "first GPU found"
//! so the policy can be overridden (and exercised empty in tests). The
//! default policy matches the demo: first platform, every device type.

use opencl3::{
    device::{Device, CL_DEVICE_TYPE_ALL},
    platform::get_platforms,
};

use crate::ClError;

/// The devices the rest of the workflow is allowed to touch, in discovery
/// order. The first entry is the one the queue is bound to.
pub struct Selection {
    devices: Vec<Device>,
}

impl Selection {
    /// First platform, all device types under it. An empty device list is
    /// not an error here; it surfaces as [`ClError::NoDevice`] when the
    /// context is created.
    pub fn discover() -> Result<Self, ClError> {
        let mut platforms = get_platforms()?;
        if platforms.is_empty() {
            return Err(ClError::NoPlatform);
        }
        let platform = platforms.remove(0);
        let devices = platform
            .get_devices(CL_DEVICE_TYPE_ALL)?
            .into_iter()
            .map(Device::new)
            .collect();
        Ok(Self { devices })
    }

    /// Explicit selection, bypassing discovery.
    pub fn from_devices(devices: Vec<Device>) -> Self {
        Self { devices }
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// The device the command queue is created on.
    pub fn primary(&self) -> Result<&Device, ClError> {
        self.devices.first().ok_or(ClError::NoDevice)
    }

    /// Capability report, one block per device. Queries only; the caller
    /// decides where it is printed.
    pub fn report(&self) -> Result<String, ClError> {
        let mut out = format!("Num devices : {}\n", self.devices.len());
        for (i, dev) in self.devices.iter().enumerate() {
            out.push_str(&format!("Device [{i}]\n"));
            out.push_str(&format!("\tname: {}\n", dev.name()?));
            out.push_str(&format!("\tavailability: {}\n", dev.available()?));
            out.push_str(&format!("\tmax compute units: {}\n", dev.max_compute_units()?));
            out.push_str(&format!(
                "\tmax work item dimensions: {}\n",
                dev.max_work_item_dimensions()?
            ));
            out.push_str(&format!("\tmax work group size: {}\n", dev.max_work_group_size()?));
            out.push_str(&format!("\tmax frequency: {}\n", dev.max_clock_frequency()?));
            out.push_str(&format!("\tmax mem alloc size: {}\n\n", dev.max_mem_alloc_size()?));
        }
        Ok(out)
    }
}
