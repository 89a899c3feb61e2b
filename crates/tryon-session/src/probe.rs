//! # Capability Prober
//!
//! Checks for a usable camera before anything is acquired.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::platform::MediaDevices;

/// Non-mutating camera presence check.
pub struct CapabilityProber {
    devices: Arc<dyn MediaDevices>,
}

impl CapabilityProber {
    pub fn new(devices: Arc<dyn MediaDevices>) -> Self {
        CapabilityProber { devices }
    }

    /// Returns whether at least one video input is enumerated.
    ///
    /// Enumeration only; no device is opened or locked. An enumeration
    /// failure reads as "no camera" so the caller surfaces a
    /// device-not-found class error instead of propagating.
    pub async fn probe_camera(&self) -> bool {
        match self.devices.enumerate_devices().await {
            Ok(devices) => {
                let video_inputs = devices.iter().filter(|d| d.is_video_input()).count();
                debug!(total = devices.len(), video_inputs, "Enumerated media devices");
                video_inputs > 0
            }
            Err(e) => {
                warn!(error = %e, "Device enumeration failed, treating as no camera");
                false
            }
        }
    }
}
