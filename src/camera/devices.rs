//! Camera device enumeration and selection policy.
//!
//! Platforms expose virtual capture devices (OBS, loopback drivers) next
//! to physical cameras; everything here works on the filtered physical
//! list. Labels are only trustworthy after the OS permission prompt has
//! been answered, which is what [`ensure_permission`] forces.

use log::{debug, info};
use nokhwa::NokhwaError;
use nokhwa::pixel_format::RgbAFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use serde::{Deserialize, Serialize};

use crate::error::CameraError;

/// Camera facing preference: front (user-facing) vs back (environment-facing)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Front,
    #[default]
    Back,
}

impl Facing {
    pub fn toggled(self) -> Self {
        match self {
            Facing::Front => Facing::Back,
            Facing::Back => Facing::Front,
        }
    }
}

/// Snapshot of one enumerated video input. Re-queried on demand, never
/// live-updated.
#[derive(Clone, Debug)]
pub struct DeviceDescriptor {
    pub index: CameraIndex,
    pub label: String,
}

const VIRTUAL_LABEL_PATTERNS: &[&str] =
    &["obs", "virtual", "loopback", "droidcam", "dummy", "screen capture"];

const BACK_LABEL_PATTERNS: &[&str] = &["back", "rear", "world", "environment"];

const FRONT_LABEL_PATTERNS: &[&str] = &["front", "user", "integrated", "facetime", "selfie"];

/// Enumerate video inputs, dropping virtual/software capture devices.
pub fn list_physical_cameras() -> Result<Vec<DeviceDescriptor>, CameraError> {
    let all = nokhwa::query(ApiBackend::Auto).map_err(|e| classify(&e))?;

    let devices: Vec<DeviceDescriptor> = all
        .iter()
        .filter(|info| !is_virtual(&info.human_name()))
        .map(|info| DeviceDescriptor {
            index: info.index().clone(),
            label: info.human_name(),
        })
        .collect();

    debug!(
        "enumerated {} video inputs, {} physical",
        all.len(),
        devices.len()
    );
    Ok(devices)
}

/// Whether a camera-switch control makes sense at all.
pub fn can_switch_camera(devices: &[DeviceDescriptor]) -> bool {
    devices.len() > 1
}

/// Pick the default device for a facing preference by label pattern,
/// falling back to the first physical device.
pub fn preferred_default(devices: &[DeviceDescriptor], facing: Facing) -> Option<&DeviceDescriptor> {
    let patterns = match facing {
        Facing::Back => BACK_LABEL_PATTERNS,
        Facing::Front => FRONT_LABEL_PATTERNS,
    };
    devices
        .iter()
        .find(|d| matches_any(&d.label, patterns))
        .or_else(|| devices.first())
}

/// Open and immediately release a throwaway stream so the OS permission
/// prompt is answered before enumeration output is trusted.
pub fn ensure_permission() -> Result<(), CameraError> {
    let requested = RequestedFormat::new::<RgbAFormat>(RequestedFormatType::None);
    let mut probe = nokhwa::Camera::new(CameraIndex::Index(0), requested).map_err(|e| classify(&e))?;
    probe.open_stream().map_err(|e| classify(&e))?;
    let _ = probe.stop_stream();
    info!("camera permission probe succeeded");
    Ok(())
}

fn is_virtual(label: &str) -> bool {
    matches_any(label, VIRTUAL_LABEL_PATTERNS)
}

fn matches_any(label: &str, patterns: &[&str]) -> bool {
    let label = label.to_lowercase();
    patterns.iter().any(|p| label.contains(p))
}

/// Map a backend error to the app's taxonomy. The backends have no
/// dedicated permission variant, so we go by the rendered message.
pub(crate) fn classify(err: &NokhwaError) -> CameraError {
    let message = err.to_string();
    if is_permission_message(&message) {
        CameraError::PermissionDenied(message)
    } else {
        CameraError::DeviceUnavailable(message)
    }
}

fn is_permission_message(message: &str) -> bool {
    let message = message.to_lowercase();
    ["permission", "denied", "not authorized", "access"]
        .iter()
        .any(|needle| message.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(label: &str) -> DeviceDescriptor {
        DeviceDescriptor {
            index: CameraIndex::Index(0),
            label: label.to_string(),
        }
    }

    #[test]
    fn virtual_devices_are_filtered() {
        assert!(is_virtual("OBS Virtual Camera"));
        assert!(is_virtual("Dummy video device (0x0000)"));
        assert!(!is_virtual("Integrated Camera: Integrated C"));
    }

    #[test]
    fn prefers_rear_device_by_label() {
        let devices = vec![device("Front Camera"), device("Back Camera")];
        let picked = preferred_default(&devices, Facing::Back).unwrap();
        assert_eq!(picked.label, "Back Camera");
    }

    #[test]
    fn falls_back_to_first_device() {
        let devices = vec![device("USB2.0 HD UVC WebCam"), device("Capture Two")];
        let picked = preferred_default(&devices, Facing::Back).unwrap();
        assert_eq!(picked.label, "USB2.0 HD UVC WebCam");
    }

    #[test]
    fn switch_needs_two_physical_cameras() {
        assert!(!can_switch_camera(&[device("Only Camera")]));
        assert!(can_switch_camera(&[device("A"), device("B")]));
    }

    #[test]
    fn permission_messages_are_recognized() {
        assert!(is_permission_message("Access denied by user"));
        assert!(is_permission_message("Operation not authorized"));
        assert!(!is_permission_message("device busy"));
    }
}
