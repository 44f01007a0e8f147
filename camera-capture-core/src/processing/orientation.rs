//! Rotation math for the live preview and for captured artifacts.
//!
//! Display rotation and output rotation are separate formulas. Display
//! rotation only affects what is drawn on screen; output rotation is baked
//! into the JPEG EXIF tag and the recorder's orientation hint.

use crate::models::camera_models::{CameraId, CameraInfo, Facing};
use crate::models::rotation::{DisplayRotation, Rotation, SensorPosition};

fn from_degrees(degrees: u32) -> Rotation {
    // Inputs are right angles, so the sum reduced mod 360 is always one too.
    Rotation::from_degrees(degrees % 360).unwrap_or_default()
}

/// Rotation to apply to the preview for the current display orientation.
///
/// Back: `(mount - device + 360) % 360`.
/// Front: `(360 - (mount + device) % 360) % 360`, which undoes the mirror
/// the front sensor applies to its preview.
pub fn resolve_display_rotation(
    mount: Rotation,
    facing: Facing,
    device: DisplayRotation,
) -> Rotation {
    let mount = mount.degrees();
    let device = device.rotation().degrees();
    match facing {
        Facing::Front => {
            let raw = (mount + device) % 360;
            from_degrees((360 - raw) % 360)
        }
        Facing::Back => from_degrees(mount + 360 - device),
    }
}

/// Rotation recorded in the photo EXIF tag and the video orientation hint.
///
/// Front: `(360 + mount + hint) % 360`. Back: `(360 + mount - hint) % 360`.
pub fn resolve_output_rotation(mount: Rotation, facing: Facing, hint: SensorPosition) -> Rotation {
    let mount = mount.degrees();
    let hint = hint.rotation().degrees();
    match facing {
        Facing::Front => from_degrees(360 + mount + hint),
        Facing::Back => from_degrees(360 + mount - hint),
    }
}

/// Front and back cameras found when the session enumerated devices.
///
/// Several back cameras may exist; output rotation therefore keys on the
/// front camera's id rather than on a facing flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CameraRoster {
    pub cameras: Vec<CameraInfo>,
    pub front: Option<CameraInfo>,
    pub back: Option<CameraInfo>,
}

impl CameraRoster {
    pub fn from_infos(cameras: Vec<CameraInfo>) -> Self {
        let front = cameras.iter().rev().find(|c| c.facing == Facing::Front).copied();
        let back = cameras.iter().rev().find(|c| c.facing == Facing::Back).copied();
        Self { cameras, front, back }
    }

    pub fn info(&self, id: CameraId) -> Option<CameraInfo> {
        self.cameras.iter().find(|c| c.id == id).copied()
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    /// Mount and facing used for artifacts shot with camera `id`.
    ///
    /// Anything that is not the front camera uses the back camera's mount.
    pub fn output_lens(&self, id: CameraId) -> Option<(Rotation, Facing)> {
        match self.front {
            Some(front) if front.id == id => Some((front.mount, Facing::Front)),
            _ => self
                .back
                .or_else(|| self.info(id))
                .map(|lens| (lens.mount, Facing::Back)),
        }
    }

    /// Output rotation for camera `id`, or `None` if the roster is empty.
    pub fn output_rotation(&self, id: CameraId, hint: SensorPosition) -> Option<Rotation> {
        self.output_lens(id)
            .map(|(mount, facing)| resolve_output_rotation(mount, facing, hint))
    }
}
