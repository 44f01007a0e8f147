use crate::models::camera_models::{CameraId, CameraInfo};
use crate::models::error::CameraError;
use crate::models::recording_profile::{ProfileQuality, RecordingProfile};
use crate::traits::camera_device::CameraDevice;

/// Platform camera service: enumeration, open, display and profile queries.
///
/// Implemented by a platform backend (e.g. `SimPlatform`). The session moves
/// the platform onto its worker thread, so every call below runs there.
pub trait CameraPlatform: Send + 'static {
    type Device: CameraDevice;

    /// Number of cameras the device exposes; ids are `0..n`.
    fn number_of_cameras(&self) -> u32;

    /// Facing and mount angle of camera `id`.
    ///
    /// Fails with `DeviceNotFound` for an unknown id.
    fn camera_info(&self, id: CameraId) -> Result<CameraInfo, CameraError>;

    /// Acquire camera `id` exclusively.
    ///
    /// Fails with `DeviceUnavailable` when another client holds it.
    fn open(&mut self, id: CameraId) -> Result<Self::Device, CameraError>;

    /// Raw display rotation from the window service (`0..=3`).
    fn display_rotation(&self) -> i32;

    /// Device-recommended recorder settings for camera `id`, if advertised.
    fn recording_profile(&self, id: CameraId, quality: ProfileQuality) -> Option<RecordingProfile>;
}
