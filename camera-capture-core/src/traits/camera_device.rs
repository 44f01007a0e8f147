use crate::models::camera_models::{CameraParameters, PreviewSurface};
use crate::models::error::CameraError;
use crate::models::rotation::Rotation;
use crate::traits::media_recorder::MediaRecorder;

/// An open camera handle.
///
/// Owned exclusively by the session and only touched from its worker.
pub trait CameraDevice: Send + 'static {
    type Recorder: MediaRecorder;

    /// Current parameter block, including the capability snapshot.
    fn parameters(&self) -> Result<CameraParameters, CameraError>;

    /// Write a parameter block back. Rejections map to `ParameterRejected`.
    fn set_parameters(&mut self, params: &CameraParameters) -> Result<(), CameraError>;

    fn set_display_orientation(&mut self, rotation: Rotation) -> Result<(), CameraError>;

    fn set_preview_surface(&mut self, surface: &PreviewSurface) -> Result<(), CameraError>;

    fn start_preview(&mut self) -> Result<(), CameraError>;

    fn stop_preview(&mut self) -> Result<(), CameraError>;

    /// Trigger one still capture and block until the JPEG bytes arrive.
    fn take_picture(&mut self) -> Result<Vec<u8>, CameraError>;

    /// Re-acquire the hardware lock after a recorder used the sensor.
    fn lock(&mut self) -> Result<(), CameraError>;

    /// Release the hardware lock so a recorder can drive the sensor.
    fn unlock(&mut self) -> Result<(), CameraError>;

    /// Create a recorder bound to this (unlocked) camera.
    fn attach_recorder(&mut self) -> Result<Self::Recorder, CameraError>;

    /// Release the hardware. Called exactly once per successful open.
    fn release(&mut self);
}
