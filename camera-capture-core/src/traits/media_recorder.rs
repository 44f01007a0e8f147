use std::sync::Arc;

use crate::models::error::CameraError;
use crate::models::recording_profile::{RecorderConfig, RecorderLimit};

/// Callback invoked when the recorder stops itself on a hard limit.
///
/// Fires on the recorder's own thread; keep it minimal.
pub type RecorderLimitCallback = Arc<dyn Fn(RecorderLimit) + Send + Sync + 'static>;

/// Platform media recorder lifecycle: configure → prepare → start → stop → release.
pub trait MediaRecorder: Send + 'static {
    fn configure(&mut self, config: &RecorderConfig) -> Result<(), CameraError>;

    /// Register the limit callback. Only called when a limit is configured.
    fn set_limit_callback(&mut self, callback: RecorderLimitCallback);

    /// Fails with `RecorderPrepare` for bad state or I/O problems.
    fn prepare(&mut self) -> Result<(), CameraError>;

    fn start(&mut self) -> Result<(), CameraError>;

    /// Stop and finalize the container.
    ///
    /// Returns `RecorderAlreadyStopped` when a limit already stopped it.
    fn stop(&mut self) -> Result<(), CameraError>;

    fn release(&mut self);
}
