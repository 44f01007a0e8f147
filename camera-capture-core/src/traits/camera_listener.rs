use std::path::Path;

use crate::models::camera_models::CameraId;
use crate::models::capture_result::{PhotoResult, VideoResult};
use crate::models::error::CameraError;
use crate::models::size::Size;

/// Result sink for camera session notifications.
///
/// Methods are invoked by `CameraEvents::dispatch_pending` on whichever
/// thread drains the events (normally the UI thread), never on the camera
/// worker. Every method defaults to a no-op.
pub trait CameraListener {
    fn on_opened(&self, _camera_id: CameraId, _preview_size: Size) {}

    fn on_open_error(&self, _camera_id: CameraId, _error: &CameraError) {}

    /// Preview stream is live.
    fn on_ready(&self) {}

    fn on_preview_error(&self, _error: &CameraError) {}

    fn on_closed(&self, _camera_id: CameraId) {}

    fn on_photo_taken(&self, _result: &PhotoResult) {}

    fn on_photo_error(&self, _path: &Path, _error: &CameraError) {}

    fn on_video_record_started(&self, _video_size: Size) {}

    fn on_video_record_stopped(&self, _result: &VideoResult) {}

    fn on_video_record_error(&self, _path: &Path, _error: &CameraError) {}
}
