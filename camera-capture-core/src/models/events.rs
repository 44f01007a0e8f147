use std::path::PathBuf;

use super::camera_models::CameraId;
use super::capture_result::{PhotoResult, VideoResult};
use super::error::CameraError;
use super::size::Size;

/// Notification posted from the camera worker to the caller's context.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraEvent {
    Opened {
        camera_id: CameraId,
        preview_size: Size,
    },
    OpenError {
        camera_id: CameraId,
        error: CameraError,
    },
    /// The preview stream is live on the bound surface.
    Ready,
    PreviewError {
        error: CameraError,
    },
    Closed {
        camera_id: CameraId,
    },
    PhotoTaken(PhotoResult),
    PhotoError {
        path: PathBuf,
        error: CameraError,
    },
    VideoRecordStarted {
        video_size: Size,
    },
    VideoRecordStopped(VideoResult),
    VideoRecordError {
        path: PathBuf,
        error: CameraError,
    },
}

impl CameraEvent {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::OpenError { .. }
                | Self::PreviewError { .. }
                | Self::PhotoError { .. }
                | Self::VideoRecordError { .. }
        )
    }
}
