use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::camera_models::CameraId;
use super::recording_profile::RecorderLimit;
use super::rotation::ExifOrientation;
use super::size::Size;

/// Result of a completed photo capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoResult {
    pub id: String,
    pub camera_id: CameraId,
    pub path: PathBuf,
    pub size: Size,
    pub orientation: ExifOrientation,
    /// SHA-256 hex digest of the bytes the sensor delivered.
    pub checksum: String,
    pub created_at: String,
}

impl PhotoResult {
    pub fn new(
        camera_id: CameraId,
        path: PathBuf,
        size: Size,
        orientation: ExifOrientation,
        checksum: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            camera_id,
            path,
            size,
            orientation,
            checksum,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Why a recording ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Requested,
    Limit(RecorderLimit),
}

/// Result of a finished recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoResult {
    pub id: String,
    pub camera_id: CameraId,
    pub path: PathBuf,
    pub video_size: Size,
    pub stop_reason: StopReason,
    pub created_at: String,
}

impl VideoResult {
    pub fn new(
        camera_id: CameraId,
        path: PathBuf,
        video_size: Size,
        stop_reason: StopReason,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            camera_id,
            path,
            video_size,
            stop_reason,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
