use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::camera_models::FlashMode;
use super::error::CameraError;
use super::rotation::SensorPosition;

/// What the session is being opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaAction {
    Photo,
    Video,
    #[default]
    Unspecified,
}

impl MediaAction {
    /// Photo and unspecified sessions size the preview after the photo.
    pub fn is_photo_oriented(self) -> bool {
        matches!(self, Self::Photo | Self::Unspecified)
    }

    pub fn wants_stabilization(self) -> bool {
        matches!(self, Self::Video | Self::Unspecified)
    }
}

/// Coarse quality tier for photos and recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaQuality {
    /// Let the device recommend a profile for the duration/file-size budget.
    Auto,
    Lowest,
    Low,
    Medium,
    #[default]
    High,
    Highest,
}

/// Configuration for a camera session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfiguration {
    pub media_action: MediaAction,

    pub media_quality: MediaQuality,

    /// Flash mode applied on every preview bind (default: auto).
    pub flash_mode: FlashMode,

    /// How the device is held; drives the photo EXIF tag and video hint.
    pub sensor_position: SensorPosition,

    /// JPEG quality applied before capture (default: 75). Valid range 1..=100.
    pub jpeg_quality: u8,

    /// Recorder stops itself once the file reaches this many bytes.
    pub video_file_size_limit: Option<u64>,

    /// Recorder stops itself after this long.
    #[serde(with = "optional_millis")]
    pub video_duration_limit: Option<Duration>,

    /// Shortest clip the `Auto` quality must be able to fit in the size limit.
    #[serde(with = "millis")]
    pub minimum_video_duration: Duration,
}

impl CameraConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(format!("unsupported jpeg quality: {}", self.jpeg_quality));
        }
        if self.video_file_size_limit == Some(0) {
            return Err("video file size limit must be positive".into());
        }
        if self.video_duration_limit == Some(Duration::ZERO) {
            return Err("video duration limit must be positive".into());
        }
        if self.media_quality == MediaQuality::Auto && self.minimum_video_duration.is_zero() {
            return Err("auto quality needs a minimum video duration".into());
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, CameraError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            CameraError::ConfigurationFailed(format!("invalid configuration: {}", e))
        })?;
        config.validate().map_err(CameraError::ConfigurationFailed)?;
        Ok(config)
    }
}

impl Default for CameraConfiguration {
    fn default() -> Self {
        Self {
            media_action: MediaAction::Unspecified,
            media_quality: MediaQuality::High,
            flash_mode: FlashMode::Auto,
            sensor_position: SensorPosition::Up,
            jpeg_quality: 75,
            video_file_size_limit: None,
            video_duration_limit: None,
            minimum_video_duration: Duration::from_secs(5),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

mod optional_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
