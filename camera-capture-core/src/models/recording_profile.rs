use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::camera_models::PreviewSurface;
use super::rotation::Rotation;
use super::size::Size;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    ThreeGpp,
    Mpeg4,
    Webm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    H263,
    H264,
    Mpeg4Sp,
    Vp8,
    Hevc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    AmrNb,
    AmrWb,
    Aac,
    HeAac,
    Vorbis,
    Opus,
}

/// Recording profile qualities a device may advertise, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfileQuality {
    High,
    P2160,
    P1080,
    P720,
    P480,
    Low,
}

impl ProfileQuality {
    /// Descending order used when walking down for a fallback.
    pub const DESCENDING: [ProfileQuality; 6] = [
        Self::High,
        Self::P2160,
        Self::P1080,
        Self::P720,
        Self::P480,
        Self::Low,
    ];

    /// Qualities strictly below `self` in `DESCENDING` order.
    pub fn lower(self) -> impl Iterator<Item = ProfileQuality> {
        Self::DESCENDING.into_iter().skip_while(move |q| *q != self).skip(1)
    }
}

/// Device-recommended recorder settings for one quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingProfile {
    pub quality: ProfileQuality,
    pub file_format: ContainerFormat,
    pub video_codec: VideoCodec,
    pub audio_codec: AudioCodec,
    /// Bits per second.
    pub video_bit_rate: u32,
    /// Bits per second.
    pub audio_bit_rate: u32,
    pub video_frame_rate: u32,
    pub video_frame_width: u32,
    pub video_frame_height: u32,
    pub audio_sample_rate: u32,
    pub audio_channels: u16,
}

impl RecordingProfile {
    pub fn frame_size(&self) -> Size {
        Size::new(self.video_frame_width, self.video_frame_height)
    }
}

/// Sizes and recorder settings negotiated for one open session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityProfile {
    pub preview_size: Size,
    pub photo_size: Size,
    pub video_size: Size,
    pub recording: RecordingProfile,
}

/// Everything a recorder needs before `prepare`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecorderConfig {
    pub output_path: PathBuf,
    pub profile: RecordingProfile,
    pub video_size: Size,
    pub orientation_hint: Rotation,
    pub max_file_size: Option<u64>,
    pub max_duration: Option<Duration>,
    pub preview_surface: Option<PreviewSurface>,
}

/// Hard limit a recorder reports when it stops itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecorderLimit {
    MaxDurationReached,
    MaxFileSizeReached,
}
