use serde::{Deserialize, Serialize};

use super::rotation::Rotation;
use super::size::Size;

/// Platform camera identifier (index into the device list).
pub type CameraId = u32;

/// Direction a camera points relative to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Front,
    Back,
}

/// Static per-device information, available without opening the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraInfo {
    pub id: CameraId,
    pub facing: Facing,
    /// Sensor mount angle relative to the natural device orientation.
    pub mount: Rotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FocusMode {
    Auto,
    Fixed,
    Infinity,
    Macro,
    ContinuousPicture,
    ContinuousVideo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    #[default]
    Auto,
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PictureFormat {
    Jpeg,
    Nv21,
}

/// Opaque handle to a platform preview surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewSurface {
    pub handle: u64,
    pub width: u32,
    pub height: u32,
}

impl PreviewSurface {
    pub fn new(handle: u64, width: u32, height: u32) -> Self {
        Self {
            handle,
            width,
            height,
        }
    }
}

/// Device parameter block: the capability snapshot plus current settings.
///
/// Read with `CameraDevice::parameters`, mutated locally, then written back
/// as a whole with `CameraDevice::set_parameters`.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraParameters {
    pub supported_preview_sizes: Vec<Size>,
    pub supported_picture_sizes: Vec<Size>,
    /// `None` on firmware that cannot report video sizes separately.
    pub supported_video_sizes: Option<Vec<Size>>,
    pub supported_focus_modes: Vec<FocusMode>,
    pub supported_flash_modes: Vec<FlashMode>,
    pub video_stabilization_supported: bool,

    pub preview_size: Option<Size>,
    pub picture_size: Option<Size>,
    pub picture_format: PictureFormat,
    pub jpeg_quality: u8,
    pub focus_mode: Option<FocusMode>,
    pub flash_mode: Option<FlashMode>,
    pub video_stabilization: bool,
}

impl CameraParameters {
    pub fn capabilities(&self) -> CameraCapabilities {
        CameraCapabilities {
            preview_sizes: self.supported_preview_sizes.clone(),
            picture_sizes: self.supported_picture_sizes.clone(),
            video_sizes: self.supported_video_sizes.clone(),
            focus_modes: self.supported_focus_modes.clone(),
            flash_modes: self.supported_flash_modes.clone(),
            video_stabilization: self.video_stabilization_supported,
        }
    }

    pub fn supports_focus(&self, mode: FocusMode) -> bool {
        self.supported_focus_modes.contains(&mode)
    }
}

impl Default for CameraParameters {
    fn default() -> Self {
        Self {
            supported_preview_sizes: Vec::new(),
            supported_picture_sizes: Vec::new(),
            supported_video_sizes: None,
            supported_focus_modes: Vec::new(),
            supported_flash_modes: Vec::new(),
            video_stabilization_supported: false,
            preview_size: None,
            picture_size: None,
            picture_format: PictureFormat::Jpeg,
            jpeg_quality: 90,
            focus_mode: None,
            flash_mode: None,
            video_stabilization: false,
        }
    }
}

/// Read-only capability snapshot taken when the camera is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraCapabilities {
    pub preview_sizes: Vec<Size>,
    pub picture_sizes: Vec<Size>,
    pub video_sizes: Option<Vec<Size>>,
    pub focus_modes: Vec<FocusMode>,
    pub flash_modes: Vec<FlashMode>,
    pub video_stabilization: bool,
}
