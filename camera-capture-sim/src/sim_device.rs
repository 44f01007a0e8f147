use std::sync::Arc;

use parking_lot::Mutex;

use camera_capture_core::models::camera_models::{CameraId, CameraParameters, PreviewSurface};
use camera_capture_core::models::error::CameraError;
use camera_capture_core::models::rotation::Rotation;
use camera_capture_core::models::size::Size;
use camera_capture_core::traits::camera_device::CameraDevice;

use crate::sim_platform::{SimCall, SimState};
use crate::sim_recorder::SimRecorder;

/// Simulated open camera.
///
/// Starts locked to this client, like a freshly opened device.
pub struct SimDevice {
    id: CameraId,
    params: CameraParameters,
    state: Arc<Mutex<SimState>>,
    locked: bool,
    previewing: bool,
    surface: Option<PreviewSurface>,
    released: bool,
}

impl SimDevice {
    pub(crate) fn new(id: CameraId, params: CameraParameters, state: Arc<Mutex<SimState>>) -> Self {
        Self {
            id,
            params,
            state,
            locked: true,
            previewing: false,
            surface: None,
            released: false,
        }
    }

    pub fn id(&self) -> CameraId {
        self.id
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_previewing(&self) -> bool {
        self.previewing
    }

    fn record(&self, call: SimCall) {
        self.state.lock().record(call);
    }

    fn check_supported(params: &CameraParameters) -> Result<(), CameraError> {
        if let Some(size) = params.preview_size {
            if !params.supported_preview_sizes.contains(&size) {
                return Err(CameraError::ParameterRejected(format!("preview size {}", size)));
            }
        }
        if let Some(size) = params.picture_size {
            let allowed = if params.supported_picture_sizes.is_empty() {
                &params.supported_preview_sizes
            } else {
                &params.supported_picture_sizes
            };
            if !allowed.contains(&size) {
                return Err(CameraError::ParameterRejected(format!("picture size {}", size)));
            }
        }
        if let Some(mode) = params.focus_mode {
            if !params.supports_focus(mode) {
                return Err(CameraError::ParameterRejected(format!("focus mode {:?}", mode)));
            }
        }
        if let Some(mode) = params.flash_mode {
            if !params.supported_flash_modes.contains(&mode) {
                return Err(CameraError::ParameterRejected(format!("flash mode {:?}", mode)));
            }
        }
        if params.video_stabilization && !params.video_stabilization_supported {
            return Err(CameraError::ParameterRejected("video stabilization".into()));
        }
        if !(1..=100).contains(&params.jpeg_quality) {
            return Err(CameraError::ParameterRejected(format!(
                "jpeg quality {}",
                params.jpeg_quality
            )));
        }
        Ok(())
    }
}

impl CameraDevice for SimDevice {
    type Recorder = SimRecorder;

    fn parameters(&self) -> Result<CameraParameters, CameraError> {
        Ok(self.params.clone())
    }

    fn set_parameters(&mut self, params: &CameraParameters) -> Result<(), CameraError> {
        let mut state = self.state.lock();
        state.record(SimCall::SetParameters);
        if state.faults.reject_parameters {
            return Err(CameraError::ParameterRejected("setParameters failed".into()));
        }
        Self::check_supported(params)?;
        self.params = params.clone();
        state.applied_parameters = Some(params.clone());
        Ok(())
    }

    fn set_display_orientation(&mut self, rotation: Rotation) -> Result<(), CameraError> {
        let mut state = self.state.lock();
        state.record(SimCall::SetDisplayOrientation(rotation));
        if state.faults.reject_display_orientation {
            return Err(CameraError::ParameterRejected("display orientation".into()));
        }
        Ok(())
    }

    fn set_preview_surface(&mut self, surface: &PreviewSurface) -> Result<(), CameraError> {
        self.record(SimCall::SetPreviewSurface(surface.handle));
        self.surface = Some(surface.clone());
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), CameraError> {
        let mut state = self.state.lock();
        state.record(SimCall::StartPreview);
        if state.faults.fail_start_preview {
            return Err(CameraError::Platform("startPreview failed".into()));
        }
        if self.surface.is_none() {
            return Err(CameraError::Platform("no preview surface".into()));
        }
        self.previewing = true;
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<(), CameraError> {
        self.record(SimCall::StopPreview);
        self.previewing = false;
        Ok(())
    }

    fn take_picture(&mut self) -> Result<Vec<u8>, CameraError> {
        let (corrupt, crash) = {
            let mut state = self.state.lock();
            state.record(SimCall::TakePicture);
            (state.faults.corrupt_frames, state.faults.crash_on_capture)
        };
        if crash {
            panic!("simulated camera driver crash");
        }
        if !self.locked {
            return Err(CameraError::Platform("camera is unlocked".into()));
        }
        if corrupt {
            return Ok(b"garbled sensor output".to_vec());
        }
        let size = self
            .params
            .picture_size
            .unwrap_or_else(|| Size::new(640, 480));
        Ok(synthetic_jpeg(size, self.params.jpeg_quality))
    }

    fn lock(&mut self) -> Result<(), CameraError> {
        self.record(SimCall::Lock);
        self.locked = true;
        Ok(())
    }

    fn unlock(&mut self) -> Result<(), CameraError> {
        self.record(SimCall::Unlock);
        self.locked = false;
        Ok(())
    }

    fn attach_recorder(&mut self) -> Result<SimRecorder, CameraError> {
        self.record(SimCall::AttachRecorder);
        if self.locked {
            return Err(CameraError::prepare_state(
                "camera must be unlocked before attaching a recorder",
            ));
        }
        Ok(SimRecorder::new(Arc::clone(&self.state)))
    }

    fn release(&mut self) {
        if self.released {
            log::warn!("sim camera {} released twice", self.id);
            return;
        }
        self.released = true;
        self.previewing = false;
        let mut state = self.state.lock();
        state.open.remove(&self.id);
        state.record(SimCall::Release(self.id));
        log::debug!("sim camera {} released", self.id);
    }
}

/// Minimal JFIF stream: SOI, APP0, a comment naming the frame, a stub scan
/// and EOI.
pub fn synthetic_jpeg(size: Size, quality: u8) -> Vec<u8> {
    let mut jpeg = vec![0xFF, 0xD8];

    jpeg.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    jpeg.extend_from_slice(b"JFIF\0");
    jpeg.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);

    let comment = format!("sim frame {} q{}", size, quality);
    jpeg.extend_from_slice(&[0xFF, 0xFE]);
    jpeg.extend_from_slice(&((comment.len() + 2) as u16).to_be_bytes());
    jpeg.extend_from_slice(comment.as_bytes());

    jpeg.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
    jpeg.extend((0..64u8).map(|i| i.wrapping_mul(37)).filter(|b| *b != 0xFF));
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

#[cfg(test)]
mod tests {
    use super::*;
    use camera_capture_core::storage::exif::{read_orientation, stamp_orientation};
    use camera_capture_core::models::rotation::ExifOrientation;

    #[test]
    fn synthetic_frames_accept_an_orientation_stamp() {
        let jpeg = synthetic_jpeg(Size::new(1920, 1080), 90);
        assert_eq!(read_orientation(&jpeg), None);

        let stamped = stamp_orientation(&jpeg, ExifOrientation::Rotate270).unwrap();
        assert_eq!(read_orientation(&stamped), Some(ExifOrientation::Rotate270));
        assert!(stamped.ends_with(&[0xFF, 0xD9]));
    }
}
