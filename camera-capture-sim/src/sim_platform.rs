//! In-memory camera service.
//!
//! All devices and recorders created by one `SimPlatform` share a
//! `SimState`. Tests keep a `SimHandle` to that state to inject faults,
//! change the display rotation, fire recorder limits and inspect the calls
//! the session made.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use camera_capture_core::models::camera_models::{CameraId, CameraInfo, CameraParameters};
use camera_capture_core::models::error::{CameraError, RecorderPrepareCause};
use camera_capture_core::models::recording_profile::{
    ProfileQuality, RecorderConfig, RecorderLimit, RecordingProfile,
};
use camera_capture_core::models::rotation::Rotation;
use camera_capture_core::traits::camera_platform::CameraPlatform;

use crate::sim_device::SimDevice;
use crate::sim_recorder::RecorderShared;

/// One simulated camera: static info, the parameter block it reports and
/// the recording profiles it advertises.
#[derive(Debug, Clone)]
pub struct SimCamera {
    pub info: CameraInfo,
    pub parameters: CameraParameters,
    pub profiles: Vec<RecordingProfile>,
}

/// Calls made against simulated hardware, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimCall {
    Open(CameraId),
    SetParameters,
    SetDisplayOrientation(Rotation),
    SetPreviewSurface(u64),
    StartPreview,
    StopPreview,
    TakePicture,
    Lock,
    Unlock,
    AttachRecorder,
    RecorderPrepare,
    RecorderStart,
    RecorderStop,
    RecorderRelease,
    Release(CameraId),
}

/// Failures the simulated hardware can be told to produce.
#[derive(Debug, Clone, Default)]
pub struct SimFaults {
    /// `set_parameters` answers `ParameterRejected`.
    pub reject_parameters: bool,
    /// `set_display_orientation` answers `ParameterRejected`.
    pub reject_display_orientation: bool,
    /// `start_preview` fails fatally.
    pub fail_start_preview: bool,
    /// `take_picture` returns bytes that are not a JPEG stream.
    pub corrupt_frames: bool,
    /// `take_picture` panics, as a misbehaving driver binding would.
    pub crash_on_capture: bool,
    /// `MediaRecorder::prepare` fails with this cause.
    pub fail_prepare: Option<RecorderPrepareCause>,
}

#[derive(Default)]
pub struct SimState {
    pub cameras: Vec<SimCamera>,
    /// Raw value reported as the display rotation (valid range `0..=3`).
    pub display_rotation: i32,
    /// Cameras held by "another process".
    pub busy: HashSet<CameraId>,
    pub open: HashSet<CameraId>,
    pub faults: SimFaults,
    pub calls: Vec<SimCall>,
    pub applied_parameters: Option<CameraParameters>,
    pub last_recorder_config: Option<RecorderConfig>,
    pub(crate) recorder: Option<Arc<Mutex<RecorderShared>>>,
}

impl SimState {
    pub(crate) fn record(&mut self, call: SimCall) {
        log::trace!("sim call {:?}", call);
        self.calls.push(call);
    }
}

/// Shared view of a `SimPlatform`'s state.
#[derive(Clone)]
pub struct SimHandle {
    state: Arc<Mutex<SimState>>,
}

impl SimHandle {
    pub fn set_display_rotation(&self, raw: i32) {
        self.state.lock().display_rotation = raw;
    }

    /// Mark camera `id` as held by another client.
    pub fn set_busy(&self, id: CameraId, busy: bool) {
        let mut state = self.state.lock();
        if busy {
            state.busy.insert(id);
        } else {
            state.busy.remove(&id);
        }
    }

    pub fn update_faults<F: FnOnce(&mut SimFaults)>(&self, f: F) {
        f(&mut self.state.lock().faults);
    }

    pub fn calls(&self) -> Vec<SimCall> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, call: SimCall) -> usize {
        self.state.lock().calls.iter().filter(|c| **c == call).count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn is_open(&self, id: CameraId) -> bool {
        self.state.lock().open.contains(&id)
    }

    pub fn applied_parameters(&self) -> Option<CameraParameters> {
        self.state.lock().applied_parameters.clone()
    }

    pub fn last_recorder_config(&self) -> Option<RecorderConfig> {
        self.state.lock().last_recorder_config.clone()
    }

    pub fn is_recording(&self) -> bool {
        self.state
            .lock()
            .recorder
            .as_ref()
            .is_some_and(|r| r.lock().is_recording())
    }

    /// Make the active recorder hit `limit`: it stops itself and then fires
    /// its limit callback. Returns false when nothing is recording.
    pub fn trigger_limit(&self, limit: RecorderLimit) -> bool {
        let Some(recorder) = self.state.lock().recorder.clone() else {
            return false;
        };
        RecorderShared::hit_limit(&recorder, limit)
    }
}

/// Simulated `CameraPlatform`.
pub struct SimPlatform {
    state: Arc<Mutex<SimState>>,
}

impl SimPlatform {
    pub fn new(cameras: Vec<SimCamera>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                cameras,
                ..SimState::default()
            })),
        }
    }

    pub fn handle(&self) -> SimHandle {
        SimHandle {
            state: Arc::clone(&self.state),
        }
    }

    fn camera(&self, id: CameraId) -> Result<SimCamera, CameraError> {
        self.state
            .lock()
            .cameras
            .iter()
            .find(|c| c.info.id == id)
            .cloned()
            .ok_or(CameraError::DeviceNotFound(id))
    }
}

impl CameraPlatform for SimPlatform {
    type Device = SimDevice;

    fn number_of_cameras(&self) -> u32 {
        self.state.lock().cameras.len() as u32
    }

    fn camera_info(&self, id: CameraId) -> Result<CameraInfo, CameraError> {
        self.camera(id).map(|c| c.info)
    }

    fn open(&mut self, id: CameraId) -> Result<SimDevice, CameraError> {
        let camera = self.camera(id)?;

        let mut state = self.state.lock();
        if state.busy.contains(&id) || state.open.contains(&id) {
            return Err(CameraError::DeviceUnavailable(id));
        }
        state.open.insert(id);
        state.record(SimCall::Open(id));
        log::debug!("sim camera {} opened", id);

        Ok(SimDevice::new(id, camera.parameters, Arc::clone(&self.state)))
    }

    fn display_rotation(&self) -> i32 {
        self.state.lock().display_rotation
    }

    fn recording_profile(&self, id: CameraId, quality: ProfileQuality) -> Option<RecordingProfile> {
        self.state
            .lock()
            .cameras
            .iter()
            .find(|c| c.info.id == id)?
            .profiles
            .iter()
            .find(|p| p.quality == quality)
            .copied()
    }
}
