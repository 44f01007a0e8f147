use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

use camera_capture_core::models::error::{CameraError, RecorderPrepareCause};
use camera_capture_core::models::recording_profile::{RecorderConfig, RecorderLimit};
use camera_capture_core::traits::media_recorder::{MediaRecorder, RecorderLimitCallback};

use crate::sim_platform::{SimCall, SimState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderPhase {
    Initial,
    Configured,
    Prepared,
    Recording,
    Stopped,
    Released,
}

/// Recorder state shared with `SimHandle` so tests can fire limits.
pub(crate) struct RecorderShared {
    phase: RecorderPhase,
    config: Option<RecorderConfig>,
    limit_callback: Option<RecorderLimitCallback>,
}

impl RecorderShared {
    pub(crate) fn is_recording(&self) -> bool {
        self.phase == RecorderPhase::Recording
    }

    /// Stop on a hard limit, then notify. The callback runs without the
    /// recorder lock held.
    pub(crate) fn hit_limit(shared: &Arc<Mutex<RecorderShared>>, limit: RecorderLimit) -> bool {
        let callback = {
            let mut recorder = shared.lock();
            if recorder.phase != RecorderPhase::Recording {
                return false;
            }
            recorder.phase = RecorderPhase::Stopped;
            if let Some(config) = &recorder.config {
                finalize(config);
            }
            recorder.limit_callback.clone()
        };
        log::debug!("sim recorder stopped itself: {:?}", limit);
        if let Some(callback) = callback {
            callback(limit);
        }
        true
    }
}

/// Simulated media recorder. Writes a small placeholder container to the
/// configured output path.
pub struct SimRecorder {
    state: Arc<Mutex<SimState>>,
    shared: Arc<Mutex<RecorderShared>>,
}

impl SimRecorder {
    pub(crate) fn new(state: Arc<Mutex<SimState>>) -> Self {
        Self {
            state,
            shared: Arc::new(Mutex::new(RecorderShared {
                phase: RecorderPhase::Initial,
                config: None,
                limit_callback: None,
            })),
        }
    }

    pub fn phase(&self) -> RecorderPhase {
        self.shared.lock().phase
    }

    fn expect_phase(&self, expected: RecorderPhase, action: &str) -> Result<(), CameraError> {
        let phase = self.shared.lock().phase;
        if phase != expected {
            return Err(CameraError::prepare_state(format!(
                "{} called in {:?}, expected {:?}",
                action, phase, expected
            )));
        }
        Ok(())
    }
}

impl MediaRecorder for SimRecorder {
    fn configure(&mut self, config: &RecorderConfig) -> Result<(), CameraError> {
        self.expect_phase(RecorderPhase::Initial, "configure")?;
        {
            let mut shared = self.shared.lock();
            shared.config = Some(config.clone());
            shared.phase = RecorderPhase::Configured;
        }
        self.state.lock().last_recorder_config = Some(config.clone());
        Ok(())
    }

    fn set_limit_callback(&mut self, callback: RecorderLimitCallback) {
        self.shared.lock().limit_callback = Some(callback);
    }

    fn prepare(&mut self) -> Result<(), CameraError> {
        let fault = {
            let mut state = self.state.lock();
            state.record(SimCall::RecorderPrepare);
            state.faults.fail_prepare
        };
        match fault {
            Some(RecorderPrepareCause::InvalidState) => {
                return Err(CameraError::prepare_state("simulated prepare failure"))
            }
            Some(RecorderPrepareCause::Io) => {
                return Err(CameraError::prepare_io("simulated output failure"))
            }
            None => {}
        }
        self.expect_phase(RecorderPhase::Configured, "prepare")?;

        let mut shared = self.shared.lock();
        let Some(config) = shared.config.as_ref() else {
            return Err(CameraError::prepare_state("recorder not configured"));
        };
        let path = &config.output_path;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CameraError::prepare_io(e.to_string()))?;
        }
        let header = format!(
            "SIMV {:?}/{:?}/{:?} {} {}fps {}deg\n",
            config.profile.file_format,
            config.profile.video_codec,
            config.profile.audio_codec,
            config.video_size,
            config.profile.video_frame_rate,
            config.orientation_hint.degrees()
        );
        fs::write(path, header)
            .map_err(|e| CameraError::prepare_io(format!("{}: {}", path.display(), e)))?;
        shared.phase = RecorderPhase::Prepared;
        Ok(())
    }

    fn start(&mut self) -> Result<(), CameraError> {
        self.expect_phase(RecorderPhase::Prepared, "start")?;
        self.shared.lock().phase = RecorderPhase::Recording;
        let mut state = self.state.lock();
        state.record(SimCall::RecorderStart);
        state.recorder = Some(Arc::clone(&self.shared));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CameraError> {
        self.state.lock().record(SimCall::RecorderStop);
        let mut shared = self.shared.lock();
        match shared.phase {
            RecorderPhase::Recording => {
                shared.phase = RecorderPhase::Stopped;
                if let Some(config) = &shared.config {
                    finalize(config);
                }
                Ok(())
            }
            RecorderPhase::Stopped => Err(CameraError::RecorderAlreadyStopped),
            phase => Err(CameraError::Platform(format!("stop called in {:?}", phase))),
        }
    }

    fn release(&mut self) {
        self.shared.lock().phase = RecorderPhase::Released;
        let mut state = self.state.lock();
        state.record(SimCall::RecorderRelease);
        if state
            .recorder
            .as_ref()
            .is_some_and(|r| Arc::ptr_eq(r, &self.shared))
        {
            state.recorder = None;
        }
    }
}

fn finalize(config: &RecorderConfig) {
    let result = OpenOptions::new()
        .append(true)
        .open(&config.output_path)
        .and_then(|mut file| file.write_all(b"SIMV end\n"));
    if let Err(e) = result {
        log::warn!("sim recorder could not finalize {}: {}", config.output_path.display(), e);
    }
}
