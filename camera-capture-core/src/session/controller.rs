use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::camera_models::{
    CameraCapabilities, CameraId, CameraInfo, CameraParameters, FlashMode, FocusMode, PictureFormat,
    PreviewSurface,
};
use crate::models::capture_result::{PhotoResult, StopReason, VideoResult};
use crate::models::config::CameraConfiguration;
use crate::models::error::CameraError;
use crate::models::events::CameraEvent;
use crate::models::recording_profile::{CapabilityProfile, RecorderConfig, RecorderLimit};
use crate::models::rotation::{DisplayRotation, ExifOrientation, Rotation};
use crate::models::size::Size;
use crate::models::state::{DeviceOwner, SessionState};
use crate::processing::orientation::{
    resolve_display_rotation, resolve_output_rotation, CameraRoster,
};
use crate::processing::profile_selector::select_recording_profile;
use crate::processing::size_negotiator::negotiate;
use crate::session::events::EventSink;
use crate::session::worker::WorkerHandle;
use crate::storage::{exif, photo_writer};
use crate::traits::camera_device::CameraDevice;
use crate::traits::camera_platform::CameraPlatform;
use crate::traits::media_recorder::{MediaRecorder, RecorderLimitCallback};

type RecorderOf<P> = <<P as CameraPlatform>::Device as CameraDevice>::Recorder;

/// Session state readable from any thread.
///
/// Written only by the camera worker.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub state: SessionState,
    pub camera_id: Option<CameraId>,
    pub display_rotation: Option<Rotation>,
    pub capability_profile: Option<CapabilityProfile>,
    pub capabilities: Option<CameraCapabilities>,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self {
            state: SessionState::Closed,
            camera_id: None,
            display_rotation: None,
            capability_profile: None,
            capabilities: None,
        }
    }
}

/// Single-flight flags, set by the caller at submission and cleared by the
/// worker when the operation ends.
#[derive(Debug, Default)]
pub(crate) struct SingleFlight {
    pub recording: AtomicBool,
    pub capturing: AtomicBool,
}

/// Request the worker is in the middle of, so a panic can be answered with
/// the matching failure event.
#[derive(Debug, Clone, PartialEq)]
enum InFlight {
    Open(CameraId),
    Photo(PathBuf),
    Record(PathBuf),
}

struct ActiveRecording<R> {
    recorder: R,
    camera_id: CameraId,
    path: PathBuf,
    video_size: Size,
    seq: u64,
}

/// Camera state machine. Lives on the camera worker thread; every method
/// runs there, one at a time.
pub(crate) struct SessionCore<P: CameraPlatform> {
    platform: P,
    config: CameraConfiguration,
    roster: CameraRoster,
    status: Arc<Mutex<SessionStatus>>,
    gates: Arc<SingleFlight>,
    events: EventSink,
    worker: WorkerHandle<SessionCore<P>>,

    state: SessionState,
    camera_id: Option<CameraId>,
    info: Option<CameraInfo>,
    device: Option<P::Device>,
    owner: DeviceOwner,
    profile: Option<CapabilityProfile>,
    surface: Option<PreviewSurface>,
    previewing: bool,
    recording: Option<ActiveRecording<RecorderOf<P>>>,
    recording_seq: u64,
    in_flight: Option<InFlight>,
}

impl<P: CameraPlatform> SessionCore<P> {
    pub(crate) fn new(
        platform: P,
        config: CameraConfiguration,
        roster: CameraRoster,
        status: Arc<Mutex<SessionStatus>>,
        gates: Arc<SingleFlight>,
        events: EventSink,
        worker: WorkerHandle<SessionCore<P>>,
    ) -> Self {
        Self {
            platform,
            config,
            roster,
            status,
            gates,
            events,
            worker,
            state: SessionState::Closed,
            camera_id: None,
            info: None,
            device: None,
            owner: DeviceOwner::Camera,
            profile: None,
            surface: None,
            previewing: false,
            recording: None,
            recording_seq: 0,
            in_flight: None,
        }
    }

    // ── open / close ─────────────────────────────────────────────────

    pub(crate) fn open(&mut self, id: CameraId) {
        if !self.state.is_closed() {
            log::warn!("open({}) rejected: camera {:?} is {:?}", id, self.camera_id, self.state);
            self.events.post(CameraEvent::OpenError {
                camera_id: id,
                error: CameraError::AlreadyOpen,
            });
            return;
        }

        self.in_flight = Some(InFlight::Open(id));
        self.set_state(SessionState::Opening);
        let opened = self.try_open(id);
        self.in_flight = None;
        match opened {
            Ok(preview_size) => {
                self.set_state(SessionState::Idle);
                log::info!("Camera {} opened, preview {}", id, preview_size);
                self.events.post(CameraEvent::Opened {
                    camera_id: id,
                    preview_size,
                });
            }
            Err(error) => {
                log::error!("Failed to open camera {}: {}", id, error);
                self.release_device();
                self.clear_session();
                self.set_state(SessionState::Closed);
                self.events.post(CameraEvent::OpenError { camera_id: id, error });
            }
        }
    }

    fn try_open(&mut self, id: CameraId) -> Result<Size, CameraError> {
        let info = self.platform.camera_info(id)?;
        let device = self.platform.open(id)?;
        self.device = Some(device);
        self.camera_id = Some(id);
        self.info = Some(info);
        self.owner = DeviceOwner::Camera;

        let params = self.device_mut()?.parameters()?;

        let platform = &self.platform;
        let recording = select_recording_profile(
            self.config.media_quality,
            self.config.video_file_size_limit,
            self.config.minimum_video_duration,
            |quality| platform.recording_profile(id, quality),
        )
        .ok_or(CameraError::NoSupportedSize("recording profile"))?;

        let profile = negotiate(&params, &self.config, recording)?;
        self.profile = Some(profile);

        let mut status = self.status.lock();
        status.camera_id = Some(id);
        status.capability_profile = Some(profile);
        status.capabilities = Some(params.capabilities());
        Ok(profile.preview_size)
    }

    /// Release the camera from any state. A recording in flight is aborted
    /// and its partial file deleted.
    pub(crate) fn close(&mut self) {
        if self.state.is_closed() {
            log::debug!("close ignored: camera already closed");
            return;
        }

        let camera_id = self.camera_id;
        self.set_state(SessionState::Closing);

        if let Some(active) = self.recording.take() {
            self.abort_recording(active);
        }
        if self.previewing {
            if let Some(device) = self.device.as_mut() {
                if let Err(e) = device.stop_preview() {
                    log::warn!("Failed to stop preview on close: {}", e);
                }
            }
        }
        self.release_device();
        self.clear_session();
        self.set_state(SessionState::Closed);

        if let Some(id) = camera_id {
            log::info!("Camera {} closed", id);
            self.events.post(CameraEvent::Closed { camera_id: id });
        }
    }

    fn release_device(&mut self) {
        if let Some(mut device) = self.device.take() {
            device.release();
        }
    }

    fn clear_session(&mut self) {
        self.camera_id = None;
        self.info = None;
        self.profile = None;
        self.surface = None;
        self.previewing = false;
        self.owner = DeviceOwner::Camera;

        let mut status = self.status.lock();
        status.camera_id = None;
        status.display_rotation = None;
        status.capability_profile = None;
        status.capabilities = None;
    }

    // ── preview ──────────────────────────────────────────────────────

    /// (Re)bind the preview to `surface`. Safe to call on every surface
    /// change: a running stream is stopped before the new one starts.
    pub(crate) fn bind_preview_surface(&mut self, surface: PreviewSurface) {
        if !self.state.is_ready() {
            let error = self.not_ready_error();
            log::warn!("Preview bind rejected in state {:?}", self.state);
            self.events.post(CameraEvent::PreviewError { error });
            return;
        }

        if let Err(error) = self.try_bind_preview(surface) {
            log::error!("Failed to start preview: {}", error);
            self.previewing = false;
            self.set_state(SessionState::Idle);
            self.events.post(CameraEvent::PreviewError { error });
        }
    }

    fn try_bind_preview(&mut self, surface: PreviewSurface) -> Result<(), CameraError> {
        let (info, profile) = self.open_lens()?;

        if self.previewing {
            self.previewing = false;
            if let Err(e) = self.device_mut()?.stop_preview() {
                log::warn!("Failed to stop stale preview: {}", e);
            }
        }

        let device_rotation = DisplayRotation::from_raw(self.platform.display_rotation())?;
        let rotation = resolve_display_rotation(info.mount, info.facing, device_rotation);
        self.status.lock().display_rotation = Some(rotation);

        let media_action = self.config.media_action;
        let flash_mode = self.config.flash_mode;

        self.apply_parameters("focus mode", |params| {
            let preferred = if media_action.is_photo_oriented() {
                FocusMode::ContinuousPicture
            } else {
                FocusMode::ContinuousVideo
            };
            match [preferred, FocusMode::Auto].into_iter().find(|m| params.supports_focus(*m)) {
                Some(mode) => {
                    params.focus_mode = Some(mode);
                    true
                }
                None => false,
            }
        })?;
        self.apply_parameters("flash mode", |params| set_flash(params, flash_mode))?;
        self.apply_parameters("video stabilization", |params| {
            if !media_action.wants_stabilization() || !params.video_stabilization_supported {
                return false;
            }
            params.video_stabilization = true;
            true
        })?;
        self.apply_parameters("preview and picture sizes", |params| {
            params.preview_size = Some(profile.preview_size);
            params.picture_size = Some(profile.photo_size);
            true
        })?;

        let device = self.device_mut()?;
        absorb("display orientation", device.set_display_orientation(rotation))?;
        device.set_preview_surface(&surface)?;
        device.start_preview()?;

        log::debug!(
            "Preview started on surface {:#x} ({}x{}), rotation {}",
            surface.handle,
            surface.width,
            surface.height,
            rotation
        );
        self.surface = Some(surface);
        self.previewing = true;
        self.set_state(SessionState::Previewing);
        self.events.post(CameraEvent::Ready);
        Ok(())
    }

    pub(crate) fn set_flash_mode(&mut self, mode: FlashMode) {
        self.config.flash_mode = mode;
        if self.device.is_none() {
            return;
        }
        if let Err(e) = self.apply_parameters("flash mode", |params| set_flash(params, mode)) {
            log::warn!("Failed to set flash mode {:?}: {}", mode, e);
        }
    }

    // ── photo ────────────────────────────────────────────────────────

    pub(crate) fn take_photo(&mut self, path: PathBuf) {
        let result = if self.state.is_ready() {
            let previous = self.state;
            self.in_flight = Some(InFlight::Photo(path.clone()));
            self.set_state(SessionState::Capturing);
            let result = self.capture_photo(&path);
            self.in_flight = None;
            self.set_state(previous);
            result
        } else {
            Err(self.not_ready_error())
        };
        self.gates.capturing.store(false, Ordering::Release);

        match result {
            Ok(photo) => {
                log::info!("Photo saved to {} ({:?})", photo.path.display(), photo.orientation);
                self.events.post(CameraEvent::PhotoTaken(photo));
            }
            Err(error) => {
                log::error!("Photo capture to {} failed: {}", path.display(), error);
                self.events.post(CameraEvent::PhotoError { path, error });
            }
        }
    }

    fn capture_photo(&mut self, path: &Path) -> Result<PhotoResult, CameraError> {
        let camera_id = self.camera_id.ok_or(CameraError::NotOpen)?;
        let (info, profile) = self.open_lens()?;
        let jpeg_quality = self.config.jpeg_quality;

        self.apply_parameters("photo quality", |params| {
            params.picture_format = PictureFormat::Jpeg;
            params.jpeg_quality = jpeg_quality;
            params.picture_size = Some(profile.photo_size);
            true
        })?;

        let bytes = self.device_mut()?.take_picture()?;
        photo_writer::write_photo(path, &bytes)?;

        // The bytes stay on disk even when stamping fails.
        let orientation = ExifOrientation::from(self.output_rotation(camera_id, info));
        let checksum = exif::stamp_orientation_file(path, orientation)?;

        Ok(PhotoResult::new(
            camera_id,
            path.to_path_buf(),
            profile.photo_size,
            orientation,
            checksum,
        ))
    }

    // ── video ────────────────────────────────────────────────────────

    pub(crate) fn start_video_record(&mut self, path: PathBuf) {
        if !self.state.is_ready() {
            let error = self.not_ready_error();
            log::warn!("Video record rejected in state {:?}", self.state);
            self.gates.recording.store(false, Ordering::Release);
            self.events.post(CameraEvent::VideoRecordError { path, error });
            return;
        }

        self.in_flight = Some(InFlight::Record(path.clone()));
        let prepared = self.prepare_recorder(&path);
        self.in_flight = None;
        match prepared {
            Ok(active) => {
                let video_size = active.video_size;
                self.recording = Some(active);
                self.set_state(SessionState::Recording);
                log::info!("Recording {} to {}", video_size, path.display());
                self.events.post(CameraEvent::VideoRecordStarted { video_size });
            }
            Err(error) => {
                log::error!("Failed to start recording to {}: {}", path.display(), error);
                self.reclaim_device();
                self.gates.recording.store(false, Ordering::Release);
                self.events.post(CameraEvent::VideoRecordError { path, error });
            }
        }
    }

    fn prepare_recorder(
        &mut self,
        path: &Path,
    ) -> Result<ActiveRecording<RecorderOf<P>>, CameraError> {
        let camera_id = self.camera_id.ok_or(CameraError::NotOpen)?;
        let (info, profile) = self.open_lens()?;

        self.recording_seq += 1;
        let seq = self.recording_seq;
        let config = RecorderConfig {
            output_path: path.to_path_buf(),
            profile: profile.recording,
            video_size: profile.video_size,
            orientation_hint: self.output_rotation(camera_id, info),
            max_file_size: self.config.video_file_size_limit,
            max_duration: self.config.video_duration_limit,
            preview_surface: self.surface.clone(),
        };
        let limit_callback = if config.max_file_size.is_some() || config.max_duration.is_some() {
            Some(self.limit_callback(seq))
        } else {
            None
        };

        // Lock then unlock so the recorder gets a device that is known to be
        // free, then hand it over.
        let device = self.device.as_mut().ok_or(CameraError::NotOpen)?;
        device.lock()?;
        device.unlock()?;
        self.owner.hand_to_recorder()?;

        let mut recorder = device.attach_recorder()?;
        if let Err(e) = start_recorder(&mut recorder, &config, limit_callback) {
            recorder.release();
            return Err(e);
        }

        Ok(ActiveRecording {
            recorder,
            camera_id,
            path: path.to_path_buf(),
            video_size: profile.video_size,
            seq,
        })
    }

    fn limit_callback(&self, seq: u64) -> RecorderLimitCallback {
        let worker = self.worker.clone();
        Arc::new(move |limit: RecorderLimit| {
            if worker
                .submit(move |core| core.on_recorder_limit(Some(seq), limit))
                .is_err()
            {
                log::debug!("Recorder limit {:?} after session shutdown", limit);
            }
        })
    }

    /// Stop path for explicit stops and recorder limits alike. A second stop
    /// finds nothing to do, so a limit racing an explicit stop yields exactly
    /// one `VideoRecordStopped`.
    pub(crate) fn stop_video_record(&mut self, reason: StopReason) {
        let Some(mut active) = self.recording.take() else {
            log::debug!("stop ignored: not recording");
            return;
        };

        match active.recorder.stop() {
            Ok(()) => {}
            Err(CameraError::RecorderAlreadyStopped) => {
                log::debug!("Recorder had already stopped itself")
            }
            Err(e) => log::warn!("Recorder stop failed: {}", e),
        }
        active.recorder.release();
        self.reclaim_device();
        self.gates.recording.store(false, Ordering::Release);
        self.set_state(self.resting_state());

        log::info!("Recording stopped ({:?}): {}", reason, active.path.display());
        self.events.post(CameraEvent::VideoRecordStopped(VideoResult::new(
            active.camera_id,
            active.path,
            active.video_size,
            reason,
        )));
    }

    /// `seq` identifies the recording that raised the limit; `None` applies
    /// to whatever recording is active.
    pub(crate) fn on_recorder_limit(&mut self, seq: Option<u64>, limit: RecorderLimit) {
        let active_seq = self.recording.as_ref().map(|active| active.seq);
        match active_seq {
            Some(active) if seq.is_none_or(|s| s == active) => {
                log::info!("Recorder reached {:?}", limit);
                self.stop_video_record(StopReason::Limit(limit));
            }
            _ => log::debug!("Stale recorder limit {:?} ignored", limit),
        }
    }

    fn abort_recording(&mut self, mut active: ActiveRecording<RecorderOf<P>>) {
        log::warn!("Aborting recording to {}", active.path.display());
        if let Err(e) = active.recorder.stop() {
            log::debug!("Recorder stop during abort: {}", e);
        }
        active.recorder.release();
        self.reclaim_device();
        self.gates.recording.store(false, Ordering::Release);

        match fs::remove_file(&active.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                log::warn!("Failed to remove partial recording {}: {}", active.path.display(), e)
            }
        }

        self.events.post(CameraEvent::VideoRecordError {
            path: active.path,
            error: CameraError::RecordingAborted,
        });
    }

    /// Take the device back from a recorder and relock it. No-op when the
    /// camera already owns it.
    fn reclaim_device(&mut self) {
        if self.owner.reclaim().is_err() {
            return;
        }
        if let Some(device) = self.device.as_mut() {
            if let Err(e) = device.lock() {
                log::warn!("Failed to relock camera after recording: {}", e);
            }
        }
    }

    /// Put the session back into a known state after a job panicked on the
    /// worker: the camera is torn down to `Closed`, both single-flight gates
    /// are cleared and the interrupted request gets its failure event.
    pub(crate) fn recover_from_panic(&mut self, message: &str) {
        let error = CameraError::Platform(format!("camera worker job panicked: {}", message));
        let interrupted = self.in_flight.take();
        let camera_id = self.camera_id;
        log::error!(
            "Recovering camera session from {:?} after panic in {:?}",
            self.state,
            interrupted
        );

        if let Some(active) = self.recording.take() {
            self.abort_recording(active);
        }
        self.release_device();
        self.clear_session();
        self.set_state(SessionState::Closed);
        self.gates.capturing.store(false, Ordering::Release);
        self.gates.recording.store(false, Ordering::Release);

        match interrupted {
            Some(InFlight::Open(id)) => {
                self.events.post(CameraEvent::OpenError { camera_id: id, error });
                return;
            }
            Some(InFlight::Photo(path)) => {
                self.events.post(CameraEvent::PhotoError { path, error })
            }
            Some(InFlight::Record(path)) => {
                self.events.post(CameraEvent::VideoRecordError { path, error })
            }
            None => {}
        }
        if let Some(id) = camera_id {
            self.events.post(CameraEvent::Closed { camera_id: id });
        }
    }

    // ── escape hatches ───────────────────────────────────────────────

    pub(crate) fn handle_camera<R, F>(&mut self, f: F) -> Result<R, CameraError>
    where
        F: FnOnce(&mut P::Device) -> R,
    {
        Ok(f(self.device_mut()?))
    }

    pub(crate) fn handle_parameters<F>(&mut self, f: F) -> Result<(), CameraError>
    where
        F: FnOnce(&mut CameraParameters),
    {
        let device = self.device_mut()?;
        let mut params = device.parameters()?;
        f(&mut params);
        device.set_parameters(&params)
    }

    // ── helpers ──────────────────────────────────────────────────────

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            log::debug!("Camera session {:?} -> {:?}", self.state, state);
        }
        self.state = state;
        self.status.lock().state = state;
    }

    fn device_mut(&mut self) -> Result<&mut P::Device, CameraError> {
        self.device.as_mut().ok_or(CameraError::NotOpen)
    }

    fn open_lens(&self) -> Result<(CameraInfo, CapabilityProfile), CameraError> {
        match (self.info, self.profile) {
            (Some(info), Some(profile)) => Ok((info, profile)),
            _ => Err(CameraError::NotOpen),
        }
    }

    fn resting_state(&self) -> SessionState {
        if self.previewing {
            SessionState::Previewing
        } else {
            SessionState::Idle
        }
    }

    fn not_ready_error(&self) -> CameraError {
        match self.state {
            SessionState::Recording => CameraError::Busy("video recording in progress".into()),
            SessionState::Capturing => CameraError::Busy("photo capture in progress".into()),
            _ => CameraError::NotOpen,
        }
    }

    fn output_rotation(&self, camera_id: CameraId, info: CameraInfo) -> Rotation {
        let hint = self.config.sensor_position;
        self.roster
            .output_rotation(camera_id, hint)
            .unwrap_or_else(|| resolve_output_rotation(info.mount, info.facing, hint))
    }

    /// Read, edit and write back the parameter block. `edit` returns false
    /// when there is nothing to apply. Recoverable rejections are logged and
    /// the device keeps its previous values.
    fn apply_parameters<F>(&mut self, what: &str, edit: F) -> Result<(), CameraError>
    where
        F: FnOnce(&mut CameraParameters) -> bool,
    {
        let device = self.device_mut()?;
        let mut params = device.parameters()?;
        if !edit(&mut params) {
            log::debug!("{}: not supported, keeping defaults", what);
            return Ok(());
        }
        absorb(what, device.set_parameters(&params))
    }
}

fn set_flash(params: &mut CameraParameters, mode: FlashMode) -> bool {
    if !params.supported_flash_modes.contains(&mode) {
        return false;
    }
    params.flash_mode = Some(mode);
    true
}

/// Turn a recoverable error into a warning.
fn absorb(what: &str, result: Result<(), CameraError>) -> Result<(), CameraError> {
    match result {
        Err(e) if e.is_recoverable() => {
            log::warn!("{} not applied: {}", what, e);
            Ok(())
        }
        other => other,
    }
}

fn start_recorder<R: MediaRecorder>(
    recorder: &mut R,
    config: &RecorderConfig,
    limit_callback: Option<RecorderLimitCallback>,
) -> Result<(), CameraError> {
    recorder.configure(config)?;
    if let Some(callback) = limit_callback {
        recorder.set_limit_callback(callback);
    }
    recorder.prepare()?;
    recorder.start()
}
