use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::camera_models::{
    CameraCapabilities, CameraId, CameraInfo, CameraParameters, FlashMode, PreviewSurface,
};
use crate::models::capture_result::StopReason;
use crate::models::config::{CameraConfiguration, MediaQuality};
use crate::models::error::CameraError;
use crate::models::recording_profile::{CapabilityProfile, RecorderLimit};
use crate::models::rotation::Rotation;
use crate::models::size::Size;
use crate::models::state::SessionState;
use crate::processing::orientation::CameraRoster;
use crate::processing::size_negotiator::{pick_size_by_quality_tier, with_fallback};
use crate::session::controller::{SessionCore, SessionStatus, SingleFlight};
use crate::session::events::CameraEvents;
use crate::session::worker::{Pending, SerialWorker};
use crate::traits::camera_platform::CameraPlatform;

/// Name of the thread that owns the camera.
pub const WORKER_THREAD_NAME: &str = "camera-worker";

/// Owner-facing camera session.
///
/// Every device operation is queued onto a single camera worker thread and
/// runs in submission order. Outcomes come back as [`CameraEvent`]s on the
/// [`CameraEvents`] returned by [`CameraSession::new`]; drain them on the
/// thread that should run listener code.
///
/// ```text
/// caller ──submit──▶ [camera-worker: SessionCore] ──CameraEvent──▶ CameraEvents ──▶ CameraListener
///    ▲                          │
///    └──── SessionStatus ◀──────┘
/// ```
///
/// A panic inside a device call does not kill the worker: the session is
/// torn down to `Closed` and the interrupted request reports a `Platform`
/// error.
///
/// Dropping the session closes the camera and joins the worker.
///
/// [`CameraEvent`]: crate::models::events::CameraEvent
pub struct CameraSession<P: CameraPlatform> {
    worker: SerialWorker<SessionCore<P>>,
    status: Arc<Mutex<SessionStatus>>,
    gates: Arc<SingleFlight>,
    roster: CameraRoster,
}

impl<P: CameraPlatform> CameraSession<P> {
    /// Validate `config`, enumerate the platform's cameras and start the
    /// camera worker. The session starts `Closed`.
    pub fn new(
        platform: P,
        config: CameraConfiguration,
    ) -> Result<(Self, CameraEvents), CameraError> {
        config.validate().map_err(CameraError::ConfigurationFailed)?;

        let roster = enumerate_cameras(&platform);
        log::info!(
            "Camera session created: {} camera(s), front {:?}, back {:?}",
            roster.len(),
            roster.front.map(|c| c.id),
            roster.back.map(|c| c.id)
        );

        let (sink, events) = CameraEvents::channel();
        let status = Arc::new(Mutex::new(SessionStatus::default()));
        let gates = Arc::new(SingleFlight::default());

        let core_roster = roster.clone();
        let core_status = Arc::clone(&status);
        let core_gates = Arc::clone(&gates);
        let worker = SerialWorker::spawn_with_recovery(
            WORKER_THREAD_NAME,
            move |handle| {
                SessionCore::new(
                    platform,
                    config,
                    core_roster,
                    core_status,
                    core_gates,
                    sink,
                    handle,
                )
            },
            |core: &mut SessionCore<P>, message: &str| core.recover_from_panic(message),
        )?;

        Ok((
            Self {
                worker,
                status,
                gates,
                roster,
            },
            events,
        ))
    }

    // ── lifecycle ────────────────────────────────────────────────────

    /// Open camera `id`. Reports `Opened` or `OpenError`.
    pub fn open(&self, id: CameraId) -> Result<(), CameraError> {
        self.worker.submit(move |core| core.open(id))
    }

    /// Close the camera. Reports `Closed` unless it was already closed.
    pub fn close(&self) -> Result<(), CameraError> {
        self.worker.submit(|core| core.close())
    }

    /// Bind (or rebind) the preview to `surface`. Reports `Ready` or `PreviewError`.
    pub fn bind_preview_surface(&self, surface: PreviewSurface) -> Result<(), CameraError> {
        self.worker.submit(move |core| core.bind_preview_surface(surface))
    }

    pub fn set_flash_mode(&self, mode: FlashMode) -> Result<(), CameraError> {
        self.worker.submit(move |core| core.set_flash_mode(mode))
    }

    // ── capture ──────────────────────────────────────────────────────

    /// Capture one JPEG to `path`. Reports `PhotoTaken` or `PhotoError`.
    ///
    /// Rejected with `Busy` while recording or while another capture is
    /// still in flight.
    pub fn take_photo(&self, path: impl Into<PathBuf>) -> Result<(), CameraError> {
        if self.gates.recording.load(Ordering::Acquire) {
            return Err(CameraError::Busy("video recording in progress".into()));
        }
        if self
            .gates
            .capturing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CameraError::Busy("photo capture in progress".into()));
        }

        let path = path.into();
        self.worker
            .submit(move |core| core.take_photo(path))
            .inspect_err(|_| self.gates.capturing.store(false, Ordering::Release))
    }

    /// Start recording to `path`. Reports `VideoRecordStarted` or `VideoRecordError`.
    ///
    /// A second call before the recording stops is rejected with `Busy`.
    pub fn start_video_record(&self, path: impl Into<PathBuf>) -> Result<(), CameraError> {
        if self.gates.capturing.load(Ordering::Acquire) {
            return Err(CameraError::Busy("photo capture in progress".into()));
        }
        if self
            .gates
            .recording
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CameraError::Busy("video recording already in progress".into()));
        }

        let path = path.into();
        self.worker
            .submit(move |core| core.start_video_record(path))
            .inspect_err(|_| self.gates.recording.store(false, Ordering::Release))
    }

    /// Stop the active recording. Reports `VideoRecordStopped`; does nothing
    /// when no recording is active.
    pub fn stop_video_record(&self) -> Result<(), CameraError> {
        self.worker
            .submit(|core| core.stop_video_record(StopReason::Requested))
    }

    /// Entry point for platforms that deliver recorder limits out of band.
    /// Takes the normal stop path.
    pub fn recorder_limit_reached(&self, limit: RecorderLimit) -> Result<(), CameraError> {
        self.worker.submit(move |core| core.on_recorder_limit(None, limit))
    }

    // ── queries ──────────────────────────────────────────────────────

    /// Picture size the open camera would use for `tier`.
    pub fn photo_size_for_quality(&self, tier: MediaQuality) -> Result<Size, CameraError> {
        let capabilities = self.capabilities().ok_or(CameraError::NotOpen)?;
        let candidates = with_fallback(
            Some(capabilities.picture_sizes.as_slice()),
            &capabilities.preview_sizes,
        );
        pick_size_by_quality_tier(candidates, tier)
    }

    pub fn state(&self) -> SessionState {
        self.status.lock().state
    }

    pub fn camera_id(&self) -> Option<CameraId> {
        self.status.lock().camera_id
    }

    /// Rotation applied to the preview at the last surface bind.
    pub fn display_rotation(&self) -> Option<Rotation> {
        self.status.lock().display_rotation
    }

    pub fn capability_profile(&self) -> Option<CapabilityProfile> {
        self.status.lock().capability_profile
    }

    /// Capability snapshot taken when the camera was opened.
    pub fn capabilities(&self) -> Option<CameraCapabilities> {
        self.status.lock().capabilities.clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.status.lock().clone()
    }

    pub fn roster(&self) -> &CameraRoster {
        &self.roster
    }

    pub fn is_recording(&self) -> bool {
        self.gates.recording.load(Ordering::Acquire)
    }

    pub fn is_capturing(&self) -> bool {
        self.gates.capturing.load(Ordering::Acquire)
    }

    /// Block until everything submitted so far has run.
    pub fn sync(&self, timeout: Duration) -> Result<(), CameraError> {
        self.worker.request(|_| ())?.wait_timeout(timeout)
    }

    // ── escape hatches ───────────────────────────────────────────────

    /// Run `f` against the raw device on the camera worker.
    ///
    /// Resolves to `NotOpen` when no camera is open.
    pub fn handle_camera<R, F>(&self, f: F) -> Result<Pending<Result<R, CameraError>>, CameraError>
    where
        R: Send + 'static,
        F: FnOnce(&mut P::Device) -> R + Send + 'static,
    {
        self.worker.request(move |core| core.handle_camera(f))
    }

    /// Edit the device parameter block on the camera worker and write it
    /// back. Resolves to the device's verdict.
    pub fn handle_parameters<F>(
        &self,
        f: F,
    ) -> Result<Pending<Result<(), CameraError>>, CameraError>
    where
        F: FnOnce(&mut CameraParameters) + Send + 'static,
    {
        self.worker.request(move |core| core.handle_parameters(f))
    }
}

impl<P: CameraPlatform> Drop for CameraSession<P> {
    fn drop(&mut self) {
        if self.worker.submit(|core| core.close()).is_err() {
            log::debug!("camera worker already stopped");
        }
        self.worker.shutdown();
    }
}

fn enumerate_cameras<P: CameraPlatform>(platform: &P) -> CameraRoster {
    let infos: Vec<CameraInfo> = (0..platform.number_of_cameras())
        .filter_map(|id| match platform.camera_info(id) {
            Ok(info) => Some(info),
            Err(e) => {
                log::warn!("Skipping camera {}: {}", id, e);
                None
            }
        })
        .collect();
    CameraRoster::from_infos(infos)
}
