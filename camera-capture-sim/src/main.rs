//! Walk a simulated phone through open → preview → photo → video → close
//! and print every event. Run with `RUST_LOG=debug` to see the worker.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use camera_capture_core::{
    CameraConfiguration, CameraError, CameraEvent, CameraEvents, CameraId, CameraListener,
    CameraSession, PhotoResult, PreviewSurface, RecorderLimit, Size, VideoResult,
};
use camera_capture_sim::{fixtures, SimPlatform};

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

struct PrintingListener;

impl CameraListener for PrintingListener {
    fn on_opened(&self, camera_id: CameraId, preview_size: Size) {
        println!("opened camera {} (preview {})", camera_id, preview_size);
    }

    fn on_open_error(&self, camera_id: CameraId, error: &CameraError) {
        println!("camera {} failed to open: {}", camera_id, error);
    }

    fn on_ready(&self) {
        println!("preview running");
    }

    fn on_preview_error(&self, error: &CameraError) {
        println!("preview error: {}", error);
    }

    fn on_closed(&self, camera_id: CameraId) {
        println!("closed camera {}", camera_id);
    }

    fn on_photo_taken(&self, result: &PhotoResult) {
        match serde_json::to_string_pretty(result) {
            Ok(json) => println!("photo taken:\n{}", json),
            Err(e) => println!("photo taken at {} ({})", result.path.display(), e),
        }
    }

    fn on_photo_error(&self, path: &Path, error: &CameraError) {
        println!("photo {} failed: {}", path.display(), error);
    }

    fn on_video_record_started(&self, video_size: Size) {
        println!("recording at {}", video_size);
    }

    fn on_video_record_stopped(&self, result: &VideoResult) {
        println!(
            "recording stopped ({:?}): {}",
            result.stop_reason,
            result.path.display()
        );
    }

    fn on_video_record_error(&self, path: &Path, error: &CameraError) {
        println!("recording {} failed: {}", path.display(), error);
    }
}

/// Block until `pred` matches, dispatching every event on this thread.
fn pump<F>(events: &CameraEvents, listener: &dyn CameraListener, pred: F) -> Result<(), CameraError>
where
    F: Fn(&CameraEvent) -> bool,
{
    let (hit, earlier) = events.wait_for(EVENT_TIMEOUT, &pred).ok_or(CameraError::Timeout)?;
    for event in earlier.iter().chain(std::iter::once(&hit)) {
        camera_capture_core::session::events::dispatch(event, listener);
    }
    Ok(())
}

fn run(output_dir: &Path) -> Result<(), CameraError> {
    let config = CameraConfiguration {
        video_duration_limit: Some(Duration::from_secs(30)),
        ..CameraConfiguration::default()
    };
    let platform: SimPlatform = fixtures::standard_platform();
    let sim = platform.handle();
    let (session, events) = CameraSession::new(platform, config)?;
    let listener = PrintingListener;

    session.open(fixtures::BACK_CAMERA_ID)?;
    pump(&events, &listener, |e| {
        matches!(e, CameraEvent::Opened { .. } | CameraEvent::OpenError { .. })
    })?;

    session.bind_preview_surface(PreviewSurface::new(0x5EED, 1080, 2340))?;
    pump(&events, &listener, |e| {
        matches!(e, CameraEvent::Ready | CameraEvent::PreviewError { .. })
    })?;
    if let Some(rotation) = session.display_rotation() {
        println!("display rotation {}", rotation);
    }

    session.take_photo(output_dir.join("photo.jpg"))?;
    pump(&events, &listener, |e| {
        matches!(e, CameraEvent::PhotoTaken(_) | CameraEvent::PhotoError { .. })
    })?;

    session.start_video_record(output_dir.join("clip.mp4"))?;
    pump(&events, &listener, |e| {
        matches!(e, CameraEvent::VideoRecordStarted { .. } | CameraEvent::VideoRecordError { .. })
    })?;

    // Let the simulated recorder run into its duration limit.
    sim.trigger_limit(RecorderLimit::MaxDurationReached);
    pump(&events, &listener, |e| {
        matches!(e, CameraEvent::VideoRecordStopped(_) | CameraEvent::VideoRecordError { .. })
    })?;

    session.close()?;
    pump(&events, &listener, |e| matches!(e, CameraEvent::Closed { .. }))?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let output_dir: PathBuf =
        std::env::temp_dir().join(format!("camera_capture_demo_{}", uuid::Uuid::new_v4()));
    log::info!("Writing captures to {}", output_dir.display());

    match run(&output_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Demo failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
