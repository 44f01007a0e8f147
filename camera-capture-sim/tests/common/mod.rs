#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use camera_capture_core::{
    CameraConfiguration, CameraEvent, CameraEvents, CameraSession, PreviewSurface,
};
use camera_capture_sim::{fixtures, SimHandle, SimPlatform};

pub const TIMEOUT: Duration = Duration::from_secs(5);

pub type SimSession = CameraSession<SimPlatform>;

pub fn temp_dir() -> PathBuf {
    std::env::temp_dir().join(format!("camera_capture_it_{}", uuid::Uuid::new_v4()))
}

pub fn surface() -> PreviewSurface {
    PreviewSurface::new(0xA11CE, 1080, 2340)
}

pub fn start_with(
    platform: SimPlatform,
    config: CameraConfiguration,
) -> (SimSession, CameraEvents, SimHandle) {
    let sim = platform.handle();
    let (session, events) = CameraSession::new(platform, config).unwrap();
    (session, events, sim)
}

pub fn start(config: CameraConfiguration) -> (SimSession, CameraEvents, SimHandle) {
    start_with(fixtures::standard_platform(), config)
}

/// Wait for the first event matching `pred`; panics with everything seen
/// so far on timeout.
pub fn expect_event<F>(events: &CameraEvents, pred: F) -> CameraEvent
where
    F: FnMut(&CameraEvent) -> bool,
{
    match events.wait_for(TIMEOUT, pred) {
        Some((event, _)) => event,
        None => panic!("expected event never arrived; pending: {:?}", events.drain()),
    }
}

/// Let the worker finish everything queued, then collect what it posted.
pub fn settle(session: &SimSession, events: &CameraEvents) -> Vec<CameraEvent> {
    session.sync(TIMEOUT).unwrap();
    events.drain()
}

pub fn open(session: &SimSession, events: &CameraEvents, id: u32) {
    session.open(id).unwrap();
    match expect_event(events, |e| {
        matches!(e, CameraEvent::Opened { .. } | CameraEvent::OpenError { .. })
    }) {
        CameraEvent::Opened { camera_id, .. } => assert_eq!(camera_id, id),
        other => panic!("open failed: {:?}", other),
    }
}

pub fn open_previewing(session: &SimSession, events: &CameraEvents, id: u32) {
    open(session, events, id);
    session.bind_preview_surface(surface()).unwrap();
    match expect_event(events, |e| {
        matches!(e, CameraEvent::Ready | CameraEvent::PreviewError { .. })
    }) {
        CameraEvent::Ready => {}
        other => panic!("preview failed: {:?}", other),
    }
}
