mod common;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camera_capture_core::{
    CameraConfiguration, CameraError, CameraEvent, CameraEvents, MediaQuality, ProfileQuality,
    RecorderLimit, RecorderPrepareCause, Rotation, SessionState, Size, StopReason, VideoResult,
};
use camera_capture_sim::{fixtures, SimCall};

use common::*;

fn limited() -> CameraConfiguration {
    CameraConfiguration {
        video_duration_limit: Some(Duration::from_secs(60)),
        video_file_size_limit: Some(50_000_000),
        ..CameraConfiguration::default()
    }
}

fn started(events: &CameraEvents) -> Size {
    match expect_event(events, |e| {
        matches!(e, CameraEvent::VideoRecordStarted { .. } | CameraEvent::VideoRecordError { .. })
    }) {
        CameraEvent::VideoRecordStarted { video_size } => video_size,
        other => panic!("recording failed to start: {:?}", other),
    }
}

fn stopped(events: &CameraEvents) -> VideoResult {
    match expect_event(events, |e| {
        matches!(e, CameraEvent::VideoRecordStopped(_) | CameraEvent::VideoRecordError { .. })
    }) {
        CameraEvent::VideoRecordStopped(result) => result,
        other => panic!("recording did not stop cleanly: {:?}", other),
    }
}

fn count_stopped(posted: &[CameraEvent]) -> usize {
    posted
        .iter()
        .filter(|e| matches!(e, CameraEvent::VideoRecordStopped(_)))
        .count()
}

fn subsequence(calls: &[SimCall], expected: &[SimCall]) -> bool {
    let mut it = calls.iter();
    expected.iter().all(|want| it.any(|c| c == want))
}

#[test]
fn record_and_stop_hands_the_device_over_and_back() {
    let (session, events, sim) = start(limited());
    open_previewing(&session, &events, fixtures::BACK_CAMERA_ID);
    sim.clear_calls();
    let dir = temp_dir();
    let path = dir.join("clip.mp4");

    session.start_video_record(&path).unwrap();
    assert_eq!(started(&events), Size::new(1920, 1080));
    assert_eq!(session.state(), SessionState::Recording);
    assert!(session.is_recording());
    assert!(sim.is_recording());
    assert!(subsequence(
        &sim.calls(),
        &[
            SimCall::Lock,
            SimCall::Unlock,
            SimCall::AttachRecorder,
            SimCall::RecorderPrepare,
            SimCall::RecorderStart,
        ]
    ));

    let config = sim.last_recorder_config().unwrap();
    assert_eq!(config.output_path, path);
    assert_eq!(config.profile.quality, ProfileQuality::P1080);
    assert_eq!(config.video_size, Size::new(1920, 1080));
    assert_eq!(config.orientation_hint, Rotation::Deg90);
    assert_eq!(config.max_duration, Some(Duration::from_secs(60)));
    assert_eq!(config.max_file_size, Some(50_000_000));
    assert_eq!(config.preview_surface, Some(surface()));

    sim.clear_calls();
    session.stop_video_record().unwrap();
    let result = stopped(&events);
    assert_eq!(result.path, path);
    assert_eq!(result.camera_id, 0);
    assert_eq!(result.video_size, Size::new(1920, 1080));
    assert_eq!(result.stop_reason, StopReason::Requested);

    assert_eq!(
        sim.calls(),
        vec![SimCall::RecorderStop, SimCall::RecorderRelease, SimCall::Lock]
    );
    assert_eq!(session.state(), SessionState::Previewing);
    assert!(!session.is_recording());
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.ends_with("SIMV end\n"));
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn recording_without_preview_returns_to_idle() {
    let (session, events, _sim) = start(CameraConfiguration::default());
    open(&session, &events, 0);
    let dir = temp_dir();

    session.start_video_record(dir.join("clip.mp4")).unwrap();
    started(&events);
    session.stop_video_record().unwrap();
    stopped(&events);
    assert_eq!(session.state(), SessionState::Idle);
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn rapid_starts_produce_one_recording() {
    let (session, events, sim) = start(CameraConfiguration::default());
    open_previewing(&session, &events, 0);
    let dir = temp_dir();

    session.start_video_record(dir.join("a.mp4")).unwrap();
    assert!(matches!(
        session.start_video_record(dir.join("b.mp4")),
        Err(CameraError::Busy(_))
    ));
    started(&events);
    assert!(matches!(
        session.start_video_record(dir.join("c.mp4")),
        Err(CameraError::Busy(_))
    ));

    let posted = settle(&session, &events);
    assert!(posted.is_empty(), "unexpected events: {:?}", posted);
    assert_eq!(sim.count(SimCall::AttachRecorder), 1);
    assert!(!dir.join("b.mp4").exists());
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn limit_then_explicit_stop_reports_one_stop() {
    let (session, events, sim) = start(limited());
    open_previewing(&session, &events, 0);
    let dir = temp_dir();

    session.start_video_record(dir.join("clip.mp4")).unwrap();
    started(&events);

    assert!(sim.trigger_limit(RecorderLimit::MaxDurationReached));
    session.stop_video_record().unwrap();

    let posted = settle(&session, &events);
    assert_eq!(count_stopped(&posted), 1, "events: {:?}", posted);
    assert!(posted.iter().all(|e| !e.is_error()), "events: {:?}", posted);
    match &posted[0] {
        CameraEvent::VideoRecordStopped(result) => {
            assert_eq!(
                result.stop_reason,
                StopReason::Limit(RecorderLimit::MaxDurationReached)
            );
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(!session.is_recording());
    assert_eq!(session.state(), SessionState::Previewing);
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn explicit_stop_then_late_limit_reports_one_stop() {
    let (session, events, sim) = start(limited());
    open_previewing(&session, &events, 0);
    let dir = temp_dir();

    session.start_video_record(dir.join("clip.mp4")).unwrap();
    started(&events);

    session.stop_video_record().unwrap();
    // May or may not reach the recorder before the worker stops it.
    sim.trigger_limit(RecorderLimit::MaxFileSizeReached);

    let posted = settle(&session, &events);
    assert_eq!(count_stopped(&posted), 1, "events: {:?}", posted);
    assert!(posted.iter().all(|e| !e.is_error()), "events: {:?}", posted);
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn limit_alone_stops_and_frees_the_recorder() {
    let (session, events, sim) = start(limited());
    open_previewing(&session, &events, 0);
    let dir = temp_dir();

    session.start_video_record(dir.join("first.mp4")).unwrap();
    started(&events);
    assert!(sim.trigger_limit(RecorderLimit::MaxFileSizeReached));
    let result = stopped(&events);
    assert_eq!(result.stop_reason, StopReason::Limit(RecorderLimit::MaxFileSizeReached));
    assert!(!session.is_recording());

    // A stale limit from the finished recorder changes nothing.
    assert!(!sim.trigger_limit(RecorderLimit::MaxDurationReached));

    session.start_video_record(dir.join("second.mp4")).unwrap();
    started(&events);
    session.recorder_limit_reached(RecorderLimit::MaxDurationReached).unwrap();
    let result = stopped(&events);
    assert_eq!(result.path, dir.join("second.mp4"));
    assert_eq!(result.stop_reason, StopReason::Limit(RecorderLimit::MaxDurationReached));
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn stop_without_recording_is_silent() {
    let (session, events, _sim) = start(CameraConfiguration::default());
    open_previewing(&session, &events, 0);
    session.stop_video_record().unwrap();
    assert!(settle(&session, &events).is_empty());
    assert_eq!(session.state(), SessionState::Previewing);
}

#[test]
fn prepare_failure_reclaims_the_device() {
    let (session, events, sim) = start(CameraConfiguration::default());
    open_previewing(&session, &events, 0);
    sim.update_faults(|f| f.fail_prepare = Some(RecorderPrepareCause::Io));
    sim.clear_calls();
    let dir = temp_dir();
    let path = dir.join("clip.mp4");

    session.start_video_record(&path).unwrap();
    let event = expect_event(&events, |e| matches!(e, CameraEvent::VideoRecordError { .. }));
    match event {
        CameraEvent::VideoRecordError { path: failed, error } => {
            assert_eq!(failed, path);
            assert!(matches!(
                error,
                CameraError::RecorderPrepare {
                    cause: RecorderPrepareCause::Io,
                    ..
                }
            ));
        }
        other => panic!("unexpected {:?}", other),
    }

    assert_eq!(session.state(), SessionState::Previewing);
    assert!(!session.is_recording());
    assert_eq!(sim.calls().last(), Some(&SimCall::Lock));
    assert_eq!(sim.count(SimCall::RecorderRelease), 1);

    // The camera is usable again.
    sim.update_faults(|f| f.fail_prepare = None);
    session.take_photo(dir.join("after.jpg")).unwrap();
    expect_event(&events, |e| matches!(e, CameraEvent::PhotoTaken(_)));
    session.start_video_record(&path).unwrap();
    started(&events);
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn record_before_open_reports_not_open() {
    let (session, events, _sim) = start(CameraConfiguration::default());
    session.start_video_record(temp_dir().join("clip.mp4")).unwrap();
    let event = expect_event(&events, |e| matches!(e, CameraEvent::VideoRecordError { .. }));
    assert!(matches!(
        event,
        CameraEvent::VideoRecordError {
            error: CameraError::NotOpen,
            ..
        }
    ));
    assert!(!session.is_recording());
}

#[test]
fn close_during_recording_aborts_and_discards() {
    let (session, events, sim) = start(limited());
    open_previewing(&session, &events, 0);
    let dir = temp_dir();
    let path = dir.join("clip.mp4");

    session.start_video_record(&path).unwrap();
    started(&events);
    assert!(path.exists());

    session.close().unwrap();
    let posted = settle(&session, &events);
    assert_eq!(
        posted,
        vec![
            CameraEvent::VideoRecordError {
                path: path.clone(),
                error: CameraError::RecordingAborted,
            },
            CameraEvent::Closed { camera_id: 0 },
        ]
    );
    assert!(!path.exists());
    assert!(!sim.is_open(0));
    assert!(!sim.is_recording());
    assert!(!session.is_recording());
    assert_eq!(session.state(), SessionState::Closed);
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn close_queued_behind_start_runs_after_it() {
    let (session, events, _sim) = start(CameraConfiguration::default());
    open_previewing(&session, &events, 0);
    let dir = temp_dir();
    let path: PathBuf = dir.join("clip.mp4");

    session.start_video_record(&path).unwrap();
    session.close().unwrap();
    let posted = settle(&session, &events);

    assert!(matches!(posted[0], CameraEvent::VideoRecordStarted { .. }));
    assert!(matches!(
        posted[1],
        CameraEvent::VideoRecordError {
            error: CameraError::RecordingAborted,
            ..
        }
    ));
    assert_eq!(posted[2], CameraEvent::Closed { camera_id: 0 });
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn video_size_falls_back_to_preview_sizes() {
    // The front camera reports no video sizes; its 720x480 profile is
    // matched against the preview list instead.
    let config = CameraConfiguration {
        media_quality: MediaQuality::Low,
        ..CameraConfiguration::default()
    };
    let (session, events, sim) = start(config);
    open_previewing(&session, &events, fixtures::FRONT_CAMERA_ID);

    let profile = session.capability_profile().unwrap();
    assert_eq!(profile.recording.frame_size(), Size::new(720, 480));
    assert_eq!(profile.video_size, Size::new(640, 480));

    let dir = temp_dir();
    session.start_video_record(dir.join("selfie.mp4")).unwrap();
    assert_eq!(started(&events), Size::new(640, 480));
    // Front camera mounted at 270°, device upright.
    assert_eq!(sim.last_recorder_config().unwrap().orientation_hint, Rotation::Deg270);
    fs::remove_dir_all(&dir).ok();
}
