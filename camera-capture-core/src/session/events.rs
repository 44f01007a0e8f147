use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::models::events::CameraEvent;
use crate::traits::camera_listener::CameraListener;

/// Worker-side end of the event channel.
#[derive(Clone)]
pub struct EventSink {
    tx: Sender<CameraEvent>,
}

impl EventSink {
    pub fn post(&self, event: CameraEvent) {
        log::trace!("posting {:?}", event);
        if self.tx.send(event).is_err() {
            log::debug!("event receiver dropped; discarding event");
        }
    }
}

/// Foreground end of the event channel.
///
/// Events arrive in the order the worker produced them. The owner decides
/// which thread drains them; listeners only ever run on that thread.
pub struct CameraEvents {
    rx: Receiver<CameraEvent>,
}

impl CameraEvents {
    pub fn channel() -> (EventSink, CameraEvents) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (EventSink { tx }, CameraEvents { rx })
    }

    pub fn try_next(&self) -> Option<CameraEvent> {
        self.rx.try_recv().ok()
    }

    /// `None` on timeout or once the session is gone.
    pub fn next_timeout(&self, timeout: Duration) -> Option<CameraEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Everything currently queued, without blocking.
    pub fn drain(&self) -> Vec<CameraEvent> {
        self.rx.try_iter().collect()
    }

    /// Wait for the first event matching `pred`, returning it together with
    /// every event received before it.
    pub fn wait_for<F>(
        &self,
        timeout: Duration,
        mut pred: F,
    ) -> Option<(CameraEvent, Vec<CameraEvent>)>
    where
        F: FnMut(&CameraEvent) -> bool,
    {
        let deadline = Instant::now() + timeout;
        let mut skipped = Vec::new();
        loop {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            let event = self.next_timeout(remaining)?;
            if pred(&event) {
                return Some((event, skipped));
            }
            skipped.push(event);
        }
    }

    /// Deliver every queued event to `listener`. Returns how many were delivered.
    pub fn dispatch_pending(&self, listener: &dyn CameraListener) -> usize {
        let mut delivered = 0;
        while let Ok(event) = self.rx.try_recv() {
            dispatch(&event, listener);
            delivered += 1;
        }
        delivered
    }
}

/// Route one event to the matching listener method.
pub fn dispatch(event: &CameraEvent, listener: &dyn CameraListener) {
    match event {
        CameraEvent::Opened {
            camera_id,
            preview_size,
        } => listener.on_opened(*camera_id, *preview_size),
        CameraEvent::OpenError { camera_id, error } => listener.on_open_error(*camera_id, error),
        CameraEvent::Ready => listener.on_ready(),
        CameraEvent::PreviewError { error } => listener.on_preview_error(error),
        CameraEvent::Closed { camera_id } => listener.on_closed(*camera_id),
        CameraEvent::PhotoTaken(result) => listener.on_photo_taken(result),
        CameraEvent::PhotoError { path, error } => listener.on_photo_error(path, error),
        CameraEvent::VideoRecordStarted { video_size } => {
            listener.on_video_record_started(*video_size)
        }
        CameraEvent::VideoRecordStopped(result) => listener.on_video_record_stopped(result),
        CameraEvent::VideoRecordError { path, error } => {
            listener.on_video_record_error(path, error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::camera_models::CameraId;
    use crate::models::error::CameraError;
    use crate::models::size::Size;
    use parking_lot::Mutex;
    use std::path::{Path, PathBuf};

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl CameraListener for Recorder {
        fn on_opened(&self, camera_id: CameraId, preview_size: Size) {
            self.calls.lock().push(format!("opened {} {}", camera_id, preview_size));
        }

        fn on_ready(&self) {
            self.calls.lock().push("ready".into());
        }

        fn on_closed(&self, camera_id: CameraId) {
            self.calls.lock().push(format!("closed {}", camera_id));
        }

        fn on_video_record_error(&self, path: &Path, error: &CameraError) {
            self.calls
                .lock()
                .push(format!("video error {} {}", path.display(), error));
        }
    }

    #[test]
    fn dispatch_preserves_order_and_routes_each_kind() {
        let (sink, events) = CameraEvents::channel();
        sink.post(CameraEvent::Opened {
            camera_id: 1,
            preview_size: Size::new(1280, 720),
        });
        sink.post(CameraEvent::Ready);
        sink.post(CameraEvent::VideoRecordError {
            path: PathBuf::from("clip.mp4"),
            error: CameraError::RecordingAborted,
        });
        sink.post(CameraEvent::Closed { camera_id: 1 });

        let listener = Recorder::default();
        assert_eq!(events.dispatch_pending(&listener), 4);
        assert_eq!(
            *listener.calls.lock(),
            vec![
                "opened 1 1280x720".to_string(),
                "ready".to_string(),
                "video error clip.mp4 recording aborted".to_string(),
                "closed 1".to_string(),
            ]
        );
        assert_eq!(events.dispatch_pending(&listener), 0);
    }

    #[test]
    fn unhandled_events_fall_through_to_defaults() {
        struct Silent;
        impl CameraListener for Silent {}

        let (sink, events) = CameraEvents::channel();
        sink.post(CameraEvent::PreviewError {
            error: CameraError::InvalidRotation(7),
        });
        assert_eq!(events.dispatch_pending(&Silent), 1);
    }

    #[test]
    fn wait_for_collects_skipped_events() {
        let (sink, events) = CameraEvents::channel();
        sink.post(CameraEvent::Ready);
        sink.post(CameraEvent::Closed { camera_id: 0 });

        let (hit, skipped) = events
            .wait_for(Duration::from_millis(100), |e| matches!(e, CameraEvent::Closed { .. }))
            .unwrap();
        assert_eq!(hit, CameraEvent::Closed { camera_id: 0 });
        assert_eq!(skipped, vec![CameraEvent::Ready]);
        assert!(events
            .wait_for(Duration::from_millis(10), |_| true)
            .is_none());
    }

    #[test]
    fn posting_after_receiver_dropped_is_harmless() {
        let (sink, events) = CameraEvents::channel();
        drop(events);
        sink.post(CameraEvent::Ready);
    }
}
