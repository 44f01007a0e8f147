//! # camera-capture-core
//!
//! Platform-agnostic camera capture core library.
//!
//! Provides size negotiation, orientation math, JPEG/EXIF output and the
//! camera session state machine. Platform backends implement the
//! `CameraPlatform`, `CameraDevice` and `MediaRecorder` traits and plug into
//! the generic `CameraSession`.
//!
//! ## Architecture
//!
//! ```text
//! camera-capture-core (this crate)
//! ├── traits/       ← CameraPlatform, CameraDevice, MediaRecorder, CameraListener
//! ├── models/       ← CameraError, SessionState, CameraConfiguration, Size, Rotation, etc.
//! ├── processing/   ← size negotiator, orientation resolver, recording profile selection
//! ├── session/      ← CameraSession, serial camera worker, event channel
//! └── storage/      ← photo writer, EXIF orientation stamping
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::camera_models::{
    CameraCapabilities, CameraId, CameraInfo, CameraParameters, Facing, FlashMode, FocusMode,
    PictureFormat, PreviewSurface,
};
pub use models::capture_result::{PhotoResult, StopReason, VideoResult};
pub use models::config::{CameraConfiguration, MediaAction, MediaQuality};
pub use models::error::{CameraError, RecorderPrepareCause, Severity};
pub use models::events::CameraEvent;
pub use models::recording_profile::{
    AudioCodec, CapabilityProfile, ContainerFormat, ProfileQuality, RecorderConfig, RecorderLimit,
    RecordingProfile, VideoCodec,
};
pub use models::rotation::{DisplayRotation, ExifOrientation, Rotation, SensorPosition};
pub use models::size::Size;
pub use models::state::{DeviceOwner, SessionState};
pub use processing::orientation::{resolve_display_rotation, resolve_output_rotation, CameraRoster};
pub use processing::size_negotiator::{pick_size_by_quality_tier, pick_size_by_ratio};
pub use session::camera_session::CameraSession;
pub use session::controller::SessionStatus;
pub use session::events::{CameraEvents, EventSink};
pub use session::worker::{Pending, SerialWorker, WorkerHandle};
pub use traits::camera_device::CameraDevice;
pub use traits::camera_listener::CameraListener;
pub use traits::camera_platform::CameraPlatform;
pub use traits::media_recorder::{MediaRecorder, RecorderLimitCallback};
