use thiserror::Error;

/// Sub-cause of a recorder `prepare` failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderPrepareCause {
    /// The recorder was configured in the wrong order or reused.
    InvalidState,
    /// The output file or the preview surface could not be opened.
    Io,
}

impl std::fmt::Display for RecorderPrepareCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidState => f.write_str("invalid state"),
            Self::Io => f.write_str("i/o"),
        }
    }
}

/// How far an error reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Logged and absorbed, current defaults stay in effect.
    Recoverable,
    /// Aborts the operation it occurred in.
    Fatal,
}

/// Errors that can occur while driving a camera session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera {0} is in use by another client")]
    DeviceUnavailable(u32),

    #[error("camera {0} does not exist")]
    DeviceNotFound(u32),

    #[error("no supported {0} size")]
    NoSupportedSize(&'static str),

    #[error("recorder prepare failed ({cause}): {message}")]
    RecorderPrepare {
        cause: RecorderPrepareCause,
        message: String,
    },

    #[error("failed to write capture: {0}")]
    CaptureWrite(String),

    #[error("unexpected display rotation value: {0}")]
    InvalidRotation(i32),

    #[error("camera is not open")]
    NotOpen,

    #[error("camera is already open")]
    AlreadyOpen,

    #[error("camera busy: {0}")]
    Busy(String),

    #[error("camera rejected parameters: {0}")]
    ParameterRejected(String),

    #[error("recorder already stopped")]
    RecorderAlreadyStopped,

    #[error("recording aborted")]
    RecordingAborted,

    #[error("device handoff failed: {0}")]
    DeviceHandoff(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("camera worker is not running")]
    WorkerStopped,

    #[error("timed out waiting for the camera worker")]
    Timeout,

    #[error("platform error: {0}")]
    Platform(String),
}

impl CameraError {
    pub fn severity(&self) -> Severity {
        match self {
            Self::ParameterRejected(_) | Self::RecorderAlreadyStopped => Severity::Recoverable,
            _ => Severity::Fatal,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.severity() == Severity::Recoverable
    }

    pub fn prepare_state(message: impl Into<String>) -> Self {
        Self::RecorderPrepare {
            cause: RecorderPrepareCause::InvalidState,
            message: message.into(),
        }
    }

    pub fn prepare_io(message: impl Into<String>) -> Self {
        Self::RecorderPrepare {
            cause: RecorderPrepareCause::Io,
            message: message.into(),
        }
    }
}
