use super::error::CameraError;

/// Camera session lifecycle.
///
/// State transitions:
/// ```text
/// closed → opening → idle ⇄ previewing → capturing / recording → idle/previewing
///                      ↓        ↓
///                   closing → closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Closed,
    Opening,
    Idle,
    Previewing,
    Capturing,
    Recording,
    Closing,
}

impl SessionState {
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// A device handle is held in these states.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            Self::Idle | Self::Previewing | Self::Capturing | Self::Recording
        )
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    /// States a capture or recording may start from.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Idle | Self::Previewing)
    }
}

/// Which side currently holds the camera hardware lock.
///
/// The recorder may only drive the sensor after an explicit handoff, and the
/// camera must reclaim it once the recorder is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceOwner {
    #[default]
    Camera,
    Recorder,
}

impl DeviceOwner {
    /// Camera → recorder.
    pub fn hand_to_recorder(&mut self) -> Result<(), CameraError> {
        match self {
            Self::Camera => {
                *self = Self::Recorder;
                Ok(())
            }
            Self::Recorder => Err(CameraError::DeviceHandoff(
                "device already handed to the recorder".into(),
            )),
        }
    }

    /// Recorder → camera.
    pub fn reclaim(&mut self) -> Result<(), CameraError> {
        match self {
            Self::Recorder => {
                *self = Self::Camera;
                Ok(())
            }
            Self::Camera => Err(CameraError::DeviceHandoff(
                "device is not held by a recorder".into(),
            )),
        }
    }
}
