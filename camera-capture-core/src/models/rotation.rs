use serde::{Deserialize, Serialize};

use super::error::CameraError;

/// A rotation normalized to one of the four right angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Self::Deg0, Self::Deg90, Self::Deg180, Self::Deg270];

    /// Exact conversion; anything that is not a right angle in `0..360` is rejected.
    pub fn from_degrees(degrees: u32) -> Option<Self> {
        match degrees {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    /// Reduce any multiple of 90 (negative included) into range.
    pub fn normalize(degrees: i32) -> Option<Self> {
        Self::from_degrees(degrees.rem_euclid(360) as u32)
    }

    pub fn degrees(self) -> u32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Display rotation as reported by the window service.
///
/// The platform reports a small enum (`0..=3`), not degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayRotation {
    Natural,
    LandscapeLeft,
    UpsideDown,
    LandscapeRight,
}

impl DisplayRotation {
    /// Map the raw window-service value. Unknown values are a platform
    /// configuration error and are never defaulted.
    pub fn from_raw(raw: i32) -> Result<Self, CameraError> {
        match raw {
            0 => Ok(Self::Natural),
            1 => Ok(Self::LandscapeLeft),
            2 => Ok(Self::UpsideDown),
            3 => Ok(Self::LandscapeRight),
            other => Err(CameraError::InvalidRotation(other)),
        }
    }

    pub fn rotation(self) -> Rotation {
        match self {
            Self::Natural => Rotation::Deg0,
            Self::LandscapeLeft => Rotation::Deg90,
            Self::UpsideDown => Rotation::Deg180,
            Self::LandscapeRight => Rotation::Deg270,
        }
    }
}

/// Configured physical position of the device while shooting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorPosition {
    #[default]
    Up,
    Left,
    UpsideDown,
    Right,
}

impl SensorPosition {
    pub fn rotation(self) -> Rotation {
        match self {
            Self::Up => Rotation::Deg0,
            Self::Left => Rotation::Deg90,
            Self::UpsideDown => Rotation::Deg180,
            Self::Right => Rotation::Deg270,
        }
    }
}

/// Values of the EXIF `Orientation` tag (0x0112) used for camera output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExifOrientation {
    Normal = 1,
    Rotate180 = 3,
    Rotate90 = 6,
    Rotate270 = 8,
}

impl ExifOrientation {
    pub fn value(self) -> u16 {
        self as u16
    }

    pub fn from_value(value: u16) -> Option<Self> {
        match value {
            1 => Some(Self::Normal),
            3 => Some(Self::Rotate180),
            6 => Some(Self::Rotate90),
            8 => Some(Self::Rotate270),
            _ => None,
        }
    }
}

impl From<Rotation> for ExifOrientation {
    fn from(rotation: Rotation) -> Self {
        match rotation {
            Rotation::Deg0 => Self::Normal,
            Rotation::Deg90 => Self::Rotate90,
            Rotation::Deg180 => Self::Rotate180,
            Rotation::Deg270 => Self::Rotate270,
        }
    }
}
