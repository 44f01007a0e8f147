use serde::{Deserialize, Serialize};

/// A discrete frame size reported by the device, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height. Zero-height sizes report a ratio of 0.
    pub fn ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn long_edge(&self) -> u32 {
        self.width.max(self.height)
    }

    pub fn short_edge(&self) -> u32 {
        self.width.min(self.height)
    }

    /// Whether this size fits inside `ceiling` regardless of orientation.
    pub fn fits_within(&self, ceiling: Size) -> bool {
        self.long_edge() <= ceiling.long_edge() && self.short_edge() <= ceiling.short_edge()
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ratio_and_area() {
        let size = Size::new(1920, 1080);
        assert_relative_eq!(size.ratio(), 16.0 / 9.0);
        assert_eq!(size.area(), 2_073_600);
        assert_eq!(Size::new(640, 0).ratio(), 0.0);
    }

    #[test]
    fn fits_within_ignores_orientation() {
        let ceiling = Size::new(1280, 720);
        assert!(Size::new(720, 1280).fits_within(ceiling));
        assert!(Size::new(1280, 720).fits_within(ceiling));
        assert!(!Size::new(1440, 1080).fits_within(ceiling));
    }

    #[test]
    fn display_format() {
        assert_eq!(Size::from((640, 480)).to_string(), "640x480");
    }
}
