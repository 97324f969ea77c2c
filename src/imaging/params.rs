//! Parameter types for compositing and encoding.
//!
//! These describe *what* to produce, not *how*. The batch layer builds them
//! from the resolved config and hands them to
//! [`compose`](super::compose::compose); nothing here reads global state.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1-100, default 80). Clamped on construction.
//! - [`Background`]: what fills the letterbox: a solid gray or a blurred backdrop.

/// Default blur strength for backdrops, in source-pixel units.
pub const DEFAULT_SIGMA: f64 = 20.0;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Letterbox fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Background {
    /// Opaque gray, 0.0 black to 1.0 white.
    Solid { gray: f32 },
    /// The photo itself, cover-scaled to the canvas and blurred.
    Blurred { sigma: f64 },
}

impl Background {
    pub fn white() -> Self {
        Self::Solid { gray: 1.0 }
    }

    pub fn black() -> Self {
        Self::Solid { gray: 0.0 }
    }

    /// The dark gray used by `--gray`.
    pub fn gray() -> Self {
        Self::Solid { gray: 0.125 }
    }

    pub fn blurred() -> Self {
        Self::Blurred {
            sigma: DEFAULT_SIGMA,
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::white()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_80() {
        assert_eq!(Quality::default().value(), 80);
    }

    #[test]
    fn background_presets() {
        assert_eq!(Background::default(), Background::Solid { gray: 1.0 });
        assert_eq!(Background::gray(), Background::Solid { gray: 0.125 });
        assert_eq!(Background::blurred(), Background::Blurred { sigma: 20.0 });
    }
}
