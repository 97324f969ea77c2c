//! Running channel sums for the sliding-window blur.

use std::ops::{AddAssign, SubAssign};

/// A running sum of r, g, b and a sample values.
///
/// Sums are kept in `f64`, so adding and removing whole 16-bit samples is
/// exact for any window a plane can hold. Alpha is summed and normalized the
/// same way as the color channels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColorAccumulator {
    sums: [f64; 4],
}

impl ColorAccumulator {
    /// Accumulator holding a single pixel's channels.
    pub fn from_pixel(px: &[u16]) -> Self {
        let mut acc = Self::default();
        acc.add_pixel(px);
        acc
    }

    pub fn add_pixel(&mut self, px: &[u16]) {
        for (sum, &v) in self.sums.iter_mut().zip(px) {
            *sum += v as f64;
        }
    }

    pub fn sub_pixel(&mut self, px: &[u16]) {
        for (sum, &v) in self.sums.iter_mut().zip(px) {
            *sum -= v as f64;
        }
    }

    /// Every channel multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            sums: self.sums.map(|s| s * factor),
        }
    }

    #[cfg(test)]
    pub fn channels(&self) -> [f64; 4] {
        self.sums
    }

    /// Write `round(sum × factor)` per channel into `out`, clamped to 16 bits.
    pub fn write_scaled(&self, factor: f64, out: &mut [u16]) {
        for (dst, &sum) in out.iter_mut().zip(&self.sums) {
            *dst = (sum * factor).round().clamp(0.0, u16::MAX as f64) as u16;
        }
    }
}

impl AddAssign for ColorAccumulator {
    fn add_assign(&mut self, rhs: Self) {
        for (sum, v) in self.sums.iter_mut().zip(rhs.sums) {
            *sum += v;
        }
    }
}

impl SubAssign for ColorAccumulator {
    fn sub_assign(&mut self, rhs: Self) {
        for (sum, v) in self.sums.iter_mut().zip(rhs.sums) {
            *sum -= v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_subtract_pixels() {
        let mut acc = ColorAccumulator::default();
        acc.add_pixel(&[10, 20, 30, 40]);
        acc.add_pixel(&[1, 2, 3, 4]);
        acc.sub_pixel(&[10, 20, 30, 40]);
        assert_eq!(acc.channels(), [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn add_and_subtract_accumulators() {
        let edge = ColorAccumulator::from_pixel(&[100, 200, 300, 65535]);
        let mut acc = edge.scaled(3.0);
        acc -= edge;
        acc += ColorAccumulator::from_pixel(&[1, 1, 1, 0]);
        assert_eq!(acc.channels(), [201.0, 401.0, 601.0, 131070.0]);
    }

    #[test]
    fn write_scaled_rounds_half_away_from_zero() {
        let acc = ColorAccumulator::from_pixel(&[3, 5, 7, 9]);
        let mut out = [0u16; 4];
        acc.write_scaled(0.5, &mut out);
        assert_eq!(out, [2, 3, 4, 5]);
    }

    #[test]
    fn write_scaled_clamps() {
        let mut acc = ColorAccumulator::from_pixel(&[65535, 0, 0, 65535]);
        acc.sub_pixel(&[0, 10, 0, 0]);
        let mut out = [0u16; 4];
        acc.write_scaled(2.0, &mut out);
        assert_eq!(out, [65535, 0, 0, 65535]);
    }

    #[test]
    fn opaque_window_stays_opaque() {
        for width in [1u32, 3, 7, 39, 41] {
            let acc = ColorAccumulator::from_pixel(&[0, 0, 0, u16::MAX]).scaled(width as f64);
            let mut out = [0u16; 4];
            acc.write_scaled(1.0 / width as f64, &mut out);
            assert_eq!(out[3], u16::MAX, "window {width}");
        }
    }
}
