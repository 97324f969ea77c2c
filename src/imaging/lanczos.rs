//! Pure Rust resize backend: `image::imageops` with a Lanczos3 filter.
//!
//! ## Operation mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Fit within bounds | [`fit_within_dimensions`] + `image::imageops::resize` |
//! | Fill one dimension | [`constrained_dimensions`] + `image::imageops::resize` |
//! | Exact size | `image::imageops::resize` |
//!
//! Target sizes are computed by the pure functions in
//! [`calculations`](super::calculations) so the scaler and the compositor
//! always agree on output dimensions.

use super::calculations::{constrained_dimensions, fit_within_dimensions};
use super::scaler::{Constraint, Scaler};
use image::DynamicImage;
use image::imageops::FilterType;

/// Resize backend built on the `image` crate.
pub struct LanczosScaler {
    filter: FilterType,
}

impl LanczosScaler {
    pub fn new() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }

    /// Scaler with a different resampling filter (e.g. `Triangle` for speed).
    pub fn with_filter(filter: FilterType) -> Self {
        Self { filter }
    }

}

impl Default for LanczosScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scaler for LanczosScaler {
    fn fit_within(&self, img: &DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
        let (w, h) = fit_within_dimensions((img.width(), img.height()), (max_width, max_height));
        self.resize_exact(img, w, h)
    }

    fn fill_dimension(&self, img: &DynamicImage, constraint: Constraint) -> DynamicImage {
        let (w, h) = constrained_dimensions((img.width(), img.height()), constraint);
        self.resize_exact(img, w, h)
    }

    fn resize_exact(&self, img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        if (img.width(), img.height()) == (width, height) {
            return img.clone();
        }
        img.resize_exact(width, height, self.filter)
    }
}
