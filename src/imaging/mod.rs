//! Image processing core: canvas selection, blur, backdrop, composition.
//!
//! | Operation | Where |
//! |---|---|
//! | **Pick a canvas** | [`best_fit`] scores candidate sizes by coverage |
//! | **Gaussian approximation** | [`gaussian_approximate`]: three box passes, rayon-parallel |
//! | **Blurred backdrop** | [`blur_fill`]: cover-scale, blur, center-crop |
//! | **Final canvas** | [`compose`]: backdrop plus the sharp inset |
//! | **Resize** | [`Scaler`] trait, [`LanczosScaler`] on `image::imageops` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: [`Quality`] and [`Background`], built by the caller
//! - **Scaler**: [`Scaler`] trait + [`LanczosScaler`]
//! - **Planes**: the premultiplied 16-bit working format
//! - **Blur / Backdrop / Compose**: the pixel work, in that dependency order
//!
//! Everything here is synchronous and free of I/O. Decoding, encoding and the
//! per-file thread pool live in [`crate::batch`].

mod accumulator;
pub mod backdrop;
pub mod blur;
pub mod calculations;
pub mod compose;
pub mod fit;
pub mod lanczos;
mod params;
pub mod plane;
pub mod scaler;

pub use backdrop::blur_fill;
pub use blur::{Granularity, box_blur, boxes_for_gauss, gaussian_approximate};
pub use compose::{compose, draw_over};
pub use fit::{CandidateSize, Fit, Target, best_fit, coverage};
pub use lanczos::LanczosScaler;
pub use params::{Background, DEFAULT_SIGMA, Quality};
pub use plane::{Dimensions, Plane, Rect};
pub use scaler::{Constraint, ImagingError, Scaler};
