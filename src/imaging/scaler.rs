//! Resize trait and the error type shared by the imaging core.
//!
//! The [`Scaler`] trait defines the two resize shapes the core needs:
//!
//! | Operation | Used for |
//! |---|---|
//! | [`fit_within`](Scaler::fit_within) | The sharp foreground inset. Never upscales. |
//! | [`fill_dimension`](Scaler::fill_dimension) | The cover-scaled copy behind the blur. |
//! | [`resize_exact`](Scaler::resize_exact) | Shrinking the foreground onto a precomputed inset. |
//!
//! The production implementation is
//! [`LanczosScaler`](super::lanczos::LanczosScaler). Tests use the recording
//! `MockScaler` below so compositing logic can be checked without resampling.

use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImagingError {
    /// An integration bug: the caller broke a documented precondition.
    /// Never retried and never silently degraded.
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),
}

/// Which output axis a fill resize pins; the other follows the source aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Width(u32),
    Height(u32),
}

/// Trait for resize backends.
///
/// `Sync` so a single scaler can be shared by the batch worker pool.
pub trait Scaler: Sync {
    /// Shrink to fit inside `max_width × max_height`, preserving aspect.
    /// Images already inside the bounds are returned at their own size.
    fn fit_within(&self, img: &DynamicImage, max_width: u32, max_height: u32) -> DynamicImage;

    /// Resize so one axis matches the constraint exactly.
    fn fill_dimension(&self, img: &DynamicImage, constraint: Constraint) -> DynamicImage;

    /// Resize to exactly `width × height`. The caller owns the aspect.
    fn resize_exact(&self, img: &DynamicImage, width: u32, height: u32) -> DynamicImage;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::calculations::{constrained_dimensions, fit_within_dimensions};
    use image::RgbaImage;
    use std::sync::Mutex;

    /// Scaler that records calls and answers with flat images of the right size.
    /// Uses Mutex (not RefCell) so it is Sync like the real scaler.
    #[derive(Default)]
    pub struct MockScaler {
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        FitWithin {
            source: (u32, u32),
            max: (u32, u32),
        },
        FillDimension {
            source: (u32, u32),
            constraint: Constraint,
        },
        ResizeExact {
            source: (u32, u32),
            size: (u32, u32),
        },
    }

    impl MockScaler {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    fn flat_like(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        let px = img.to_rgba8().get_pixel(0, 0).to_owned();
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, px))
    }

    impl Scaler for MockScaler {
        fn fit_within(&self, img: &DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
            self.operations.lock().unwrap().push(RecordedOp::FitWithin {
                source: (img.width(), img.height()),
                max: (max_width, max_height),
            });
            let (w, h) = fit_within_dimensions((img.width(), img.height()), (max_width, max_height));
            flat_like(img, w, h)
        }

        fn fill_dimension(&self, img: &DynamicImage, constraint: Constraint) -> DynamicImage {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::FillDimension {
                    source: (img.width(), img.height()),
                    constraint,
                });
            let (w, h) = constrained_dimensions((img.width(), img.height()), constraint);
            flat_like(img, w, h)
        }

        fn resize_exact(&self, img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
            self.operations.lock().unwrap().push(RecordedOp::ResizeExact {
                source: (img.width(), img.height()),
                size: (width, height),
            });
            flat_like(img, width, height)
        }
    }

    #[test]
    fn mock_records_fit_within() {
        let scaler = MockScaler::new();
        let img = DynamicImage::ImageRgba8(RgbaImage::new(400, 200));

        let out = scaler.fit_within(&img, 100, 100);
        assert_eq!((out.width(), out.height()), (100, 50));

        let ops = scaler.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp::FitWithin {
                source: (400, 200),
                max: (100, 100)
            }
        ));
    }

    #[test]
    fn mock_records_fill_dimension() {
        let scaler = MockScaler::new();
        let img = DynamicImage::ImageRgba8(RgbaImage::new(400, 200));

        let out = scaler.fill_dimension(&img, Constraint::Height(50));
        assert_eq!((out.width(), out.height()), (100, 50));
        assert!(matches!(
            &scaler.get_operations()[0],
            RecordedOp::FillDimension {
                constraint: Constraint::Height(50),
                ..
            }
        ));
    }

    #[test]
    fn mock_records_resize_exact() {
        let scaler = MockScaler::new();
        let img = DynamicImage::ImageRgba8(RgbaImage::new(1920, 1080));

        let out = scaler.resize_exact(&img, 1080, 607);
        assert_eq!((out.width(), out.height()), (1080, 607));
        assert_eq!(
            scaler.get_operations(),
            vec![RecordedOp::ResizeExact {
                source: (1920, 1080),
                size: (1080, 607)
            }]
        );
    }
}
