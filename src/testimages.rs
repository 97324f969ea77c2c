//! Checkerboard test images for eyeballing canvas selection and letterboxing.
//!
//! `instafit test-images <DIR>` writes one PNG per (size class, aspect ratio)
//! pair. The checker cells make scaling, centering, and cropping errors easy
//! to spot by eye: a cell that is not square, or a board that is not
//! symmetric around the canvas center, is a bug.
//!
//! ```text
//! test-sm-0600x0750.png   4:5 at 600 wide
//! test-sm-0252x0315.png   4:5 at 315 high
//! test-lg-2400x1350.png   16:9 at 2400 wide
//! ```

use crate::imaging::Dimensions;
use image::{ImageFormat, Rgb, RgbImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TestImageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to write image: {0}")]
    Image(#[from] image::ImageError),
}

/// Checker cell edge in pixels.
pub const CELL: u32 = 20;

const LIGHT: Rgb<u8> = Rgb([200, 200, 200]);
const DARK: Rgb<u8> = Rgb([100, 100, 100]);

/// Aspect ratios as `(width, height)`: print formats, screens, extremes.
pub const RATIOS: &[(u32, u32)] = &[
    (4, 5),
    (5, 4),
    (5, 7),
    (7, 5),
    (17, 22),
    (22, 17),
    (2, 3),
    (3, 2),
    (9, 16),
    (16, 9),
    (2, 1),
    (1, 2),
    (1, 1),
];

/// One axis is pinned; the other follows the ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pin {
    Width(u32),
    Height(u32),
}

const SIZE_CLASSES: &[(&str, Pin)] = &[
    ("sm", Pin::Width(600)),
    ("sm", Pin::Height(315)),
    ("md", Pin::Width(1200)),
    ("md", Pin::Height(630)),
    ("lg", Pin::Width(2400)),
    ("lg", Pin::Height(1260)),
];

/// Every test image as `(size class, dimensions)`, in generation order.
pub fn test_image_sizes() -> Vec<(&'static str, Dimensions)> {
    SIZE_CLASSES
        .iter()
        .flat_map(|&(name, pin)| {
            RATIOS.iter().map(move |&(rw, rh)| {
                let dims = match pin {
                    Pin::Width(w) => Dimensions::new(w, w * rh / rw),
                    Pin::Height(h) => Dimensions::new(h * rw / rh, h),
                };
                (name, dims)
            })
        })
        .collect()
}

/// A `width × height` board of `cell`-pixel squares, light at the origin.
pub fn checkerboard(width: u32, height: u32, cell: u32) -> RgbImage {
    let cell = cell.max(1);
    RgbImage::from_fn(width, height, |x, y| {
        if (x / cell) % 2 == (y / cell) % 2 {
            LIGHT
        } else {
            DARK
        }
    })
}

/// `test-<class>-<WWWW>x<HHHH>.png`
pub fn file_name(class: &str, dims: Dimensions) -> String {
    format!("test-{class}-{:04}x{:04}.png", dims.width, dims.height)
}

/// Write the full set into `dir`, creating it if needed.
pub fn write_test_images(dir: &Path) -> Result<Vec<PathBuf>, TestImageError> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for (class, dims) in test_image_sizes() {
        let path = dir.join(file_name(class, dims));
        checkerboard(dims.width, dims.height, CELL).save_with_format(&path, ImageFormat::Png)?;
        log::debug!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
