//! Blurred backdrops for letterboxed canvases.
//!
//! The backdrop is the photo itself, scaled to *cover* the canvas (one axis
//! matches, the other overflows), blurred, then center-cropped to the
//! canvas. Scaling happens before blurring so the blur runs at canvas
//! resolution rather than on the full-size original.

use super::blur::gaussian_approximate;
use super::calculations::{centered_rect, cover_constraint};
use super::plane::{Dimensions, Plane, Rect, from_dynamic};
use super::scaler::{ImagingError, Scaler};
use image::DynamicImage;

/// Build a blurred cover-scaled backdrop exactly the size of `canvas`.
///
/// `sigma` is measured in pixels of the cover-scaled copy.
///
/// # Errors
/// [`ImagingError::PreconditionViolation`] for an empty canvas or source,
/// or a canvas too small for the blur window `sigma` implies.
pub fn blur_fill(
    scaler: &impl Scaler,
    image: &DynamicImage,
    canvas: Rect,
    sigma: f64,
) -> Result<Plane, ImagingError> {
    let target = canvas.dimensions();
    if target.is_empty() {
        return Err(ImagingError::PreconditionViolation(format!(
            "backdrop canvas {target} has zero area"
        )));
    }
    let source = Dimensions::new(image.width(), image.height());
    if source.is_empty() {
        return Err(ImagingError::PreconditionViolation(format!(
            "backdrop source {source} has zero area"
        )));
    }

    let constraint = cover_constraint(
        (source.width, source.height),
        (target.width, target.height),
    );
    let filled = from_dynamic(&scaler.fill_dimension(image, constraint));
    let filled_dims = Dimensions::of_plane(&filled);
    if filled_dims.width < target.width || filled_dims.height < target.height {
        return Err(ImagingError::PreconditionViolation(format!(
            "cover scale {filled_dims} does not cover canvas {target}"
        )));
    }
    log::debug!("backdrop {source} → {filled_dims} ({constraint:?}), canvas {target}");

    let blurred = gaussian_approximate(&filled, sigma)?;
    Ok(center_crop(&blurred, target))
}

/// Cut a `size` window out of the middle of `plane`.
fn center_crop(plane: &Plane, size: Dimensions) -> Plane {
    let outer = Dimensions::of_plane(plane);
    if outer == size {
        return plane.clone();
    }
    let window = centered_rect(outer, size);
    image::imageops::crop_imm(
        plane,
        window.min_x.max(0) as u32,
        window.min_y.max(0) as u32,
        size.width,
        size.height,
    )
    .to_image()
}
