//! Final canvas assembly.
//!
//! Combines a [`Fit`] with a [`Background`]. The sharp foreground is shrunk
//! onto the inset exactly (sources smaller than the inset keep their size),
//! the letterbox is filled with a solid gray or a blurred backdrop, and the
//! foreground is copied over the middle of the canvas.

use super::backdrop::blur_fill;
use super::calculations::centered_rect;
use super::fit::Fit;
use super::params::Background;
use super::plane::{CHANNELS, Dimensions, Plane, Rect, from_dynamic, solid_gray};
use super::scaler::{ImagingError, Scaler};
use image::DynamicImage;

/// Render `source` onto the canvas chosen by `fit`.
///
/// When the scaled foreground already fills the canvas it is returned as is
/// and no background is built.
pub fn compose(
    scaler: &impl Scaler,
    source: &DynamicImage,
    fit: &Fit,
    background: &Background,
) -> Result<Plane, ImagingError> {
    let foreground = from_dynamic(&scale_foreground(scaler, source, fit.inset));
    let fg_dims = Dimensions::of_plane(&foreground);
    if fg_dims == fit.canvas {
        return Ok(foreground);
    }

    let mut canvas = match *background {
        Background::Solid { gray } => solid_gray(fit.canvas, gray),
        Background::Blurred { sigma } => {
            blur_fill(scaler, source, Rect::from_dimensions(fit.canvas), sigma)?
        }
    };

    draw_over(&mut canvas, &foreground, centered_rect(fit.canvas, fg_dims));
    Ok(canvas)
}

/// Shrink `source` onto `inset` without upscaling either axis.
///
/// The inset is truncated from the fit scale, so recomputing it from the
/// source aspect can come out one pixel short on the axis that touches the
/// canvas. Resizing to the inset directly keeps that edge covered.
fn scale_foreground(
    scaler: &impl Scaler,
    source: &DynamicImage,
    inset: Dimensions,
) -> DynamicImage {
    let (width, height) = (source.width(), source.height());
    if width <= inset.width && height <= inset.height {
        return scaler.fit_within(source, inset.width, inset.height);
    }
    scaler.resize_exact(source, inset.width.min(width), inset.height.min(height))
}

/// Overwrite `at` in `dest` with the pixels of `src` (opaque copy).
///
/// `src`'s origin lands on `at`'s top-left corner. Parts of `at` outside
/// `dest` or beyond `src` are skipped.
pub fn draw_over(dest: &mut Plane, src: &Plane, at: Rect) {
    let dest_bounds = Rect::from_dimensions(Dimensions::of_plane(dest));
    let src_extent = Rect::new(
        at.min_x,
        at.min_y,
        at.min_x + src.width() as i64,
        at.min_y + src.height() as i64,
    );
    let clip = at.intersect(&dest_bounds).intersect(&src_extent);
    if clip.is_empty() {
        return;
    }

    let dest_stride = dest.width() as usize * CHANNELS;
    let src_stride = src.width() as usize * CHANNELS;
    let span = clip.width() as usize * CHANNELS;
    let src_raw: &[u16] = src.as_raw();
    let dest_raw: &mut [u16] = dest;

    for y in clip.min_y..clip.max_y {
        let sy = (y - at.min_y) as usize;
        let sx = (clip.min_x - at.min_x) as usize;
        let s = sy * src_stride + sx * CHANNELS;
        let d = y as usize * dest_stride + clip.min_x as usize * CHANNELS;
        dest_raw[d..d + span].copy_from_slice(&src_raw[s..s + span]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::fit::best_fit;
    use crate::imaging::scaler::tests::{MockScaler, RecordedOp};
    use image::{Rgba, RgbaImage};

    const RED: Rgba<u16> = Rgba([51400, 0, 0, u16::MAX]);
    const WHITE: Rgba<u16> = Rgba([u16::MAX; 4]);

    fn red(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([200, 0, 0, 255])))
    }

    fn small_canvas_fit(source: Dimensions) -> Fit {
        best_fit(source, &[Dimensions::new(120, 100)]).unwrap()
    }

    #[test]
    fn exact_fit_returns_foreground_only() {
        let scaler = MockScaler::new();
        let fit = small_canvas_fit(Dimensions::new(240, 200));
        assert!(fit.is_exact());

        let out = compose(&scaler, &red(240, 200), &fit, &Background::white()).unwrap();
        assert_eq!(out.dimensions(), (120, 100));
        assert!(out.pixels().all(|p| *p == RED));
        assert_eq!(scaler.get_operations().len(), 1);
    }

    #[test]
    fn solid_background_surrounds_centered_inset() {
        let scaler = MockScaler::new();
        // 240x80 → inset 120x40 on a 120x100 canvas, bars top and bottom.
        let fit = small_canvas_fit(Dimensions::new(240, 80));
        assert_eq!(fit.inset, Dimensions::new(120, 40));

        let out = compose(&scaler, &red(240, 80), &fit, &Background::white()).unwrap();
        assert_eq!(out.dimensions(), (120, 100));
        assert_eq!(*out.get_pixel(60, 29), WHITE);
        assert_eq!(*out.get_pixel(60, 30), RED);
        assert_eq!(*out.get_pixel(0, 69), RED);
        assert_eq!(*out.get_pixel(119, 70), WHITE);
    }

    #[test]
    fn small_source_is_not_upscaled() {
        let scaler = MockScaler::new();
        // 60x20 would scale 2x into the inset; it stays 60x20 instead.
        let fit = small_canvas_fit(Dimensions::new(60, 20));
        let out = compose(&scaler, &red(60, 20), &fit, &Background::black()).unwrap();

        // Centered at x 30..90, y 40..60.
        assert_eq!(out.get_pixel(29, 50)[3], u16::MAX);
        assert_eq!(out.get_pixel(29, 50)[0], 0);
        assert_eq!(*out.get_pixel(30, 40), RED);
        assert_eq!(*out.get_pixel(89, 59), RED);
        assert_eq!(out.get_pixel(90, 59)[0], 0);
        assert_eq!(out.get_pixel(30, 60)[0], 0);
    }

    #[test]
    fn truncated_inset_spans_the_touching_axis() {
        let scaler = MockScaler::new();
        let candidates = [
            Dimensions::new(1080, 1080),
            Dimensions::new(1080, 608),
            Dimensions::new(1080, 1350),
        ];
        let fit = best_fit(Dimensions::new(1920, 1080), &candidates).unwrap();
        assert_eq!(fit.canvas, Dimensions::new(1080, 608));
        assert_eq!(fit.inset, Dimensions::new(1080, 607));

        let out = compose(&scaler, &red(1920, 1080), &fit, &Background::black()).unwrap();
        assert_eq!(out.dimensions(), (1080, 608));
        // Full width is photo; the odd leftover row goes to the bottom.
        assert_eq!(*out.get_pixel(0, 300), RED);
        assert_eq!(*out.get_pixel(1079, 300), RED);
        assert_eq!(*out.get_pixel(1079, 606), RED);
        assert_eq!(out.get_pixel(540, 607)[0], 0);
        assert_eq!(
            scaler.get_operations()[0],
            RecordedOp::ResizeExact {
                source: (1920, 1080),
                size: (1080, 607)
            }
        );
    }

    #[test]
    fn small_source_keeps_its_own_size() {
        let scaler = MockScaler::new();
        let fit = small_canvas_fit(Dimensions::new(60, 20));
        compose(&scaler, &red(60, 20), &fit, &Background::white()).unwrap();
        assert!(matches!(
            scaler.get_operations()[0],
            RecordedOp::FitWithin { source: (60, 20), .. }
        ));
    }

    #[test]
    fn blurred_background_uses_fill_scale() {
        let scaler = MockScaler::new();
        let fit = small_canvas_fit(Dimensions::new(240, 80));
        let out = compose(
            &scaler,
            &red(240, 80),
            &fit,
            &Background::Blurred { sigma: 4.0 },
        )
        .unwrap();

        assert_eq!(out.dimensions(), (120, 100));
        // Flat red source → flat red backdrop → whole canvas red.
        assert!(out.pixels().all(|p| *p == RED));

        let ops = scaler.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], RecordedOp::ResizeExact { .. }));
        assert!(matches!(ops[1], RecordedOp::FillDimension { .. }));
    }

    #[test]
    fn draw_over_clips_to_destination() {
        let mut dest = Plane::from_pixel(4, 4, WHITE);
        let src = Plane::from_pixel(3, 3, RED);
        draw_over(&mut dest, &src, Rect::new(2, -1, 5, 2));

        assert_eq!(*dest.get_pixel(2, 0), RED);
        assert_eq!(*dest.get_pixel(3, 1), RED);
        assert_eq!(*dest.get_pixel(1, 0), WHITE);
        assert_eq!(*dest.get_pixel(2, 2), WHITE);
    }

    #[test]
    fn draw_over_outside_is_noop() {
        let mut dest = Plane::from_pixel(2, 2, WHITE);
        let src = Plane::from_pixel(2, 2, RED);
        draw_over(&mut dest, &src, Rect::new(10, 10, 12, 12));
        assert!(dest.pixels().all(|p| *p == WHITE));
    }
}
