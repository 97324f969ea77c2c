//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::plane::{Dimensions, Rect};
use super::scaler::Constraint;

/// Pick the axis to pin so that a resize covers `target` completely.
///
/// A source wider than the target pins the height (width overflows); a
/// taller or equal-aspect source pins the width.
pub fn cover_constraint(source: (u32, u32), target: (u32, u32)) -> Constraint {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        Constraint::Height(tgt_h)
    } else {
        Constraint::Width(tgt_w)
    }
}

/// Output dimensions of a resize that pins one axis and derives the other
/// from the source aspect ratio (rounded, never below 1).
pub fn constrained_dimensions(source: (u32, u32), constraint: Constraint) -> (u32, u32) {
    let (src_w, src_h) = source;
    let src_aspect = src_w as f64 / src_h as f64;

    match constraint {
        Constraint::Width(w) => (w, ((w as f64 / src_aspect).round() as u32).max(1)),
        Constraint::Height(h) => (((h as f64 * src_aspect).round() as u32).max(1), h),
    }
}

/// Dimensions after shrinking `source` to fit inside `bounds`.
///
/// Sources already inside the bounds keep their size: this never upscales.
pub fn fit_within_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    if src_w <= max_w && src_h <= max_h {
        return source;
    }

    let ratio = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);
    let w = ((src_w as f64 * ratio).round() as u32).clamp(1, max_w.max(1));
    let h = ((src_h as f64 * ratio).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}

/// Rectangle of size `inner` centered inside a canvas of size `outer`.
///
/// Odd leftovers go to the right/bottom margin. When `inner` is larger
/// than `outer` the offsets go negative, which is how a center crop reads.
pub fn centered_rect(outer: Dimensions, inner: Dimensions) -> Rect {
    let x = (outer.width as i64 - inner.width as i64).div_euclid(2);
    let y = (outer.height as i64 - inner.height as i64).div_euclid(2);
    Rect::new(x, y, x + inner.width as i64, y + inner.height as i64)
}
