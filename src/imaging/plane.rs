//! The core's working pixel format and the geometry types around it.
//!
//! A [`Plane`] is a 16-bit RGBA buffer whose color channels are
//! **premultiplied** by alpha. Everything in the blur and compositing path
//! works on planes; conversion to and from the `image` crate's straight-alpha
//! [`DynamicImage`] happens only at the edges ([`from_dynamic`],
//! [`to_dynamic`], [`flatten_rgb8`]).
//!
//! Bounds are half-open: a plane of `width × height` covers
//! `[0, width) × [0, height)`. [`Rect`] carries an arbitrary half-open
//! rectangle for placement on a canvas.

use image::{DynamicImage, ImageBuffer, Rgb, RgbImage, Rgba};

/// 16-bit premultiplied RGBA image.
pub type Plane = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// Number of channels stored per pixel in a [`Plane`].
pub const CHANNELS: usize = 4;

const MAX: f64 = u16::MAX as f64;

/// Width and height of an image or canvas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height.
    pub fn aspect(self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn of_plane(plane: &Plane) -> Self {
        Self::new(plane.width(), plane.height())
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Half-open integer rectangle `[min_x, max_x) × [min_y, max_y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl Rect {
    pub const fn new(min_x: i64, min_y: i64, max_x: i64, max_y: i64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Rectangle anchored at the origin.
    pub fn from_dimensions(dims: Dimensions) -> Self {
        Self::new(0, 0, dims.width as i64, dims.height as i64)
    }

    pub fn width(&self) -> i64 {
        (self.max_x - self.min_x).max(0)
    }

    pub fn height(&self) -> i64 {
        (self.max_y - self.min_y).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width() as u32, self.height() as u32)
    }

    /// Intersection of two rectangles; empty when they do not overlap.
    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect::new(
            self.min_x.max(other.min_x),
            self.min_y.max(other.min_y),
            self.max_x.min(other.max_x),
            self.max_y.min(other.max_y),
        )
    }
}

/// Convert a decoded image into a premultiplied 16-bit plane.
pub fn from_dynamic(img: &DynamicImage) -> Plane {
    let mut plane = img.to_rgba16();
    for px in plane.pixels_mut() {
        let a = px[3];
        if a == u16::MAX {
            continue;
        }
        let alpha = a as f64 / MAX;
        for c in 0..3 {
            px[c] = (px[c] as f64 * alpha).round() as u16;
        }
    }
    plane
}

/// Convert a premultiplied plane back into a straight-alpha image.
pub fn to_dynamic(plane: &Plane) -> DynamicImage {
    let mut straight = plane.clone();
    for px in straight.pixels_mut() {
        let a = px[3];
        match a {
            u16::MAX => {}
            0 => {
                px[0] = 0;
                px[1] = 0;
                px[2] = 0;
            }
            _ => {
                let inv = MAX / a as f64;
                for c in 0..3 {
                    px[c] = (px[c] as f64 * inv).round().min(MAX) as u16;
                }
            }
        }
    }
    DynamicImage::ImageRgba16(straight)
}

/// Drop alpha for formats without it, compositing over black.
///
/// Premultiplied color already is the over-black composite, so this is a
/// straight 16 → 8 bit narrowing of the color channels.
pub fn flatten_rgb8(plane: &Plane) -> RgbImage {
    RgbImage::from_fn(plane.width(), plane.height(), |x, y| {
        let px = plane.get_pixel(x, y);
        Rgb([narrow(px[0]), narrow(px[1]), narrow(px[2])])
    })
}

fn narrow(v: u16) -> u8 {
    ((v as u32 + 128) / 257) as u8
}

/// An opaque plane filled with a single gray level (0.0 black, 1.0 white).
pub fn solid_gray(dims: Dimensions, gray: f32) -> Plane {
    let level = (gray.clamp(0.0, 1.0) as f64 * MAX).round() as u16;
    Plane::from_pixel(
        dims.width,
        dims.height,
        Rgba([level, level, level, u16::MAX]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn opaque_pixels_survive_premultiply() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            3,
            2,
            image::Rgba([200, 100, 50, 255]),
        ));
        let plane = from_dynamic(&img);
        let back = to_dynamic(&plane).to_rgba8();
        assert_eq!(back.get_pixel(1, 1), &image::Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn half_alpha_is_premultiplied() {
        let img = DynamicImage::ImageRgba16(Plane::from_pixel(
            1,
            1,
            Rgba([u16::MAX, 0, 1000, 32768]),
        ));
        let plane = from_dynamic(&img);
        let px = plane.get_pixel(0, 0);
        assert_eq!(px[3], 32768);
        assert_eq!(px[0], 32768);
        assert_eq!(px[1], 0);
        assert_eq!(px[2], 500);
    }

    #[test]
    fn fully_transparent_unpremultiplies_to_zero() {
        let plane = Plane::from_pixel(1, 1, Rgba([10, 20, 30, 0]));
        let back = to_dynamic(&plane).to_rgba16();
        assert_eq!(back.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn flatten_composites_over_black() {
        let mut plane = Plane::from_pixel(2, 1, Rgba([51400, 25700, 0, u16::MAX]));
        // Half-transparent white, premultiplied.
        plane.put_pixel(1, 0, Rgba([32768, 32768, 32768, 32768]));
        let rgb = flatten_rgb8(&plane);
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([200, 100, 0]));
        assert_eq!(rgb.get_pixel(1, 0), &Rgb([128, 128, 128]));
    }

    #[test]
    fn solid_gray_levels() {
        let white = solid_gray(Dimensions::new(2, 2), 1.0);
        assert_eq!(white.get_pixel(0, 0), &Rgba([u16::MAX; 4]));
        let black = solid_gray(Dimensions::new(2, 2), 0.0);
        assert_eq!(black.get_pixel(1, 1), &Rgba([0, 0, 0, u16::MAX]));
        let clamped = solid_gray(Dimensions::new(1, 1), 3.0);
        assert_eq!(clamped.get_pixel(0, 0)[0], u16::MAX);
    }

    #[test]
    fn rect_dimensions_and_intersection() {
        let a = Rect::new(0, 0, 10, 8);
        let b = Rect::new(5, -2, 20, 4);
        assert_eq!(a.dimensions(), Dimensions::new(10, 8));
        assert_eq!(a.intersect(&b), Rect::new(5, 0, 10, 4));
        assert!(a.intersect(&Rect::new(20, 20, 30, 30)).is_empty());
    }

    #[test]
    fn dimensions_display() {
        assert_eq!(Dimensions::new(1080, 1350).to_string(), "1080x1350");
    }
}
