//! Fast Gaussian blur approximated by three box blurs.
//!
//! A box blur repeated three times is close enough to a Gaussian for a
//! backdrop, and each box blur is separable and O(n) per line regardless of
//! radius: a running sum slides along the row (or column), adding the pixel
//! entering the window and dropping the one leaving it.
//!
//! ```text
//! sigma ──boxes_for_gauss──► [w0, w1, w2] ──► radii r = (w-1)/2
//!
//! input ─h(r0)─► scratch ─v(r0)─► output      iteration 1
//! output ─h(r1)─► scratch ─v(r1)─► input      iteration 2 (roles swapped)
//! input ─h(r2)─► scratch ─v(r2)─► output      iteration 3
//! ```
//!
//! Pixels outside the plane replicate the nearest edge pixel, so a flat
//! plane comes back unchanged.
//!
//! ## Parallelism
//!
//! The horizontal pass hands each rayon task a band of whole rows of the
//! scratch plane. The vertical pass hands each task a band of columns; a task
//! writes its columns into its own buffer and the bands are scattered into the
//! output row by row afterwards. No task reads anything another task writes
//! within the same pass, and rayon's join is the barrier between passes.
//! [`Granularity`] only changes how lines are grouped into tasks, never the
//! bytes produced.
//!
//! Reference: <http://blog.ivank.net/fastest-gaussian-blur.html>

use super::accumulator::ColorAccumulator;
use super::plane::{CHANNELS, Dimensions, Plane};
use super::scaler::ImagingError;
use rayon::prelude::*;

/// Number of box blurs used to approximate one Gaussian.
pub const GAUSS_PASSES: usize = 3;

/// Box widths whose repeated application approximates a Gaussian of `sigma`.
///
/// All widths are odd. The first `m` are the largest odd width not above
/// the ideal width, the rest are two wider, with `m` chosen so the combined
/// variance lands closest to `sigma²`.
pub fn boxes_for_gauss(sigma: f64, n: usize) -> Vec<u32> {
    let nf = n as f64;
    let w_ideal = (12.0 * sigma * sigma / nf + 1.0).sqrt();
    let mut wl = w_ideal.floor() as i64;
    if wl % 2 == 0 {
        wl -= 1;
    }
    let wu = wl + 2;

    let wlf = wl as f64;
    let m_ideal =
        (12.0 * sigma * sigma - nf * wlf * wlf - 4.0 * nf * wlf - 3.0 * nf) / (-4.0 * wlf - 4.0);
    let m = m_ideal.round();

    (0..n)
        .map(|i| if (i as f64) < m { wl as u32 } else { wu as u32 })
        .collect()
}

/// The three window radii used by one Gaussian approximation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxRadii(pub [u32; GAUSS_PASSES]);

impl BoxRadii {
    pub fn for_sigma(sigma: f64) -> Self {
        let widths = boxes_for_gauss(sigma, GAUSS_PASSES);
        let mut radii = [0; GAUSS_PASSES];
        for (r, w) in radii.iter_mut().zip(widths) {
            *r = (w - 1) / 2;
        }
        Self(radii)
    }

    /// Largest radius; the one that bounds the minimum plane size.
    pub fn max(&self) -> u32 {
        self.0.iter().copied().max().unwrap_or(0)
    }
}

/// How many rows (or columns) each parallel task handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    /// One task per scanline or column.
    PerLine,
    /// A fixed number of lines per task.
    Batched(usize),
    /// About one band per worker thread in the current rayon pool.
    #[default]
    Auto,
}

impl Granularity {
    fn lines_per_task(self, lines: usize) -> usize {
        match self {
            Granularity::PerLine => 1,
            Granularity::Batched(n) => n.max(1),
            Granularity::Auto => lines.div_ceil(rayon::current_num_threads()).max(1),
        }
    }
}

/// Reject planes too small for a window of radius `radius`.
fn check_window(dims: Dimensions, radius: u32) -> Result<(), ImagingError> {
    if dims.is_empty() {
        return Err(ImagingError::PreconditionViolation(format!(
            "cannot blur zero-area plane {dims}"
        )));
    }
    let window = 2 * radius as u64 + 1;
    if window > dims.width.min(dims.height) as u64 {
        return Err(ImagingError::PreconditionViolation(format!(
            "blur window {window} (radius {radius}) does not fit plane {dims}"
        )));
    }
    Ok(())
}

/// Input, scratch and output planes reused across the Gaussian iterations.
///
/// `roles` holds the index of the plane currently playing input, scratch
/// and output. After each box blur the input and output indices swap, so
/// the result of one iteration is read by the next without copying.
struct BufferSet {
    planes: [Plane; 3],
    roles: [usize; 3],
}

const INPUT: usize = 0;
const SCRATCH: usize = 1;
const OUTPUT: usize = 2;

impl BufferSet {
    fn new(source: Plane) -> Self {
        let (w, h) = source.dimensions();
        Self {
            planes: [source, Plane::new(w, h), Plane::new(w, h)],
            roles: [0, 1, 2],
        }
    }

    fn box_blur(&mut self, radius: usize, granularity: Granularity) {
        let input = self.roles[INPUT];
        let scratch = self.roles[SCRATCH];
        let output = self.roles[OUTPUT];
        {
            let (src, dst) = read_write(&mut self.planes, input, scratch);
            blur_horizontal(src, dst, radius, granularity);
        }
        let (src, dst) = read_write(&mut self.planes, scratch, output);
        blur_vertical(src, dst, radius, granularity);
    }

    fn swap_input_output(&mut self) {
        self.roles.swap(INPUT, OUTPUT);
    }

    /// The plane holding the latest result, after [`swap_input_output`](Self::swap_input_output).
    fn into_input(self) -> Plane {
        let [a, b, c] = self.planes;
        match self.roles[INPUT] {
            0 => a,
            1 => b,
            _ => c,
        }
    }
}

/// Borrow one plane for reading and a different one for writing.
fn read_write(planes: &mut [Plane; 3], read: usize, write: usize) -> (&Plane, &mut Plane) {
    assert_ne!(read, write, "a pass cannot read and write the same plane");
    if read < write {
        let (lo, hi) = planes.split_at_mut(write);
        (&lo[read], &mut hi[0])
    } else {
        let (lo, hi) = planes.split_at_mut(read);
        (&hi[0], &mut lo[write])
    }
}

/// Approximate a Gaussian blur of `sigma` with the default task granularity.
pub fn gaussian_approximate(plane: &Plane, sigma: f64) -> Result<Plane, ImagingError> {
    gaussian_approximate_with(plane, sigma, Granularity::Auto)
}

/// Approximate a Gaussian blur of `sigma`, grouping lines as `granularity` says.
///
/// # Errors
/// [`ImagingError::PreconditionViolation`] when `sigma` is negative or not
/// finite, when the plane is empty, or when the widest box window
/// (`2r + 1`) exceeds the plane's smaller side.
pub fn gaussian_approximate_with(
    plane: &Plane,
    sigma: f64,
    granularity: Granularity,
) -> Result<Plane, ImagingError> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(ImagingError::PreconditionViolation(format!(
            "blur sigma must be a finite non-negative number, got {sigma}"
        )));
    }
    let radii = BoxRadii::for_sigma(sigma);
    let dims = Dimensions::of_plane(plane);
    check_window(dims, radii.max())?;
    log::debug!("gaussian blur {dims}, sigma {sigma}, radii {:?}", radii.0);

    let mut buffers = BufferSet::new(plane.clone());
    for r in radii.0 {
        buffers.box_blur(r as usize, granularity);
        buffers.swap_input_output();
    }
    Ok(buffers.into_input())
}

/// One separable box blur of radius `radius`: horizontal, then vertical.
pub fn box_blur(
    plane: &Plane,
    radius: u32,
    granularity: Granularity,
) -> Result<Plane, ImagingError> {
    check_window(Dimensions::of_plane(plane), radius)?;
    let mut buffers = BufferSet::new(plane.clone());
    buffers.box_blur(radius as usize, granularity);
    buffers.swap_input_output();
    Ok(buffers.into_input())
}

#[inline]
fn store(acc: &ColorAccumulator, iarr: f64, out: &mut [u16], index: usize) {
    acc.write_scaled(iarr, &mut out[index * CHANNELS..(index + 1) * CHANNELS]);
}

/// Slide a `2r + 1` window along one line of `len` pixels.
///
/// `pixel(i)` returns the i-th input pixel of the line; results are written
/// contiguously into `out`. Requires `2r + 1 <= len`.
fn slide_window<'a, F>(len: usize, r: usize, pixel: F, out: &mut [u16])
where
    F: Fn(usize) -> &'a [u16],
{
    let iarr = 1.0 / (2 * r + 1) as f64;
    let first = ColorAccumulator::from_pixel(pixel(0));
    let last = ColorAccumulator::from_pixel(pixel(len - 1));

    // Window centered on pixel 0: r + 1 copies of the edge, plus pixels 0..r.
    let mut acc = first.scaled((r + 1) as f64);
    for i in 0..r {
        acc.add_pixel(pixel(i));
    }

    let mut left = 0;
    let mut right = r;
    let mut target = 0;

    // Left margin: the outgoing sample is still the replicated edge.
    for _ in 0..=r {
        acc.add_pixel(pixel(right));
        acc -= first;
        right += 1;
        store(&acc, iarr, out, target);
        target += 1;
    }

    for _ in (r + 1)..(len - r) {
        acc.add_pixel(pixel(right));
        acc.sub_pixel(pixel(left));
        right += 1;
        left += 1;
        store(&acc, iarr, out, target);
        target += 1;
    }

    // Right margin: the incoming sample is the replicated edge.
    for _ in (len - r)..len {
        acc += last;
        acc.sub_pixel(pixel(left));
        left += 1;
        store(&acc, iarr, out, target);
        target += 1;
    }
}

fn blur_horizontal(src: &Plane, dst: &mut Plane, r: usize, granularity: Granularity) {
    let width = src.width() as usize;
    let row_len = width * CHANNELS;
    let band_len = row_len * granularity.lines_per_task(src.height() as usize);

    let src_raw: &[u16] = src.as_raw();
    let dst_raw: &mut [u16] = dst;

    dst_raw
        .par_chunks_mut(band_len)
        .zip(src_raw.par_chunks(band_len))
        .for_each(|(dst_band, src_band)| {
            for (dst_row, src_row) in dst_band
                .chunks_exact_mut(row_len)
                .zip(src_band.chunks_exact(row_len))
            {
                slide_window(
                    width,
                    r,
                    |x| &src_row[x * CHANNELS..(x + 1) * CHANNELS],
                    dst_row,
                );
            }
        });
}

fn blur_vertical(src: &Plane, dst: &mut Plane, r: usize, granularity: Granularity) {
    let width = src.width() as usize;
    let height = src.height() as usize;
    let column_len = height * CHANNELS;
    let cols_per_task = granularity.lines_per_task(width);
    let band_count = width.div_ceil(cols_per_task);

    let src_raw: &[u16] = src.as_raw();

    // Each band owns a column-major buffer for its columns.
    let bands: Vec<(usize, Vec<u16>)> = (0..band_count)
        .into_par_iter()
        .map(|band| {
            let x0 = band * cols_per_task;
            let x1 = (x0 + cols_per_task).min(width);
            let mut columns = vec![0u16; (x1 - x0) * column_len];
            for (x, column) in (x0..x1).zip(columns.chunks_exact_mut(column_len)) {
                slide_window(
                    height,
                    r,
                    |y| {
                        let at = (y * width + x) * CHANNELS;
                        &src_raw[at..at + CHANNELS]
                    },
                    column,
                );
            }
            (x0, columns)
        })
        .collect();

    let row_len = width * CHANNELS;
    let dst_raw: &mut [u16] = dst;
    dst_raw
        .par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            for (x0, columns) in &bands {
                for (dx, column) in columns.chunks_exact(column_len).enumerate() {
                    let at = (x0 + dx) * CHANNELS;
                    row[at..at + CHANNELS]
                        .copy_from_slice(&column[y * CHANNELS..(y + 1) * CHANNELS]);
                }
            }
        });
}
