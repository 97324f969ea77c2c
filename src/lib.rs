//! # instafit
//!
//! Fits photos onto the fixed canvas sizes social platforms accept, without
//! cropping. Each photo gets the candidate canvas it covers best; whatever
//! is left over is filled with a solid gray or a blurred copy of the photo.
//!
//! # Architecture
//!
//! ```text
//! decode → best_fit → compose (backdrop + inset) → encode
//!            │           │
//!            │           └─ blur_fill → gaussian_approximate (3 box passes)
//!            └─ candidate list from config
//! ```
//!
//! The [`imaging`] core is pure: no I/O, no global state, errors only for
//! broken preconditions. The [`batch`] layer owns files, formats, the
//! per-file thread pool, and per-file error reporting.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Canvas selection, box-blur Gaussian, backdrop, compositing, resize trait |
//! | [`batch`] | Input discovery, per-file pipeline, parallel run, [`batch::BatchReport`] |
//! | [`config`] | `config.toml` loading, validation, merging, command-line overrides |
//! | [`output`] | CLI output formatting |
//! | [`testimages`] | Checkerboard PNGs for visual checks |
//!
//! # Design Decisions
//!
//! ## Never Crop, Never Upscale the Subject
//!
//! The sharp foreground is always the whole photo, scaled down to fit the
//! chosen canvas. Small photos keep their size and get a wider border rather
//! than a blurry enlargement. Only the backdrop is ever scaled up, and it is
//! blurred anyway.
//!
//! ## Premultiplied 16-bit Working Format
//!
//! Blurring straight-alpha pixels bleeds the color of transparent areas into
//! their neighbors. The core works on premultiplied RGBA16 planes and
//! converts back only when encoding, which also keeps rounding error from
//! three successive box passes below 8-bit visibility.
//!
//! ## Box Blur Instead of a True Gaussian
//!
//! Three box passes with widths chosen from sigma approximate a Gaussian
//! closely, and each pass costs the same regardless of radius thanks to a
//! sliding window sum. Backdrops with sigma 20 at 1080 px would otherwise
//! dominate the runtime.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod output;
pub mod testimages;
