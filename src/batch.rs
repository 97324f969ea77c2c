//! Batch processing: decode, fit, compose, encode.
//!
//! Takes the paths given on the command line and writes one canvas per
//! input, next to it:
//!
//! ```text
//! photos/
//! ├── beach.jpg
//! ├── beach_insta.jpg        # 1080x566 canvas, letterboxed
//! ├── portrait.png
//! └── portrait_insta.jpg     # 1080x1350 canvas, exact fit
//! ```
//!
//! ## Input Discovery
//!
//! Directories are walked recursively (sorted by file name, symlinks
//! followed) and filtered to decodable extensions. Entries the walk cannot
//! read are logged and left out. Files named explicitly are taken as is, so
//! a typo shows up as a per-file failure rather than vanishing. Inputs whose
//! name already ends with the output suffix are reported as skipped, which
//! makes re-running over a folder safe.
//!
//! Two inputs with the same stem (`photo.png`, `photo.tif`) would write the
//! same output. The first in input order keeps it; the others fail.
//!
//! ## Failure Model
//!
//! A file that fails to decode, compose, or encode is logged and recorded
//! in the [`BatchReport`]; the rest of the batch continues. The caller
//! decides what a failure means for the exit status. Encoders write to a
//! `.part` sibling that is renamed into place, so a failed encode never
//! leaves a truncated output behind.
//!
//! ## Parallel Processing
//!
//! Files are processed in parallel using [rayon](https://docs.rs/rayon) on
//! whatever pool is current (the CLI sizes the global pool from
//! `processing.max_processes`). Results keep input order regardless of
//! completion order.

use crate::config::InstafitConfig;
use crate::imaging::plane::{flatten_rgb8, to_dynamic};
use crate::imaging::{
    Background, CandidateSize, Dimensions, ImagingError, Plane, Quality, Scaler, best_fit,
    compose,
};
use image::ImageFormat;
use image::codecs::jpeg::JpegEncoder;
use rayon::prelude::*;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

/// Extensions picked up when walking a directory (compared lowercase).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "tif", "tiff", "webp"];

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Image processing failed: {0}")]
    Imaging(#[from] ImagingError),
    #[error("Output {} is already written by {}", output.display(), first.display())]
    OutputCollision { output: PathBuf, first: PathBuf },
}

/// Everything a worker needs to turn one input into one output.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub candidates: Vec<CandidateSize>,
    pub background: Background,
    pub quality: Quality,
    pub suffix: String,
}

impl BatchOptions {
    /// Build options from resolved config values.
    pub fn from_config(config: &InstafitConfig) -> Self {
        Self {
            candidates: config.candidates(),
            background: config.background.to_background(),
            quality: config.output.quality(),
            suffix: config.output.suffix.clone(),
        }
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::from_config(&InstafitConfig::default())
    }
}

/// A successfully written canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Written {
    pub output: PathBuf,
    pub source: Dimensions,
    pub canvas: Dimensions,
    pub coverage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Written(Written),
    /// Input already carries the output suffix.
    Skipped,
    /// Error message, already logged.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileResult {
    pub input: PathBuf,
    pub outcome: FileOutcome,
}

/// Progress notifications, sent while the batch runs.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started { total: usize },
    FileFinished(FileResult),
}

/// Per-file results in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub results: Vec<FileResult>,
}

impl BatchReport {
    pub fn written(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Written(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// True when `path` has one of the [`IMAGE_EXTENSIONS`].
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// True when `path` looks like something this tool wrote.
pub fn is_output(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(suffix))
        .unwrap_or(false)
}

/// `<dir>/<stem><suffix>` for an input `<dir>/<stem>.<ext>`.
pub fn output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{suffix}"))
}

/// Expand command-line paths into the list of files to process.
///
/// Directories contribute their image files, sorted by name; anything else
/// is passed through. Unreadable directory entries are logged and skipped.
pub fn collect_inputs(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        for entry in WalkDir::new(path).follow_links(true).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_file() && is_image_path(entry.path()) => {
                    files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => log::error!("skipping unreadable entry: {e}"),
            }
        }
    }
    files
}

/// For each input, the earlier input that already claims its output path.
///
/// Inputs that will be skipped as outputs claim nothing.
fn output_claims<'a>(inputs: &'a [PathBuf], suffix: &str) -> Vec<Option<&'a Path>> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    inputs
        .iter()
        .map(|input| {
            if is_output(input, suffix) {
                return None;
            }
            match claimed.entry(output_path(input, suffix)) {
                Entry::Occupied(first) => Some(*first.get()),
                Entry::Vacant(slot) => {
                    slot.insert(input);
                    None
                }
            }
        })
        .collect()
}

/// Run the whole pipeline for one file and write the result.
pub fn process_file(
    scaler: &impl Scaler,
    input: &Path,
    options: &BatchOptions,
) -> Result<Written, BatchError> {
    let img = image::open(input).map_err(|source| BatchError::Decode {
        path: input.to_path_buf(),
        source,
    })?;
    let source = Dimensions::new(img.width(), img.height());
    let fit = best_fit(source, &options.candidates)?;
    log::debug!(
        "{}: {source} → canvas {} (inset {}, coverage {:.3})",
        input.display(),
        fit.canvas,
        fit.inset,
        fit.coverage
    );

    let canvas = compose(scaler, &img, &fit, &options.background)?;
    let output = output_path(input, &options.suffix);
    encode(&canvas, &output, options.quality)?;

    Ok(Written {
        output,
        source,
        canvas: fit.canvas,
        coverage: fit.coverage,
    })
}

/// `<output>.part`, the file encoders write before it is renamed into place.
fn partial_path(output: &Path) -> PathBuf {
    let mut name = output.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    output.with_file_name(name)
}

/// Write `plane` to `output`, picking the encoder from its extension.
///
/// PNG keeps alpha. Everything else is written as JPEG, flattened over black.
/// On error nothing is left at `output` or at its `.part` file.
fn encode(plane: &Plane, output: &Path, quality: Quality) -> Result<(), BatchError> {
    let partial = partial_path(output);
    let result = write_encoded(plane, output, &partial, quality)
        .and_then(|()| fs::rename(&partial, output).map_err(BatchError::from));
    if result.is_err() {
        fs::remove_file(&partial).ok();
    }
    result
}

fn write_encoded(
    plane: &Plane,
    output: &Path,
    partial: &Path,
    quality: Quality,
) -> Result<(), BatchError> {
    let encode_err = |source| BatchError::Encode {
        path: output.to_path_buf(),
        source,
    };
    if let Ok(ImageFormat::Png) = ImageFormat::from_path(output) {
        return to_dynamic(plane)
            .to_rgba8()
            .save_with_format(partial, ImageFormat::Png)
            .map_err(encode_err);
    }

    let mut writer = BufWriter::new(File::create(partial)?);
    JpegEncoder::new_with_quality(&mut writer, quality.value())
        .encode_image(&flatten_rgb8(plane))
        .map_err(encode_err)?;
    writer.flush()?;
    Ok(())
}

fn process_one(
    scaler: &impl Scaler,
    input: &Path,
    claimed_by: Option<&Path>,
    options: &BatchOptions,
) -> FileResult {
    let outcome = if is_output(input, &options.suffix) {
        log::debug!("skipping {}: already an output", input.display());
        FileOutcome::Skipped
    } else {
        let result = match claimed_by {
            Some(first) => Err(BatchError::OutputCollision {
                output: output_path(input, &options.suffix),
                first: first.to_path_buf(),
            }),
            None => process_file(scaler, input, options),
        };
        match result {
            Ok(written) => FileOutcome::Written(written),
            Err(e) => {
                log::error!("{}: {e}", input.display());
                FileOutcome::Failed(e.to_string())
            }
        }
    };
    FileResult {
        input: input.to_path_buf(),
        outcome,
    }
}

/// Process every input in parallel and collect the results.
///
/// Inputs whose output path is already claimed by an earlier input fail
/// without being processed. When `progress` is given, a [`BatchEvent::Started`] is sent up front and a
/// [`BatchEvent::FileFinished`] as each file completes (completion order).
pub fn run(
    scaler: &impl Scaler,
    inputs: &[PathBuf],
    options: &BatchOptions,
    progress: Option<Sender<BatchEvent>>,
) -> BatchReport {
    if let Some(tx) = &progress {
        tx.send(BatchEvent::Started {
            total: inputs.len(),
        })
        .ok();
    }

    let claims = output_claims(inputs, &options.suffix);
    let results = inputs
        .par_iter()
        .zip(claims.par_iter())
        .map(|(input, claimed_by)| {
            let result = process_one(scaler, input, *claimed_by, options);
            if let Some(tx) = &progress {
                tx.send(BatchEvent::FileFinished(result.clone())).ok();
            }
            result
        })
        .collect();

    BatchReport { results }
}
