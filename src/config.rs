//! Tool configuration.
//!
//! Handles loading, validating, and layering `config.toml`. Values come from
//! three layers, later ones winning:
//!
//! ```text
//! stock defaults  →  config.toml  →  command-line flags
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [canvas]
//! target = "instagram"      # Built-in candidate list: instagram | instagram-story
//! # candidates = [[1080, 1350], [1080, 1080]]   # Explicit list, overrides target
//!
//! [background]
//! mode = "solid"            # solid | blur
//! gray = 1.0                # Solid fill level, 0.0 black .. 1.0 white
//! sigma = 20.0              # Blur strength for mode = "blur"
//!
//! [output]
//! suffix = "_insta.jpg"     # Appended to the input stem; .jpg or .png
//! quality = 80              # JPEG quality (1-100)
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [background]
//! mode = "blur"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Background, CandidateSize, Dimensions, Quality, Target};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `config.toml`.
///
/// All fields have defaults matching the stock behavior. Unknown keys are
/// rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstafitConfig {
    /// Which canvas sizes are considered.
    pub canvas: CanvasConfig,
    /// What fills the letterbox.
    pub background: BackgroundConfig,
    /// Output naming and encoding.
    pub output: OutputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl InstafitConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.background.gray) {
            return Err(ConfigError::Validation(
                "background.gray must be between 0.0 and 1.0".into(),
            ));
        }
        if !(self.background.sigma > 0.0 && self.background.sigma.is_finite()) {
            return Err(ConfigError::Validation(
                "background.sigma must be a positive number".into(),
            ));
        }
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if !matches!(
            self.output.format(),
            Some(image::ImageFormat::Jpeg | image::ImageFormat::Png)
        ) {
            return Err(ConfigError::Validation(
                "output.suffix must end in .jpg, .jpeg or .png".into(),
            ));
        }
        if let Some(candidates) = &self.canvas.candidates {
            if candidates.is_empty() {
                return Err(ConfigError::Validation(
                    "canvas.candidates must not be empty".into(),
                ));
            }
            if candidates.iter().any(|[w, h]| *w == 0 || *h == 0) {
                return Err(ConfigError::Validation(
                    "canvas.candidates values must be non-zero".into(),
                ));
            }
        }
        Ok(())
    }

    /// Candidate canvases in preference order.
    pub fn candidates(&self) -> Vec<CandidateSize> {
        match &self.canvas.candidates {
            Some(list) => list.iter().map(|&[w, h]| Dimensions::new(w, h)).collect(),
            None => self.canvas.target.candidates().to_vec(),
        }
    }
}

/// Canvas selection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    /// Built-in candidate list.
    pub target: Target,
    /// Explicit `[width, height]` list. Takes precedence over `target`.
    pub candidates: Option<Vec<[u32; 2]>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    #[default]
    Solid,
    Blur,
}

/// Letterbox fill settings.
///
/// Both `gray` and `sigma` are always present so switching `mode` alone
/// keeps a sensible value for the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackgroundConfig {
    pub mode: BackgroundMode,
    pub gray: f32,
    pub sigma: f64,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            mode: BackgroundMode::Solid,
            gray: 1.0,
            sigma: crate::imaging::DEFAULT_SIGMA,
        }
    }
}

impl BackgroundConfig {
    pub fn to_background(&self) -> Background {
        match self.mode {
            BackgroundMode::Solid => Background::Solid { gray: self.gray },
            BackgroundMode::Blur => Background::Blurred { sigma: self.sigma },
        }
    }
}

/// Output naming and encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Appended to the input file stem. Inputs already ending in it are skipped.
    /// Its extension picks the encoder: `.jpg`/`.jpeg` or `.png`.
    pub suffix: String,
    /// JPEG quality (1-100).
    pub quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: "_insta.jpg".to_string(),
            quality: Quality::default().value() as u32,
        }
    }
}

impl OutputConfig {
    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }

    /// Format named by the text after the suffix's last `.`, so a bare
    /// `.jpg` counts as well as `_insta.jpg`.
    pub fn format(&self) -> Option<image::ImageFormat> {
        let (_, extension) = self.suffix.rsplit_once('.')?;
        image::ImageFormat::from_extension(extension)
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of files processed at once.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Command-line overrides
// =============================================================================

/// Background selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundOverride {
    Solid(f32),
    Blur,
}

/// Values from command-line flags, applied on top of the loaded file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub target: Option<Target>,
    pub background: Option<BackgroundOverride>,
    pub sigma: Option<f64>,
    pub quality: Option<u32>,
    pub max_processes: Option<usize>,
}

impl Overrides {
    /// Apply every set flag to `config`.
    ///
    /// An explicit `target` drops any `candidates` list from the file, since
    /// naming a target on the command line is the more specific request.
    pub fn apply(&self, config: &mut InstafitConfig) {
        if let Some(target) = self.target {
            config.canvas.target = target;
            config.canvas.candidates = None;
        }
        match self.background {
            Some(BackgroundOverride::Solid(gray)) => {
                config.background.mode = BackgroundMode::Solid;
                config.background.gray = gray;
            }
            Some(BackgroundOverride::Blur) => config.background.mode = BackgroundMode::Blur,
            None => {}
        }
        if let Some(sigma) = self.sigma {
            config.background.sigma = sigma;
        }
        if let Some(quality) = self.quality {
            config.output.quality = quality;
        }
        if self.max_processes.is_some() {
            config.processing.max_processes = self.max_processes;
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(InstafitConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        log::debug!("no config at {}, using stock defaults", path.display());
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    log::debug!("loaded config from {}", path.display());
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<InstafitConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: InstafitConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, then apply command-line `overrides`.
///
/// A missing file means stock defaults. The result is validated after the
/// overrides land, so a bad flag value is reported like a bad file value.
pub fn load_config(path: &Path, overrides: &Overrides) -> Result<InstafitConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    let mut config = resolve_config(base, overlay)?;
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# instafit Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags (--white, --black, --gray, --background, --blur,
# --sigma, --quality, --target, --threads) override values from this file.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Canvas selection
# ---------------------------------------------------------------------------
[canvas]
# Built-in list of output sizes. Each photo gets the one it covers best.
#   instagram        1080x1080, 1080x1350, 1080x566
#   instagram-story  1080x1920
target = "instagram"

# Explicit [width, height] list, tried in order. Replaces `target` when set.
# On equal coverage the earlier entry wins.
# candidates = [[1080, 1350], [1080, 1080]]

# ---------------------------------------------------------------------------
# Letterbox background
# ---------------------------------------------------------------------------
[background]
# "solid" fills with a gray level; "blur" uses a blurred copy of the photo.
mode = "solid"

# Solid fill level: 0.0 = black, 1.0 = white.
gray = 1.0

# Gaussian blur strength in pixels for mode = "blur". Larger is softer.
sigma = 20.0

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Written next to each input as <stem><suffix>. Inputs whose name already
# ends with the suffix are skipped, so re-running over a folder is safe.
# The extension picks the format: .jpg/.jpeg (flattened) or .png (keeps alpha).
suffix = "_insta.jpg"

# JPEG encoding quality (1 = worst, 100 = best).
quality = 80

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum files processed in parallel.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
