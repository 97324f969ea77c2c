//! Canvas selection: which of a fixed set of output sizes fits a photo best.
//!
//! Every social target accepts a handful of canvas sizes. For a given source
//! we score each candidate by **coverage**, the fraction of the canvas the
//! photo occupies once scaled to touch the canvas on its tighter axis, and
//! keep the best one. The rest of the canvas is letterbox, filled later by
//! the compositor.
//!
//! ```text
//! source 1920x1080 (1.78)
//!   1080x1080 (1.00)  coverage 0.56
//!   1080x608  (1.78)  coverage 0.999  ← chosen
//!   1080x1350 (0.80)  coverage 0.45
//! ```
//!
//! Ties go to the candidate declared first, so the order of a target's list
//! is part of its behavior.

use super::plane::Dimensions;
use super::scaler::ImagingError;
use serde::{Deserialize, Serialize};

/// One canvas option for an output target.
pub type CandidateSize = Dimensions;

/// Instagram feed: square first so exact-square sources never tie elsewhere.
pub const INSTAGRAM: &[CandidateSize] = &[
    Dimensions::new(1080, 1080),
    Dimensions::new(1080, 1350),
    Dimensions::new(1080, 566),
];

/// Instagram stories and reels: a single full-screen portrait canvas.
pub const INSTAGRAM_STORY: &[CandidateSize] = &[Dimensions::new(1080, 1920)];

/// Built-in candidate lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    #[default]
    Instagram,
    InstagramStory,
}

impl Target {
    pub fn candidates(self) -> &'static [CandidateSize] {
        match self {
            Target::Instagram => INSTAGRAM,
            Target::InstagramStory => INSTAGRAM_STORY,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Target::Instagram => "instagram",
            Target::InstagramStory => "instagram-story",
        }
    }
}

impl std::str::FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instagram" => Ok(Target::Instagram),
            "instagram-story" => Ok(Target::InstagramStory),
            other => Err(format!(
                "unknown target '{other}' (expected instagram or instagram-story)"
            )),
        }
    }
}

/// The chosen canvas and the size the source is scaled to inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub canvas: CandidateSize,
    pub inset: Dimensions,
    pub coverage: f64,
}

impl Fit {
    /// True when the inset fills the canvas and no backdrop is needed.
    pub fn is_exact(&self) -> bool {
        self.inset == self.canvas
    }
}

/// Coverage of `candidate` by `source`, and the scale that achieves it.
fn coverage_and_scale(source: Dimensions, candidate: CandidateSize) -> (f64, f64) {
    let (sw, sh) = (source.width as f64, source.height as f64);
    let (cw, ch) = (candidate.width as f64, candidate.height as f64);
    let source_aspect = source.aspect();
    let candidate_aspect = candidate.aspect();

    if source_aspect == candidate_aspect {
        (1.0, cw / sw)
    } else if source_aspect < candidate_aspect {
        // Relatively taller: height touches, side bars.
        ((sw / cw) * (ch / sh), ch / sh)
    } else {
        // Relatively wider: width touches, top and bottom bars.
        ((sh / ch) * (cw / sw), cw / sw)
    }
}

/// Fraction of `candidate`'s area covered by `source` scaled to fit inside it.
pub fn coverage(source: Dimensions, candidate: CandidateSize) -> f64 {
    coverage_and_scale(source, candidate).0
}

/// Pick the candidate with the highest coverage for `source`.
///
/// The inset is the source scaled by the winning factor, truncated to whole
/// pixels on both axes.
///
/// # Errors
/// [`ImagingError::PreconditionViolation`] for an empty candidate list or any
/// zero-area size. These are wiring bugs, not "no fit" answers.
pub fn best_fit(source: Dimensions, candidates: &[CandidateSize]) -> Result<Fit, ImagingError> {
    if source.is_empty() {
        return Err(ImagingError::PreconditionViolation(format!(
            "source bounds {source} have zero area"
        )));
    }
    if let Some(bad) = candidates.iter().find(|c| c.is_empty()) {
        return Err(ImagingError::PreconditionViolation(format!(
            "candidate canvas {bad} has zero area"
        )));
    }

    let mut best: Option<(CandidateSize, f64, f64)> = None;
    for &candidate in candidates {
        let (cov, scale) = coverage_and_scale(source, candidate);
        log::trace!("candidate {candidate}: coverage {cov:.4}");
        // Strict comparison: the first candidate keeps a tie.
        if best.is_none_or(|(_, best_cov, _)| cov > best_cov) {
            best = Some((candidate, cov, scale));
        }
    }

    let (canvas, coverage, scale) = best.ok_or_else(|| {
        ImagingError::PreconditionViolation("candidate list is empty".to_string())
    })?;

    let inset = Dimensions::new(
        (source.width as f64 * scale).floor() as u32,
        (source.height as f64 * scale).floor() as u32,
    );

    Ok(Fit {
        canvas,
        inset,
        coverage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXED: &[CandidateSize] = &[
        Dimensions::new(1080, 1080),
        Dimensions::new(1080, 608),
        Dimensions::new(1080, 1350),
    ];

    #[test]
    fn landscape_hd_picks_wide_canvas() {
        let fit = best_fit(Dimensions::new(1920, 1080), MIXED).unwrap();
        assert_eq!(fit.canvas, Dimensions::new(1080, 608));
        assert!((fit.coverage - 1.0).abs() < 0.001);
        // 1080 * 0.5625 = 607.5 → truncated
        assert_eq!(fit.inset, Dimensions::new(1080, 607));
    }

    #[test]
    fn portrait_picks_tall_canvas() {
        let fit = best_fit(Dimensions::new(80, 100), MIXED).unwrap();
        assert_eq!(fit.canvas, Dimensions::new(1080, 1350));
        assert_eq!(fit.coverage, 1.0);
        assert_eq!(fit.inset, Dimensions::new(1080, 1350));
        assert!(fit.is_exact());
    }

    #[test]
    fn very_wide_source_letterboxes() {
        let fit = best_fit(Dimensions::new(80, 8), INSTAGRAM).unwrap();
        assert_eq!(fit.canvas, Dimensions::new(1080, 566));
        assert_eq!(fit.inset, Dimensions::new(1080, 108));
        assert!(!fit.is_exact());
    }

    #[test]
    fn tall_source_pillarboxes() {
        // 1:2 against 1080x1350 → height touches, scale 6.75
        let fit = best_fit(Dimensions::new(100, 200), INSTAGRAM).unwrap();
        assert_eq!(fit.canvas, Dimensions::new(1080, 1350));
        assert_eq!(fit.inset, Dimensions::new(675, 1350));
    }

    #[test]
    fn ties_go_to_first_declared() {
        let twins = [
            Dimensions::new(500, 500),
            Dimensions::new(1000, 1000),
            Dimensions::new(200, 200),
        ];
        let fit = best_fit(Dimensions::new(30, 30), &twins).unwrap();
        assert_eq!(fit.canvas, Dimensions::new(500, 500));
    }

    #[test]
    fn best_fit_is_deterministic() {
        let a = best_fit(Dimensions::new(1234, 987), INSTAGRAM).unwrap();
        let b = best_fit(Dimensions::new(1234, 987), INSTAGRAM).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn chosen_coverage_is_maximal() {
        let sources = [
            Dimensions::new(1920, 1080),
            Dimensions::new(3000, 4000),
            Dimensions::new(640, 640),
            Dimensions::new(5000, 900),
            Dimensions::new(900, 5000),
            Dimensions::new(1081, 1350),
        ];
        for source in sources {
            let fit = best_fit(source, MIXED).unwrap();
            for &c in MIXED {
                assert!(
                    fit.coverage >= coverage(source, c),
                    "{source}: {} beat chosen {}",
                    c,
                    fit.canvas
                );
            }
        }
    }

    #[test]
    fn chosen_canvas_contains_inset() {
        for source in [
            Dimensions::new(1920, 1080),
            Dimensions::new(333, 1000),
            Dimensions::new(1000, 333),
            Dimensions::new(7, 9),
        ] {
            let fit = best_fit(source, INSTAGRAM).unwrap();
            assert!(fit.inset.width <= fit.canvas.width);
            assert!(fit.inset.height <= fit.canvas.height);
            assert!(fit.canvas.area() >= fit.inset.area());
            // Touches the canvas on at least one axis, allowing for truncation.
            let touches = fit.canvas.width - fit.inset.width <= 1
                || fit.canvas.height - fit.inset.height <= 1;
            assert!(touches, "{source} → {:?}", fit);
        }
    }

    #[test]
    fn scale_invariance() {
        for source in [
            Dimensions::new(1920, 1080),
            Dimensions::new(300, 400),
            Dimensions::new(50, 7),
        ] {
            let base = best_fit(source, INSTAGRAM).unwrap();
            for k in [2u32, 3, 10] {
                let scaled = Dimensions::new(source.width * k, source.height * k);
                let fit = best_fit(scaled, INSTAGRAM).unwrap();
                assert_eq!(fit.canvas, base.canvas);
                // The inset is already canvas-relative, so it only moves by truncation.
                assert!(fit.inset.width.abs_diff(base.inset.width) <= 1);
                assert!(fit.inset.height.abs_diff(base.inset.height) <= 1);
            }
        }
    }

    #[test]
    fn empty_candidates_is_precondition_violation() {
        let result = best_fit(Dimensions::new(100, 100), &[]);
        assert!(matches!(result, Err(ImagingError::PreconditionViolation(_))));
    }

    #[test]
    fn zero_area_source_is_precondition_violation() {
        let result = best_fit(Dimensions::new(0, 100), INSTAGRAM);
        assert!(matches!(result, Err(ImagingError::PreconditionViolation(_))));
    }

    #[test]
    fn zero_area_candidate_is_precondition_violation() {
        let result = best_fit(Dimensions::new(10, 10), &[Dimensions::new(10, 0)]);
        assert!(matches!(result, Err(ImagingError::PreconditionViolation(_))));
    }

    #[test]
    fn target_parses_and_names() {
        assert_eq!("instagram".parse::<Target>().unwrap(), Target::Instagram);
        assert_eq!(
            "instagram-story".parse::<Target>().unwrap(),
            Target::InstagramStory
        );
        assert!("myspace".parse::<Target>().is_err());
        assert_eq!(Target::InstagramStory.name(), "instagram-story");
        assert_eq!(Target::default().candidates(), INSTAGRAM);
    }
}
