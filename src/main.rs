use clap::{Parser, Subcommand};
use instafit::config::{self, BackgroundOverride, Overrides};
use instafit::imaging::{LanczosScaler, Target};
use instafit::{batch, output, testimages};
use std::path::PathBuf;
use std::process::ExitCode;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

/// Background flags. At most one may be given.
#[derive(clap::Args, Clone, Debug, Default)]
#[group(multiple = false)]
struct BackgroundArgs {
    /// White letterbox
    #[arg(long)]
    white: bool,

    /// Black letterbox
    #[arg(long)]
    black: bool,

    /// Dark gray letterbox (0.125)
    #[arg(long)]
    gray: bool,

    /// Gray letterbox level, 0.0 (black) to 1.0 (white)
    #[arg(long, value_name = "LEVEL")]
    background: Option<f32>,

    /// Blurred copy of the photo as the letterbox
    #[arg(long)]
    blur: bool,
}

impl BackgroundArgs {
    fn to_override(&self) -> Option<BackgroundOverride> {
        if self.white {
            Some(BackgroundOverride::Solid(1.0))
        } else if self.black {
            Some(BackgroundOverride::Solid(0.0))
        } else if self.gray {
            Some(BackgroundOverride::Solid(0.125))
        } else if self.blur {
            Some(BackgroundOverride::Blur)
        } else {
            self.background.map(BackgroundOverride::Solid)
        }
    }
}

#[derive(Parser)]
#[command(name = "instafit")]
#[command(about = "Fit photos onto social media canvases without cropping")]
#[command(long_about = "\
Fit photos onto social media canvases without cropping

Each photo is placed on whichever allowed canvas size it covers best
(Instagram: 1080x1080, 1080x1350, 1080x566). The photo is scaled down to
fit, never cropped and never enlarged; the leftover border is filled with a
solid gray or a blurred copy of the photo.

Results are written next to each input as <name>_insta.jpg. Inputs that
already end in the output suffix are skipped, so re-running over a folder
is safe. Directories are searched recursively for jpg, png, gif, tiff and
webp files.

Settings are read from config.toml (see --config) and overridden by flags.
Run 'instafit gen-config' to generate a documented config.toml.
Set RUST_LOG=debug to see per-file canvas decisions.")]
#[command(version = version_string())]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Config file (missing file means stock defaults)
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(flatten)]
    background: BackgroundArgs,

    /// Blur strength in pixels for --blur
    #[arg(long)]
    sigma: Option<f64>,

    /// JPEG quality, 1-100
    #[arg(long)]
    quality: Option<u32>,

    /// Candidate canvas list: instagram or instagram-story
    #[arg(long)]
    target: Option<Target>,

    /// Max files processed in parallel (default: all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Images or directories to process
    paths: Vec<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print a stock config.toml with all options documented
    GenConfig,
    /// Write checkerboard test images at assorted aspect ratios
    TestImages {
        /// Directory to write into (created if missing)
        dir: PathBuf,
    },
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            target: self.target,
            background: self.background.to_override(),
            sigma: self.sigma,
            quality: self.quality,
            max_processes: self.threads,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match &cli.command {
        Some(Command::GenConfig) => {
            print!("{}", config::stock_config_toml());
            return Ok(ExitCode::SUCCESS);
        }
        Some(Command::TestImages { dir }) => {
            let written = testimages::write_test_images(dir)?;
            output::print_test_images(dir, &written);
            return Ok(ExitCode::SUCCESS);
        }
        None => {}
    }

    if cli.paths.is_empty() {
        return Err("no input paths given (see --help)".into());
    }

    let config = config::load_config(&cli.config, &cli.overrides())?;
    init_thread_pool(&config.processing);

    let inputs = batch::collect_inputs(&cli.paths);
    let options = batch::BatchOptions::from_config(&config);
    let scaler = LanczosScaler::new();

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        let mut finished = 0;
        for event in rx {
            if matches!(event, batch::BatchEvent::FileFinished(_)) {
                finished += 1;
            }
            for line in output::format_batch_event(&event, finished) {
                println!("{}", line);
            }
        }
    });
    let report = batch::run(&scaler, &inputs, &options, Some(tx));
    if printer.join().is_err() {
        log::warn!("progress printer panicked");
    }
    output::print_batch_summary(&report);

    Ok(if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. The user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    log::debug!("using {threads} worker threads");
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
