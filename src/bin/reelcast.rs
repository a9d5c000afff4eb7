use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(Parser, Debug)]
#[command(name = "reelcast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the final video (requires `ffmpeg` and `ffprobe` on PATH).
    Render(RenderArgs),
    /// Resolve durations and print the timeline as JSON without rendering.
    Plan(PlanArgs),
    /// Write a copy of an image with rounded, transparent corners.
    Mask(MaskArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Configuration JSON; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Job manifest JSON listing the segments.
    #[arg(long)]
    job: PathBuf,

    /// Background video (overrides the config).
    #[arg(long)]
    background: Option<PathBuf>,

    /// Output path (overrides the config).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Fixed seed for background sampling.
    #[arg(long)]
    seed: Option<u64>,

    /// What to do when the background is shorter than the timeline.
    #[arg(long, value_enum)]
    policy: Option<PolicyChoice>,

    /// Keep the working directory after a successful run.
    #[arg(long)]
    keep_workdir: bool,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    job: PathBuf,
}

#[derive(Parser, Debug)]
struct MaskArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Corner radius in pixels.
    #[arg(long, default_value_t = 12)]
    radius: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyChoice {
    Fail,
    Clamp,
}

impl From<PolicyChoice> for reelcast::ShortSourcePolicy {
    fn from(choice: PolicyChoice) -> Self {
        match choice {
            PolicyChoice::Fail => Self::Fail,
            PolicyChoice::Clamp => Self::Clamp,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelcast=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Mask(args) => cmd_mask(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<reelcast::RenderConfig> {
    match path {
        Some(path) => reelcast::RenderConfig::from_json_file(path)
            .with_context(|| format!("load config '{}'", path.display())),
        None => Ok(reelcast::RenderConfig::default()),
    }
}

fn load_job(path: &Path) -> anyhow::Result<reelcast::JobManifest> {
    reelcast::JobManifest::from_json_file(path)
        .with_context(|| format!("load job manifest '{}'", path.display()))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(background) = args.background {
        config.background_path = Some(background);
    }
    if let Some(out) = args.out {
        config.output_path = out;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(policy) = args.policy {
        config.short_source_policy = policy.into();
    }
    config.keep_workdir |= args.keep_workdir;

    let job = load_job(&args.job)?;
    let report = reelcast::run_pipeline(config, &job.segments)?;

    println!(
        "wrote {} ({:.3}s, {} segments)",
        report.output.path.display(),
        report.output.duration_secs,
        report.timeline.len()
    );
    if !report.dropped.is_empty() {
        println!("dropped: {}", report.dropped.join(", "));
    }
    if let Some(dir) = report.kept_workdir {
        println!("working directory: {}", dir.display());
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct PlanOutput<'a> {
    total_secs: f64,
    segments: &'a [reelcast::Segment],
    dropped: &'a [String],
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let job = load_job(&args.job)?;
    let resolved = reelcast::plan(&config, &job.segments, &reelcast::FfprobeDurations)?;

    let out = PlanOutput {
        total_secs: resolved.timeline.total_secs(),
        segments: resolved.timeline.segments(),
        dropped: &resolved.dropped,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&out).context("serialize plan")?
    );
    Ok(())
}

fn cmd_mask(args: MaskArgs) -> anyhow::Result<()> {
    let mut img = image::open(&args.in_path)
        .with_context(|| format!("open image '{}'", args.in_path.display()))?
        .to_rgba8();
    let (w, h) = img.dimensions();
    let mask = reelcast::rounded_rect_mask(reelcast::Canvas::new(w, h), args.radius);
    reelcast::overlay::mask::apply_mask(&mut img, &mask)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))?;
    }
    img.save(&args.out)
        .with_context(|| format!("write '{}'", args.out.display()))?;
    println!("wrote {} ({w}x{h}, radius {})", args.out.display(), args.radius);
    Ok(())
}
