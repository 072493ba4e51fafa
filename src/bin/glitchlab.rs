use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use glitchlab::{
    AnimSpec, FrameIndex, KeyframeDoc, ProcessOpts, ProgressEvent, parse_effect_list,
    process_frames, resolve_keyframe_intensity,
};

#[derive(Parser, Debug)]
#[command(name = "glitchlab", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Duplicate a frame sequence and bake glitch effects in.
    Process(ProcessArgs),
    /// Print the per-frame intensity curve of a keyframe document.
    Curve(CurveArgs),
}

#[derive(Parser, Debug)]
struct ProcessArgs {
    /// Input directory of numbered frames.
    #[arg(long = "in")]
    in_dir: PathBuf,

    /// Output directory (created if missing).
    #[arg(long)]
    out: PathBuf,

    /// Output frames per input frame.
    #[arg(long, default_value_t = 2)]
    multiplier: u32,

    /// Base effect intensity.
    #[arg(long, default_value_t = 1.0)]
    intensity: f64,

    /// Comma-separated effect kinds (rgb_shift, strips, blocks, scanlines,
    /// color_swap, noise, vhs).
    #[arg(long, default_value = "rgb_shift")]
    effects: String,

    /// Animation spec JSON (pattern + envelope). Defaults to every frame
    /// at constant intensity.
    #[arg(long)]
    anim: Option<PathBuf>,

    /// Seed for a reproducible render.
    #[arg(long)]
    seed: Option<u64>,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Print per-frame progress.
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

#[derive(Parser, Debug)]
struct CurveArgs {
    /// Keyframe document JSON ({keyframes, total_frames, base_intensity}).
    #[arg(long)]
    doc: PathBuf,

    /// Override the frame count to sample.
    #[arg(long)]
    frames: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Process(args) => run_process(args),
        Command::Curve(args) => run_curve(args),
    }
}

fn run_process(args: ProcessArgs) -> anyhow::Result<()> {
    let anim = match &args.anim {
        Some(path) => {
            let s = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            AnimSpec::from_json(&s)?
        }
        None => AnimSpec::default(),
    };
    let effects = parse_effect_list(&args.effects)?;

    let opts = ProcessOpts {
        multiplier: args.multiplier,
        base_intensity: args.intensity,
        effects,
        anim,
        glitch_enabled: true,
        seed: args.seed,
        parallel: args.parallel,
        threads: args.threads,
    };

    let verbose = args.verbose;
    let stats = process_frames(&args.in_dir, &args.out, &opts, |event| match event {
        ProgressEvent::Scanned { inputs, outputs } => {
            eprintln!("scanned {inputs} frames, writing {outputs}");
        }
        ProgressEvent::Frame { index, total, glitched } if verbose => {
            let marker = if *glitched { " (glitch)" } else { "" };
            eprintln!("frame {}/{total}{marker}", index + 1);
        }
        ProgressEvent::Done { written } => {
            eprintln!("wrote {written} frames to {}", args.out.display());
        }
        _ => {}
    })?;

    println!(
        "{} frames written, {} glitched",
        stats.frames_written, stats.frames_glitched
    );
    Ok(())
}

fn run_curve(args: CurveArgs) -> anyhow::Result<()> {
    let s = std::fs::read_to_string(&args.doc)
        .with_context(|| format!("reading {}", args.doc.display()))?;
    let doc = KeyframeDoc::from_json(&s)?;
    let total = args.frames.unwrap_or(doc.total_frames).max(1);

    for frame in 0..total {
        let intensity = resolve_keyframe_intensity(
            FrameIndex(frame),
            total,
            &doc.keyframes,
            doc.base_intensity,
        );
        println!("{frame}\t{intensity:.4}");
    }
    Ok(())
}
