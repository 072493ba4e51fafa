use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::{
    animation::schedule::{AnimSpec, ScheduleQuery, ScheduleResult, schedule},
    effects::fx::Effect,
    effects::pixel::apply_effects,
    foundation::core::FrameIndex,
    foundation::error::{GlitchError, GlitchResult},
    foundation::rand::Rng64,
    pipeline::frames::scan_frames,
};

/// Configuration for one full-sequence render.
#[derive(Clone, Debug)]
pub struct ProcessOpts {
    /// How many output frames each input frame expands into.
    pub multiplier: u32,
    /// Nominal effect strength the envelope scales from.
    pub base_intensity: f64,
    /// Effects applied, in order, to frames the scheduler gates on.
    pub effects: Vec<Effect>,
    /// Pattern + envelope driving the scheduler.
    pub anim: AnimSpec,
    /// Master switch; when off the pipeline only duplicates frames.
    pub glitch_enabled: bool,
    /// Fixed seed for a reproducible render; `None` seeds from the clock.
    pub seed: Option<u64>,
    /// Fan pixel work out over a rayon pool. Schedule decisions are drawn
    /// sequentially either way, so both modes glitch the same frames.
    pub parallel: bool,
    /// Worker thread override (parallel mode only).
    pub threads: Option<usize>,
}

impl Default for ProcessOpts {
    fn default() -> Self {
        Self {
            multiplier: 2,
            base_intensity: 1.0,
            effects: Vec::new(),
            anim: AnimSpec::default(),
            glitch_enabled: true,
            seed: None,
            parallel: false,
            threads: None,
        }
    }
}

/// Progress reported to the caller during a render.
#[derive(Clone, Debug)]
pub enum ProgressEvent {
    Scanned { inputs: u64, outputs: u64 },
    /// Emitted per output frame in serial mode, in index order.
    Frame { index: u64, total: u64, glitched: bool },
    Done { written: u64 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcessStats {
    pub frames_written: u64,
    pub frames_glitched: u64,
}

struct FrameJob {
    index: u64,
    src: PathBuf,
    dest: PathBuf,
    decision: ScheduleResult,
}

/// Expand the frames in `input_dir` by the multiplier and write them,
/// glitched where the scheduler says so, into `output_dir`.
///
/// Output frames are renumbered from 0 with the first input frame's
/// prefix and padding. When duplicating (multiplier > 1), the first copy
/// of every input frame stays clean so the source footage remains legible
/// through the glitches; with multiplier 1 every frame is fair game.
pub fn process_frames(
    input_dir: &Path,
    output_dir: &Path,
    opts: &ProcessOpts,
    mut progress: impl FnMut(&ProgressEvent),
) -> GlitchResult<ProcessStats> {
    if opts.multiplier == 0 {
        return Err(GlitchError::validation("multiplier must be >= 1"));
    }
    if !opts.base_intensity.is_finite() || opts.base_intensity < 0.0 {
        return Err(GlitchError::validation(
            "base intensity must be finite and >= 0",
        ));
    }

    let frames = scan_frames(input_dir)?;
    std::fs::create_dir_all(output_dir)
        .map_err(|e| GlitchError::pipeline(format!("cannot create {}: {e}", output_dir.display())))?;

    let total_output = frames.len() as u64 * opts.multiplier as u64;
    let naming = frames[0].name.clone();
    let seed = opts.seed.unwrap_or_else(|| Rng64::from_entropy().next_u64());
    tracing::info!(
        inputs = frames.len(),
        outputs = total_output,
        seed,
        "starting frame render"
    );
    progress(&ProgressEvent::Scanned {
        inputs: frames.len() as u64,
        outputs: total_output,
    });

    // Schedule decisions are drawn up front, in index order, from one
    // master stream. Serial and parallel renders therefore agree on which
    // frames glitch and how hard.
    let mut master = Rng64::new(seed);
    let effects_on = opts.glitch_enabled && !opts.effects.is_empty();
    let mut jobs = Vec::with_capacity(total_output as usize);
    let mut index = 0u64;
    for frame in &frames {
        for j in 0..opts.multiplier {
            let can_glitch = effects_on && (j > 0 || opts.multiplier == 1);
            let decision = if can_glitch {
                schedule(
                    ScheduleQuery {
                        frame: FrameIndex(index),
                        total_frames: total_output,
                        base_intensity: opts.base_intensity,
                    },
                    &opts.anim.pattern,
                    &opts.anim.envelope,
                    &mut master,
                )
            } else {
                ScheduleResult {
                    active: false,
                    intensity: 0.0,
                }
            };
            // Prefix and padding come from the first frame; the extension
            // follows each source file so its codec is kept.
            let name = naming.renumber(index, &frame.name.ext);
            jobs.push(FrameJob {
                index,
                src: frame.path.clone(),
                dest: output_dir.join(name),
                decision,
            });
            index += 1;
        }
    }

    let glitched = jobs.iter().filter(|j| is_glitch_job(j)).count() as u64;

    if opts.parallel {
        run_parallel(&jobs, opts, seed)?;
    } else {
        for job in &jobs {
            run_job(job, &opts.effects, seed)?;
            progress(&ProgressEvent::Frame {
                index: job.index,
                total: total_output,
                glitched: is_glitch_job(job),
            });
        }
    }

    progress(&ProgressEvent::Done {
        written: total_output,
    });
    tracing::info!(written = total_output, glitched, "render complete");
    Ok(ProcessStats {
        frames_written: total_output,
        frames_glitched: glitched,
    })
}

fn is_glitch_job(job: &FrameJob) -> bool {
    job.decision.active && job.decision.intensity > 0.0
}

fn run_parallel(jobs: &[FrameJob], opts: &ProcessOpts, seed: u64) -> GlitchResult<()> {
    let run = || {
        jobs.par_iter()
            .try_for_each(|job| run_job(job, &opts.effects, seed))
    };
    match opts.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| GlitchError::pipeline(format!("cannot build thread pool: {e}")))?;
            pool.install(run)
        }
        None => run(),
    }
}

fn run_job(job: &FrameJob, effects: &[Effect], seed: u64) -> GlitchResult<()> {
    if !is_glitch_job(job) {
        std::fs::copy(&job.src, &job.dest).map_err(|e| {
            GlitchError::pipeline(format!("cannot copy to {}: {e}", job.dest.display()))
        })?;
        return Ok(());
    }

    let img = image::open(&job.src)
        .map_err(|e| GlitchError::pipeline(format!("cannot decode {}: {e}", job.src.display())))?;
    let mut img = img.to_rgba8();

    // Pixel randomness comes from a stream derived per output frame, so a
    // frame's look depends only on (seed, index), not on worker order.
    let mut rng = Rng64::derive(seed, job.index);
    apply_effects(&mut img, effects, job.decision.intensity, &mut rng);

    tracing::debug!(index = job.index, intensity = job.decision.intensity, "glitched frame");
    save_rgba(&img, &job.dest)
}

fn save_rgba(img: &image::RgbaImage, dest: &Path) -> GlitchResult<()> {
    let jpeg_like = dest
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));
    if jpeg_like {
        // JPEG has no alpha channel.
        let rgb = image::DynamicImage::ImageRgba8(img.clone()).to_rgb8();
        rgb.save(dest)
            .map_err(|e| GlitchError::pipeline(format!("cannot write {}: {e}", dest.display())))
    } else {
        img.save(dest)
            .map_err(|e| GlitchError::pipeline(format!("cannot write {}: {e}", dest.display())))
    }
}
