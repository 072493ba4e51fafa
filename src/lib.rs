//! glitchlab turns a directory of numbered frame images into a longer,
//! glitched sequence.
//!
//! The interesting part is the animation scheduler: for every output frame
//! index it decides whether an effect fires and at what strength, from a
//! declarative [`Pattern`] (which frames) and [`Envelope`] (how strong), or
//! from explicit [`Keyframe`]s with per-segment easing. Pixel effects are
//! stateless in-place transforms dispatched by name; the scheduler knows
//! nothing about them.
//!
//! # Pipeline overview
//!
//! 1. **Scan**: collect `prefix0000.ext` frames from the input directory
//! 2. **Schedule**: `Pattern + Envelope + FrameIndex -> (active, intensity)`
//! 3. **Apply**: run the enabled [`Effect`]s on the decoded pixels
//! 4. **Write**: renumbered frames land in the output directory
//!
//! Everything is deterministic for a given seed: randomness flows through an
//! injected [`UniformSource`], never an ambient global generator.
#![forbid(unsafe_code)]

mod animation;
mod effects;
mod foundation;
mod pipeline;

pub use animation::ease::Ease;
pub use animation::envelope::Envelope;
pub use animation::keyframes::{Keyframe, KeyframeDoc, resolve_keyframe_intensity};
pub use animation::pattern::Pattern;
pub use animation::schedule::{
    AnimSpec, MIN_ACTIVE_INTENSITY, ScheduleQuery, ScheduleResult, schedule,
};
pub use effects::fx::{Effect, EffectInstance, parse_effect, parse_effect_list};
pub use effects::pixel::apply_effects;
pub use foundation::core::FrameIndex;
pub use foundation::error::{GlitchError, GlitchResult};
pub use foundation::rand::{Rng64, UniformSource};
pub use pipeline::frames::{FrameName, SourceFrame, scan_frames};
pub use pipeline::process::{ProcessOpts, ProcessStats, ProgressEvent, process_frames};
