use crate::{foundation::core::FrameIndex, foundation::rand::UniformSource};

/// Multiplier bounds for the `Random` envelope, relative to base intensity.
const RANDOM_LOW: f64 = 0.3;
const RANDOM_HIGH: f64 = 1.0;

/// Shapes effect intensity across the sequence for frames the pattern has
/// gated on. Not consulted in keyframe mode.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "params", rename_all = "snake_case")]
pub enum Envelope {
    Constant,
    /// Linear ramp from 0 at the first frame to full at the last.
    FadeIn,
    /// Mirror of `FadeIn`.
    FadeOut,
    /// `|sin|` pulse between 0.3x and 1.0x of base, `cycles` humps.
    Pulse { cycles: u64 },
    /// Uniform jitter in [0.3, 1.0] x base, one draw per frame.
    Random,
}

impl Envelope {
    /// Intensity for `frame` of `total_frames` at the given base.
    ///
    /// Progress runs 0..1 across the sequence; a single-frame sequence
    /// pins progress to 0 instead of dividing by zero.
    pub fn evaluate(
        &self,
        frame: FrameIndex,
        total_frames: u64,
        base_intensity: f64,
        rng: &mut dyn UniformSource,
    ) -> f64 {
        let progress = frame.0 as f64 / total_frames.saturating_sub(1).max(1) as f64;
        match self {
            Self::Constant => base_intensity,
            Self::FadeIn => base_intensity * progress,
            Self::FadeOut => base_intensity * (1.0 - progress),
            Self::Pulse { cycles } => {
                let wave = (progress * std::f64::consts::PI * *cycles as f64).sin().abs();
                base_intensity * (0.3 + 0.7 * wave)
            }
            Self::Random => base_intensity * rng.range_f64(RANDOM_LOW, RANDOM_HIGH),
        }
    }
}
