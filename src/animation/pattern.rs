use crate::{
    animation::keyframes::Keyframe, foundation::core::FrameIndex, foundation::rand::UniformSource,
};

/// Gating rule deciding which output frames receive effects at all.
///
/// Closed set: an unknown `kind` fails deserialization and is reported as a
/// configuration error by the loader, never silently mapped to `Every`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "params", rename_all = "snake_case")]
pub enum Pattern {
    /// Affect every frame.
    Every,
    /// Affect frames whose index is a multiple of `n`.
    EveryN { n: u64 },
    /// Affect each frame independently with probability `chance` in [0, 1].
    Random { chance: f64 },
    /// `on` affected frames, then `off` clean ones, repeating.
    Burst { on: u64, off: u64 },
    /// Every frame is affected; intensity comes from the keyframe resolver
    /// instead of an envelope.
    Keyframes { keyframes: Vec<Keyframe> },
}

impl Pattern {
    /// Whether `frame` is gated on. `Random` draws one sample per call from
    /// the injected source; all other variants are pure.
    pub fn should_affect(&self, frame: FrameIndex, rng: &mut dyn UniformSource) -> bool {
        match self {
            Self::Every | Self::Keyframes { .. } => true,
            Self::EveryN { n } => frame.0 % (*n).max(1) == 0,
            Self::Random { chance } => rng.next_f64() < *chance,
            Self::Burst { on, off } => {
                let cycle = (on + off).max(1);
                frame.0 % cycle < *on
            }
        }
    }
}
