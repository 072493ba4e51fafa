use crate::{
    animation::envelope::Envelope,
    animation::keyframes::resolve_keyframe_intensity,
    animation::pattern::Pattern,
    foundation::core::FrameIndex,
    foundation::error::{GlitchError, GlitchResult},
    foundation::rand::UniformSource,
};

/// No active frame ever fires below this intensity. Keeps effects out of
/// the imperceptible range where they only burn CPU.
pub const MIN_ACTIVE_INTENSITY: f64 = 0.1;

/// Per-frame input to the scheduler. Value-typed; the scheduler holds no
/// state between calls.
#[derive(Clone, Copy, Debug)]
pub struct ScheduleQuery {
    pub frame: FrameIndex,
    pub total_frames: u64,
    pub base_intensity: f64,
}

/// One scheduling decision. `intensity` is exactly 0 when inactive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduleResult {
    pub active: bool,
    pub intensity: f64,
}

impl ScheduleResult {
    fn inactive() -> Self {
        Self {
            active: false,
            intensity: 0.0,
        }
    }
}

/// Decide whether `query.frame` is affected and at what strength.
///
/// Keyframe patterns bypass the envelope entirely: the resolver supplies
/// the intensity, floored at [`MIN_ACTIVE_INTENSITY`]. An *empty* keyframe
/// list returns the base intensity without the floor. Long-standing
/// behavior that external tooling relies on, so it stays.
///
/// For all other patterns the envelope runs only when the pattern gated
/// the frame on, and the floor applies to every active result.
pub fn schedule(
    query: ScheduleQuery,
    pattern: &Pattern,
    envelope: &Envelope,
    rng: &mut dyn UniformSource,
) -> ScheduleResult {
    if let Pattern::Keyframes { keyframes } = pattern {
        let intensity = if keyframes.is_empty() {
            query.base_intensity
        } else {
            let resolved = resolve_keyframe_intensity(
                query.frame,
                query.total_frames,
                keyframes,
                query.base_intensity,
            );
            resolved.max(MIN_ACTIVE_INTENSITY)
        };
        return ScheduleResult {
            active: true,
            intensity,
        };
    }

    if !pattern.should_affect(query.frame, rng) {
        return ScheduleResult::inactive();
    }

    let raw = envelope.evaluate(query.frame, query.total_frames, query.base_intensity, rng);
    ScheduleResult {
        active: true,
        intensity: raw.max(MIN_ACTIVE_INTENSITY),
    }
}

/// Animation configuration as loaded from disk: which frames fire and how
/// strongly.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnimSpec {
    pub pattern: Pattern,
    pub envelope: Envelope,
}

impl Default for AnimSpec {
    fn default() -> Self {
        Self {
            pattern: Pattern::Every,
            envelope: Envelope::Constant,
        }
    }
}

impl AnimSpec {
    /// Parse an animation spec. Unknown pattern or envelope kinds are
    /// configuration errors; a render must halt on them rather than fall
    /// back to always-on/constant and quietly change the output.
    pub fn from_json(s: &str) -> GlitchResult<Self> {
        serde_json::from_str(s).map_err(|e| GlitchError::config(format!("animation spec: {e}")))
    }

    pub fn to_json(&self) -> GlitchResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GlitchError::serde(format!("animation spec: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{animation::ease::Ease, animation::keyframes::Keyframe, foundation::rand::Rng64};

    fn query(frame: u64, total: u64, base: f64) -> ScheduleQuery {
        ScheduleQuery {
            frame: FrameIndex(frame),
            total_frames: total,
            base_intensity: base,
        }
    }

    #[test]
    fn every_constant_passes_base_through() {
        let mut rng = Rng64::new(0);
        let r = schedule(query(3, 10, 0.8), &Pattern::Every, &Envelope::Constant, &mut rng);
        assert_eq!(r, ScheduleResult { active: true, intensity: 0.8 });
    }

    #[test]
    fn active_intensity_is_floored() {
        let mut rng = Rng64::new(0);
        let r = schedule(query(0, 10, 0.05), &Pattern::Every, &Envelope::Constant, &mut rng);
        assert_eq!(r.intensity, MIN_ACTIVE_INTENSITY);

        // FadeIn at frame 0 evaluates to 0 pre-floor.
        let r = schedule(query(0, 10, 2.0), &Pattern::Every, &Envelope::FadeIn, &mut rng);
        assert_eq!(r, ScheduleResult { active: true, intensity: MIN_ACTIVE_INTENSITY });
    }

    #[test]
    fn inactive_frames_report_zero_and_skip_the_envelope() {
        struct Panicking;
        impl crate::foundation::rand::UniformSource for Panicking {
            fn next_f64(&mut self) -> f64 {
                panic!("envelope must not draw for inactive frames");
            }
        }
        let mut rng = Panicking;
        let r = schedule(
            query(1, 10, 0.8),
            &Pattern::EveryN { n: 2 },
            &Envelope::Random,
            &mut rng,
        );
        assert_eq!(r, ScheduleResult { active: false, intensity: 0.0 });
    }

    #[test]
    fn keyframe_mode_floors_resolved_intensity() {
        let mut rng = Rng64::new(0);
        let pattern = Pattern::Keyframes {
            keyframes: vec![
                Keyframe {
                    frame: FrameIndex(0),
                    intensity: 0.0,
                    interpolation: Ease::Linear,
                },
                Keyframe {
                    frame: FrameIndex(10),
                    intensity: 4.0,
                    interpolation: Ease::Linear,
                },
            ],
        };
        let r = schedule(query(0, 20, 1.0), &pattern, &Envelope::Constant, &mut rng);
        assert_eq!(r, ScheduleResult { active: true, intensity: MIN_ACTIVE_INTENSITY });
        let r = schedule(query(5, 20, 1.0), &pattern, &Envelope::Constant, &mut rng);
        assert_eq!(r, ScheduleResult { active: true, intensity: 2.0 });
    }

    #[test]
    fn empty_keyframe_list_returns_unfloored_base() {
        let mut rng = Rng64::new(0);
        let pattern = Pattern::Keyframes { keyframes: vec![] };
        let r = schedule(query(0, 20, 0.02), &pattern, &Envelope::Constant, &mut rng);
        assert_eq!(r, ScheduleResult { active: true, intensity: 0.02 });
    }

    #[test]
    fn same_inputs_same_result_for_non_random_modes() {
        let mut rng = Rng64::new(0);
        let q = query(7, 32, 1.5);
        let a = schedule(q, &Pattern::Burst { on: 2, off: 3 }, &Envelope::Pulse { cycles: 3 }, &mut rng);
        let b = schedule(q, &Pattern::Burst { on: 2, off: 3 }, &Envelope::Pulse { cycles: 3 }, &mut rng);
        assert_eq!(a, b);
    }

    #[test]
    fn spec_defaults_to_every_constant() {
        let spec = AnimSpec::default();
        assert_eq!(spec.pattern, Pattern::Every);
        assert_eq!(spec.envelope, Envelope::Constant);
    }

    #[test]
    fn unknown_pattern_kind_is_a_config_error() {
        let err = AnimSpec::from_json(
            r#"{"pattern":{"kind":"strobe"},"envelope":{"kind":"constant"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, crate::foundation::error::GlitchError::Config(_)));
    }
}
