use crate::{
    animation::ease::Ease,
    foundation::core::FrameIndex,
    foundation::error::{GlitchError, GlitchResult},
};

/// One (frame, intensity) anchor on the timeline. `interpolation` shapes
/// the segment from this key to the next; the next key's kind is ignored.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe {
    pub frame: FrameIndex,
    pub intensity: f64,
    pub interpolation: Ease,
}

/// Intensity at `frame` for a sparse keyframe set.
///
/// The slice may arrive unsorted; it is stable-sorted by frame on entry and
/// never mutated. Queries before the first key or after the last clamp to
/// that key's intensity. When several keys share a frame, the stable sort
/// preserves input order and the first bracketing pair wins; document
/// import dedupes such keys before they get here (see [`KeyframeDoc`]).
///
/// An empty set yields `base_intensity` unchanged.
pub fn resolve_keyframe_intensity(
    frame: FrameIndex,
    _total_frames: u64,
    keyframes: &[Keyframe],
    base_intensity: f64,
) -> f64 {
    if keyframes.is_empty() {
        return base_intensity;
    }

    let mut sorted: Vec<Keyframe> = keyframes.to_vec();
    sorted.sort_by_key(|k| k.frame);

    let f = frame.0;
    if f <= sorted[0].frame.0 {
        return sorted[0].intensity;
    }
    if f >= sorted[sorted.len() - 1].frame.0 {
        return sorted[sorted.len() - 1].intensity;
    }

    // First key with frame >= f starts the pair search, so when several
    // keys share a frame the first bracketing pair wins.
    let idx = sorted.partition_point(|k| k.frame.0 < f);
    // Both ends exist: the boundary clamps above rule out idx == 0 and
    // idx == len.
    let a = &sorted[idx - 1];
    let b = &sorted[idx];
    let denom = b.frame.0.saturating_sub(a.frame.0);
    if denom == 0 {
        return a.intensity;
    }

    let t = (f - a.frame.0) as f64 / denom as f64;
    a.interpolation.interpolate(t, a.intensity, b.intensity)
}

/// Keyframe interchange document, as exchanged with external editors.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KeyframeDoc {
    pub keyframes: Vec<Keyframe>,
    pub total_frames: u64,
    pub base_intensity: f64,
}

impl KeyframeDoc {
    /// Parse and repair a document. Malformed keyframe data is recovered,
    /// never fatal; only unparseable JSON errors.
    pub fn from_json(s: &str) -> GlitchResult<Self> {
        let mut doc: Self = serde_json::from_str(s)
            .map_err(|e| GlitchError::serde(format!("keyframe document: {e}")))?;
        doc.sanitize();
        Ok(doc)
    }

    pub fn to_json(&self) -> GlitchResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GlitchError::serde(format!("keyframe document: {e}")))
    }

    /// Repair imported data in place:
    ///
    /// - keys with `frame >= total_frames` are dropped,
    /// - keys sharing a frame collapse to the last-defined one,
    /// - survivors are sorted by frame,
    /// - an emptied set gets a synthetic linear key at frame 0 carrying the
    ///   document's base intensity, so at least one key always remains.
    pub fn sanitize(&mut self) {
        let before = self.keyframes.len();
        self.keyframes.retain(|k| k.frame.0 < self.total_frames);
        let dropped = before - self.keyframes.len();
        if dropped > 0 {
            tracing::warn!(
                dropped,
                total_frames = self.total_frames,
                "dropped out-of-range keyframes on import"
            );
        }

        self.keyframes.sort_by_key(|k| k.frame);
        let mut deduped: Vec<Keyframe> = Vec::with_capacity(self.keyframes.len());
        for k in self.keyframes.drain(..) {
            match deduped.last_mut() {
                Some(last) if last.frame == k.frame => {
                    tracing::warn!(frame = k.frame.0, "duplicate keyframe, keeping last");
                    *last = k;
                }
                _ => deduped.push(k),
            }
        }
        self.keyframes = deduped;

        if self.keyframes.is_empty() {
            self.keyframes.push(Keyframe {
                frame: FrameIndex(0),
                intensity: self.base_intensity,
                interpolation: Ease::Linear,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kf(frame: u64, intensity: f64, interpolation: Ease) -> Keyframe {
        Keyframe {
            frame: FrameIndex(frame),
            intensity,
            interpolation,
        }
    }

    #[test]
    fn empty_set_returns_base() {
        assert_eq!(resolve_keyframe_intensity(FrameIndex(4), 20, &[], 0.7), 0.7);
    }

    #[test]
    fn linear_pair_clamps_and_interpolates() {
        let keys = [kf(0, 1.0, Ease::Linear), kf(10, 5.0, Ease::Linear)];
        assert_eq!(resolve_keyframe_intensity(FrameIndex(0), 20, &keys, 9.0), 1.0);
        assert_eq!(resolve_keyframe_intensity(FrameIndex(10), 20, &keys, 9.0), 5.0);
        assert_eq!(resolve_keyframe_intensity(FrameIndex(5), 20, &keys, 9.0), 3.0);
        // Past the last key clamps to it.
        assert_eq!(resolve_keyframe_intensity(FrameIndex(15), 20, &keys, 9.0), 5.0);
    }

    #[test]
    fn unsorted_input_is_sorted_defensively() {
        let keys = [kf(10, 5.0, Ease::Linear), kf(0, 1.0, Ease::Linear)];
        assert_eq!(resolve_keyframe_intensity(FrameIndex(5), 20, &keys, 9.0), 3.0);
    }

    #[test]
    fn step_holds_until_exact_boundary() {
        let keys = [kf(0, 1.0, Ease::Step), kf(10, 5.0, Ease::Step)];
        assert_eq!(resolve_keyframe_intensity(FrameIndex(9), 20, &keys, 9.0), 1.0);
        assert_eq!(resolve_keyframe_intensity(FrameIndex(10), 20, &keys, 9.0), 5.0);
    }

    #[test]
    fn starting_key_governs_the_segment() {
        let keys = [kf(0, 0.0, Ease::EaseIn), kf(10, 10.0, Ease::Step)];
        // Ease-in from the *starting* key: t=0.5 -> 0.25 of the span.
        assert_eq!(resolve_keyframe_intensity(FrameIndex(5), 20, &keys, 9.0), 2.5);
    }

    #[test]
    fn duplicate_frames_bracket_with_the_first_pair() {
        let keys = [
            kf(0, 1.0, Ease::Linear),
            kf(5, 2.0, Ease::Linear),
            kf(5, 4.0, Ease::Linear),
            kf(10, 8.0, Ease::Linear),
        ];
        // On the duplicate frame itself, the segment ending at the first
        // duplicate wins: (0,1.0)..(5,2.0) at t=1.
        assert_eq!(resolve_keyframe_intensity(FrameIndex(5), 20, &keys, 9.0), 2.0);
        // Past the duplicate run, the segment starts at its last key:
        // (5,4.0)..(10,8.0) at t=0.2.
        let past = resolve_keyframe_intensity(FrameIndex(6), 20, &keys, 9.0);
        assert!((past - 4.8).abs() < 1e-12);
    }

    #[test]
    fn sanitize_filters_dedupes_and_sorts() {
        let mut doc = KeyframeDoc {
            keyframes: vec![
                kf(30, 1.0, Ease::Linear), // out of range
                kf(10, 2.0, Ease::Linear),
                kf(10, 3.0, Ease::Step), // duplicate, last wins
                kf(0, 0.5, Ease::Linear),
            ],
            total_frames: 20,
            base_intensity: 1.0,
        };
        doc.sanitize();
        assert_eq!(
            doc.keyframes,
            vec![kf(0, 0.5, Ease::Linear), kf(10, 3.0, Ease::Step)]
        );
    }

    #[test]
    fn sanitize_inserts_synthetic_key_when_emptied() {
        let mut doc = KeyframeDoc {
            keyframes: vec![kf(99, 1.0, Ease::Linear)],
            total_frames: 20,
            base_intensity: 0.8,
        };
        doc.sanitize();
        assert_eq!(doc.keyframes, vec![kf(0, 0.8, Ease::Linear)]);
    }
}
