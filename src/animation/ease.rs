/// Interpolation kind carried by a keyframe, applied toward the next key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ease {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    Step,
}

impl Ease {
    pub const ALL: [Ease; 5] = [
        Ease::Linear,
        Ease::EaseIn,
        Ease::EaseOut,
        Ease::EaseInOut,
        Ease::Step,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseIn => "ease_in",
            Self::EaseOut => "ease_out",
            Self::EaseInOut => "ease_in_out",
            Self::Step => "step",
        }
    }

    /// Parse a kind name. Unknown names degrade to `Linear` rather than
    /// erroring; interpolation is the one config surface where a permissive
    /// fallback is intended (a curve still renders, just without easing).
    pub fn from_name(name: &str) -> Self {
        match name {
            "linear" => Self::Linear,
            "ease_in" => Self::EaseIn,
            "ease_out" => Self::EaseOut,
            "ease_in_out" => Self::EaseInOut,
            "step" => Self::Step,
            _ => Self::Linear,
        }
    }

    /// Eased fraction for `t` clamped to `[0, 1]`. Not meaningful for
    /// `Step`, which is evaluated on the unclamped `t` in [`interpolate`].
    ///
    /// [`interpolate`]: Ease::interpolate
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::Step => {
                if t >= 1.0 { 1.0 } else { 0.0 }
            }
        }
    }

    /// Interpolate between `start` and `end` at progress `t`.
    ///
    /// `Step` holds `start` until `t >= 1.0`, tested on the raw `t` so a
    /// query past the segment end still flips; all other kinds clamp `t`
    /// into `[0, 1]` first.
    pub fn interpolate(self, t: f64, start: f64, end: f64) -> f64 {
        if let Self::Step = self {
            return if t >= 1.0 { end } else { start };
        }
        start + (end - start) * self.apply(t)
    }
}

impl serde::Serialize for Ease {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> serde::Deserialize<'de> for Ease {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}
