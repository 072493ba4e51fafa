use crate::foundation::error::{GlitchError, GlitchResult};

/// A named effect plus raw JSON parameters, as it appears in configuration
/// files before validation.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct EffectInstance {
    pub kind: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
}

/// Stateless pixel transform. Every variant operates in place on RGBA
/// pixels, scaled by the per-frame intensity the scheduler hands it;
/// variants are independent and order of application is the caller's.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    /// Roll the red and blue channels horizontally by independent random
    /// offsets.
    RgbShift { max_shift: u32 },
    /// Roll random horizontal strips of whole pixels.
    Strips {
        num_strips: u32,
        max_height_pct: f64,
        max_shift_pct: f64,
    },
    /// Stamp random source rectangles over random destinations.
    Blocks {
        num_blocks: u32,
        block_h_pct: f64,
        block_w_pct: f64,
    },
    /// Roll individual random rows.
    Scanlines { num_lines: u32, max_shift: u32 },
    /// Rotate or invert color channels inside a random band.
    ColorSwap { min_height: u32 },
    /// Additive noise on random horizontal bands.
    Noise {
        num_bands: u32,
        max_band_height: u32,
        noise_strength: u32,
    },
    /// Per-row sinusoidal displacement, VHS tracking style.
    Vhs {
        wave_amplitude: u32,
        wave_freq_min: f64,
        wave_freq_max: f64,
    },
}

impl Effect {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RgbShift { .. } => "rgb_shift",
            Self::Strips { .. } => "strips",
            Self::Blocks { .. } => "blocks",
            Self::Scanlines { .. } => "scanlines",
            Self::ColorSwap { .. } => "color_swap",
            Self::Noise { .. } => "noise",
            Self::Vhs { .. } => "vhs",
        }
    }
}

/// Resolve an [`EffectInstance`] into a concrete [`Effect`].
///
/// Missing parameters take their defaults; present parameters must have
/// the right type. An unknown kind is a configuration error so a render
/// halts instead of silently skipping the effect.
pub fn parse_effect(inst: &EffectInstance) -> GlitchResult<Effect> {
    let kind = inst.kind.trim().to_ascii_lowercase();
    if kind.is_empty() {
        return Err(GlitchError::validation("effect kind must be non-empty"));
    }

    let p = &inst.params;
    match kind.as_str() {
        "rgb_shift" => Ok(Effect::RgbShift {
            max_shift: get_u32_or(p, "max_shift", 15)?,
        }),
        "strips" | "h_shift" => Ok(Effect::Strips {
            num_strips: get_u32_or(p, "num_strips", 3)?,
            max_height_pct: get_f64_or(p, "max_height_pct", 0.15)?,
            max_shift_pct: get_f64_or(p, "max_shift_pct", 0.2)?,
        }),
        "blocks" => Ok(Effect::Blocks {
            num_blocks: get_u32_or(p, "num_blocks", 2)?,
            block_h_pct: get_f64_or(p, "block_h_pct", 0.1)?,
            block_w_pct: get_f64_or(p, "block_w_pct", 0.3)?,
        }),
        "scanlines" => Ok(Effect::Scanlines {
            num_lines: get_u32_or(p, "num_lines", 10)?,
            max_shift: get_u32_or(p, "max_shift", 30)?,
        }),
        "color_swap" => Ok(Effect::ColorSwap {
            min_height: get_u32_or(p, "min_height", 50)?,
        }),
        "noise" => Ok(Effect::Noise {
            num_bands: get_u32_or(p, "num_bands", 3)?,
            max_band_height: get_u32_or(p, "max_band_height", 10)?,
            noise_strength: get_u32_or(p, "noise_strength", 50)?,
        }),
        "vhs" => Ok(Effect::Vhs {
            wave_amplitude: get_u32_or(p, "wave_amplitude", 10)?,
            wave_freq_min: get_f64_or(p, "wave_freq_min", 0.01)?,
            wave_freq_max: get_f64_or(p, "wave_freq_max", 0.05)?,
        }),
        _ => Err(GlitchError::config(format!("unknown effect kind '{kind}'"))),
    }
}

/// Parse a comma-separated effect list (CLI surface), all defaults.
pub fn parse_effect_list(list: &str) -> GlitchResult<Vec<Effect>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|kind| {
            parse_effect(&EffectInstance {
                kind: kind.to_string(),
                params: serde_json::Value::Null,
            })
        })
        .collect()
}

fn get_u32_or(obj: &serde_json::Value, key: &str, default: u32) -> GlitchResult<u32> {
    let Some(v) = obj.get(key) else {
        return Ok(default);
    };
    let Some(n) = v.as_u64() else {
        return Err(GlitchError::validation(format!(
            "effect param '{key}' must be a non-negative integer"
        )));
    };
    u32::try_from(n)
        .map_err(|_| GlitchError::validation(format!("effect param '{key}' is out of range")))
}

fn get_f64_or(obj: &serde_json::Value, key: &str, default: f64) -> GlitchResult<f64> {
    let Some(v) = obj.get(key) else {
        return Ok(default);
    };
    let Some(n) = v.as_f64() else {
        return Err(GlitchError::validation(format!(
            "effect param '{key}' must be a number"
        )));
    };
    if !n.is_finite() {
        return Err(GlitchError::validation(format!(
            "effect param '{key}' must be finite"
        )));
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inst(kind: &str, params: serde_json::Value) -> EffectInstance {
        EffectInstance {
            kind: kind.to_string(),
            params,
        }
    }

    #[test]
    fn defaults_fill_missing_params() {
        let e = parse_effect(&inst("rgb_shift", serde_json::Value::Null)).unwrap();
        assert_eq!(e, Effect::RgbShift { max_shift: 15 });
    }

    #[test]
    fn explicit_params_override_defaults() {
        let e = parse_effect(&inst("scanlines", serde_json::json!({"num_lines": 4}))).unwrap();
        assert_eq!(
            e,
            Effect::Scanlines {
                num_lines: 4,
                max_shift: 30
            }
        );
    }

    #[test]
    fn legacy_h_shift_alias_resolves_to_strips() {
        let e = parse_effect(&inst("h_shift", serde_json::Value::Null)).unwrap();
        assert_eq!(e.kind(), "strips");
    }

    #[test]
    fn unknown_kind_is_a_config_error() {
        let err = parse_effect(&inst("datamosh", serde_json::Value::Null)).unwrap_err();
        assert!(matches!(err, GlitchError::Config(_)));
    }

    #[test]
    fn wrong_param_type_is_rejected() {
        let err = parse_effect(&inst("noise", serde_json::json!({"num_bands": "three"})));
        assert!(err.is_err());
    }

    #[test]
    fn effect_list_parses_in_order() {
        let fx = parse_effect_list("rgb_shift, scanlines,vhs").unwrap();
        let kinds: Vec<&str> = fx.iter().map(Effect::kind).collect();
        assert_eq!(kinds, vec!["rgb_shift", "scanlines", "vhs"]);
    }
}
