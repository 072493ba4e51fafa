use image::RgbaImage;

use crate::{effects::fx::Effect, foundation::rand::UniformSource};

/// Apply the enabled effects in order, in place, at one frame's intensity.
///
/// Whole-pixel moves (strips, blocks, scanlines, vhs) carry alpha along
/// with color; channel effects (rgb_shift, color_swap, noise) leave alpha
/// untouched.
pub fn apply_effects(
    img: &mut RgbaImage,
    effects: &[Effect],
    intensity: f64,
    rng: &mut dyn UniformSource,
) {
    if intensity <= 0.0 {
        return;
    }
    for effect in effects {
        apply_one(img, *effect, intensity, rng);
    }
}

fn apply_one(img: &mut RgbaImage, effect: Effect, intensity: f64, rng: &mut dyn UniformSource) {
    match effect {
        Effect::RgbShift { max_shift } => rgb_shift(img, max_shift, intensity, rng),
        Effect::Strips {
            num_strips,
            max_height_pct,
            max_shift_pct,
        } => strips(img, num_strips, max_height_pct, max_shift_pct, intensity, rng),
        Effect::Blocks {
            num_blocks,
            block_h_pct,
            block_w_pct,
        } => blocks(img, num_blocks, block_h_pct, block_w_pct, intensity, rng),
        Effect::Scanlines {
            num_lines,
            max_shift,
        } => scanlines(img, num_lines, max_shift, intensity, rng),
        Effect::ColorSwap { min_height } => color_swap(img, min_height, intensity, rng),
        Effect::Noise {
            num_bands,
            max_band_height,
            noise_strength,
        } => noise(img, num_bands, max_band_height, noise_strength, intensity, rng),
        Effect::Vhs {
            wave_amplitude,
            wave_freq_min,
            wave_freq_max,
        } => vhs(img, wave_amplitude, wave_freq_min, wave_freq_max, intensity, rng),
    }
}

fn rgb_shift(img: &mut RgbaImage, max_shift: u32, intensity: f64, rng: &mut dyn UniformSource) {
    let m = (max_shift as f64 * intensity) as i64;
    let shift_r = rng.range_i64(-m, m);
    let shift_b = rng.range_i64(-m, m);
    roll_channel(img, 0, shift_r);
    roll_channel(img, 2, shift_b);
}

fn strips(
    img: &mut RgbaImage,
    num_strips: u32,
    max_height_pct: f64,
    max_shift_pct: f64,
    intensity: f64,
    rng: &mut dyn UniformSource,
) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    if h == 0 || w == 0 {
        return;
    }
    let count = (num_strips as f64 * intensity) as i64;
    for _ in 0..count {
        let y_start = rng.range_i64(0, h - 1);
        let max_h = ((h as f64 * max_height_pct * intensity) as i64).max(6);
        let strip_h = rng.range_i64(5, max_h);
        let y_end = (y_start + strip_h).min(h);
        let max_s = (w as f64 * max_shift_pct * intensity) as i64;
        let shift = rng.range_i64(-max_s, max_s);
        for y in y_start..y_end {
            roll_row(img, y as u32, shift);
        }
    }
}

fn blocks(
    img: &mut RgbaImage,
    num_blocks: u32,
    block_h_pct: f64,
    block_w_pct: f64,
    intensity: f64,
    rng: &mut dyn UniformSource,
) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    let count = (num_blocks as f64 * intensity) as i64;
    for _ in 0..count {
        let block_h = rng
            .range_i64(10, ((h as f64 * block_h_pct * intensity) as i64).max(11))
            .min(h);
        let block_w = rng
            .range_i64(20, ((w as f64 * block_w_pct * intensity) as i64).max(21))
            .min(w);
        if block_h == 0 || block_w == 0 {
            continue;
        }
        let src_y = rng.range_i64(0, h - block_h);
        let src_x = rng.range_i64(0, w - block_w);
        let dst_y = rng.range_i64(0, h - block_h);
        let dst_x = rng.range_i64(0, w - block_w);

        // Stage the source rectangle first; source and destination may
        // overlap.
        let mut block = Vec::with_capacity((block_h * block_w) as usize);
        for by in 0..block_h {
            for bx in 0..block_w {
                block.push(*img.get_pixel((src_x + bx) as u32, (src_y + by) as u32));
            }
        }
        let mut it = block.into_iter();
        for by in 0..block_h {
            for bx in 0..block_w {
                if let Some(px) = it.next() {
                    img.put_pixel((dst_x + bx) as u32, (dst_y + by) as u32, px);
                }
            }
        }
    }
}

fn scanlines(
    img: &mut RgbaImage,
    num_lines: u32,
    max_shift: u32,
    intensity: f64,
    rng: &mut dyn UniformSource,
) {
    let h = img.height() as i64;
    if h == 0 {
        return;
    }
    let count = (num_lines as f64 * intensity) as i64;
    for _ in 0..count {
        let y = rng.range_i64(0, h - 1);
        let shift = rng.range_i64(-(max_shift as i64), max_shift as i64);
        roll_row(img, y as u32, shift);
    }
}

fn color_swap(img: &mut RgbaImage, min_height: u32, _intensity: f64, rng: &mut dyn UniformSource) {
    let h = img.height() as i64;
    if h < 2 {
        return;
    }
    let y_start = rng.range_i64(0, h / 2);
    let y_end = rng.range_i64((y_start + min_height as i64).min(h), h);
    if y_end <= y_start {
        return;
    }

    let variant = rng.range_i64(0, 2);
    let invert_channel = rng.range_i64(0, 2) as usize;
    for y in y_start..y_end {
        for x in 0..img.width() {
            let px = img.get_pixel_mut(x, y as u32);
            let [r, g, b, a] = px.0;
            px.0 = match variant {
                0 => [b, g, r, a],
                1 => [g, b, r, a],
                _ => {
                    let mut c = [r, g, b, a];
                    c[invert_channel] = 255 - c[invert_channel];
                    c
                }
            };
        }
    }
}

fn noise(
    img: &mut RgbaImage,
    num_bands: u32,
    max_band_height: u32,
    noise_strength: u32,
    intensity: f64,
    rng: &mut dyn UniformSource,
) {
    let (w, h) = (img.width(), img.height() as i64);
    let count = (num_bands as f64 * intensity) as i64;
    let strength = (noise_strength as f64 * intensity) as i64;
    if strength <= 0 {
        return;
    }
    for _ in 0..count {
        let y_start = if h > 10 { rng.range_i64(0, h - 10) } else { 0 };
        let band_h = rng.range_i64(2, ((max_band_height as f64 * intensity) as i64).max(3));
        let y_end = (y_start + band_h).min(h);
        for y in y_start..y_end {
            for x in 0..w {
                let px = img.get_pixel_mut(x, y as u32);
                for c in 0..3 {
                    let n = rng.range_i64(0, strength - 1);
                    px.0[c] = (px.0[c] as i64 + n).clamp(0, 255) as u8;
                }
            }
        }
    }
}

fn vhs(
    img: &mut RgbaImage,
    wave_amplitude: u32,
    wave_freq_min: f64,
    wave_freq_max: f64,
    intensity: f64,
    rng: &mut dyn UniformSource,
) {
    let amp = (wave_amplitude as f64 * intensity) as i64;
    let freq = rng.range_f64(wave_freq_min, wave_freq_max);
    for y in 0..img.height() {
        let jitter = rng.next_f64() * 10.0;
        let shift = (amp as f64 * (y as f64 * freq + jitter).sin()) as i64;
        roll_row(img, y, shift);
    }
}

/// Rotate one row of whole pixels horizontally, wrapping.
fn roll_row(img: &mut RgbaImage, y: u32, shift: i64) {
    let w = img.width() as i64;
    if w == 0 || shift.rem_euclid(w) == 0 {
        return;
    }
    let shift = shift.rem_euclid(w);
    let row: Vec<image::Rgba<u8>> = (0..img.width()).map(|x| *img.get_pixel(x, y)).collect();
    for (x, px) in row.into_iter().enumerate() {
        let nx = ((x as i64 + shift) % w) as u32;
        img.put_pixel(nx, y, px);
    }
}

/// Rotate a single color channel horizontally across the whole image.
fn roll_channel(img: &mut RgbaImage, channel: usize, shift: i64) {
    let w = img.width() as i64;
    if w == 0 || shift.rem_euclid(w) == 0 {
        return;
    }
    let shift = shift.rem_euclid(w);
    for y in 0..img.height() {
        let vals: Vec<u8> = (0..img.width())
            .map(|x| img.get_pixel(x, y).0[channel])
            .collect();
        for (x, v) in vals.into_iter().enumerate() {
            let nx = ((x as i64 + shift) % w) as u32;
            img.get_pixel_mut(nx, y).0[channel] = v;
        }
    }
}
