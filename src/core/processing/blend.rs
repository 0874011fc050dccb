//! Per-pixel blend functions on straight RGB in `[0, 1]`.
//!
//! `b` is the backdrop (what is already on the canvas), `s` the source being
//! drawn. Definitions follow W3C Compositing and Blending Level 1, which is
//! also what Core Graphics implements for the same mode names.
use crate::types::BlendMode;

pub type Rgb = [f32; 3];

/// Blend one source color onto one backdrop color, ignoring alpha.
pub fn blend_rgb(b: Rgb, s: Rgb, mode: BlendMode) -> Rgb {
    match mode {
        BlendMode::Normal => s,
        BlendMode::Multiply => separable(b, s, |b, s| b * s),
        BlendMode::Darken => separable(b, s, f32::min),
        BlendMode::ColorBurn => separable(b, s, color_burn),
        BlendMode::HardLight => separable(b, s, hard_light),
        BlendMode::Overlay => separable(b, s, |b, s| hard_light(s, b)),
        BlendMode::SoftLight => separable(b, s, soft_light),
        BlendMode::Hue => set_lum(set_sat(s, sat(b)), lum(b)),
        BlendMode::Saturation => set_lum(set_sat(b, sat(s)), lum(b)),
        BlendMode::Color => set_lum(s, lum(b)),
        BlendMode::Luminosity => set_lum(b, lum(s)),
    }
}

fn separable(b: Rgb, s: Rgb, f: impl Fn(f32, f32) -> f32) -> Rgb {
    [f(b[0], s[0]), f(b[1], s[1]), f(b[2], s[2])]
}

fn screen(b: f32, s: f32) -> f32 {
    b + s - b * s
}

fn color_burn(b: f32, s: f32) -> f32 {
    if b >= 1.0 {
        1.0
    } else if s <= 0.0 {
        0.0
    } else {
        1.0 - ((1.0 - b) / s).min(1.0)
    }
}

fn hard_light(b: f32, s: f32) -> f32 {
    if s <= 0.5 {
        b * 2.0 * s
    } else {
        screen(b, 2.0 * s - 1.0)
    }
}

fn soft_light(b: f32, s: f32) -> f32 {
    if s <= 0.5 {
        b - (1.0 - 2.0 * s) * b * (1.0 - b)
    } else {
        let d = if b <= 0.25 {
            ((16.0 * b - 12.0) * b + 4.0) * b
        } else {
            b.sqrt()
        };
        b + (2.0 * s - 1.0) * (d - b)
    }
}

pub fn lum(c: Rgb) -> f32 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

fn clip_color(c: Rgb) -> Rgb {
    let l = lum(c);
    let n = c[0].min(c[1]).min(c[2]);
    let x = c[0].max(c[1]).max(c[2]);
    let mut out = c;
    if n < 0.0 {
        let denom = l - n;
        for v in &mut out {
            *v = if denom > 0.0 { l + (*v - l) * l / denom } else { l };
        }
    }
    if x > 1.0 {
        let denom = x - l;
        for v in &mut out {
            *v = if denom > 0.0 {
                l + (*v - l) * (1.0 - l) / denom
            } else {
                l
            };
        }
    }
    out
}

fn set_lum(c: Rgb, l: f32) -> Rgb {
    let d = l - lum(c);
    clip_color([c[0] + d, c[1] + d, c[2] + d])
}

fn sat(c: Rgb) -> f32 {
    c[0].max(c[1]).max(c[2]) - c[0].min(c[1]).min(c[2])
}

// Scale the channels so max - min == s, keeping their relative order.
fn set_sat(c: Rgb, s: f32) -> Rgb {
    let max = c[0].max(c[1]).max(c[2]);
    let min = c[0].min(c[1]).min(c[2]);
    let range = max - min;
    if range <= 0.0 {
        return [0.0; 3];
    }
    c.map(|v| (v - min) * s / range)
}
