// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color256,
    TrueColor,
}

/// Named glow palettes. Each scheme is a fixed set of backdrop colors the
/// glow cycles through; a scheme may legitimately hold a single entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlowScheme {
    Aurora,
    Nebula,
    Ember,
    Ocean,
    Violet,
    Moon,
}

const AURORA: &[(u8, u8, u8)] = &[
    (36, 214, 164),
    (64, 156, 255),
    (142, 84, 233),
    (46, 196, 112),
];

const NEBULA: &[(u8, u8, u8)] = &[
    (186, 85, 211),
    (72, 61, 139),
    (219, 112, 147),
    (95, 158, 160),
    (123, 104, 238),
];

const EMBER: &[(u8, u8, u8)] = &[(226, 88, 34), (255, 160, 52), (178, 34, 52), (255, 99, 71)];

const OCEAN: &[(u8, u8, u8)] = &[(0, 119, 182), (0, 180, 216), (3, 4, 94), (72, 202, 228)];

const VIOLET: &[(u8, u8, u8)] = &[(148, 0, 211), (75, 0, 130), (199, 21, 133)];

const MOON: &[(u8, u8, u8)] = &[(210, 214, 224)];

pub fn scheme_colors(scheme: GlowScheme) -> &'static [(u8, u8, u8)] {
    match scheme {
        GlowScheme::Aurora => AURORA,
        GlowScheme::Nebula => NEBULA,
        GlowScheme::Ember => EMBER,
        GlowScheme::Ocean => OCEAN,
        GlowScheme::Violet => VIOLET,
        GlowScheme::Moon => MOON,
    }
}

pub const SCHEME_NAMES: &[&str] = &["aurora", "nebula", "ember", "ocean", "violet", "moon"];

pub fn parse_scheme(s: &str) -> Result<GlowScheme, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "aurora" => Ok(GlowScheme::Aurora),
        "nebula" => Ok(GlowScheme::Nebula),
        "ember" | "fire" => Ok(GlowScheme::Ember),
        "ocean" | "deep-sea" | "deep_sea" | "deepsea" => Ok(GlowScheme::Ocean),
        "violet" | "purple" => Ok(GlowScheme::Violet),
        "moon" | "mono" => Ok(GlowScheme::Moon),
        _ => Err(format!("invalid color: {} (see --list-colors)", s)),
    }
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

pub fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let r6 = ((r as u16 * 5) + 127) / 255;
    let g6 = ((g as u16 * 5) + 127) / 255;
    let b6 = ((b as u16 * 5) + 127) / 255;

    let cr = CUBE_LEVELS[r6 as usize];
    let cg = CUBE_LEVELS[g6 as usize];
    let cb = CUBE_LEVELS[b6 as usize];
    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(r, g, b, cr, cg, cb);

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let gray_idx = if avg < 8 {
        16
    } else if avg > 238 {
        231
    } else {
        232 + ((avg - 8) / 10)
    };
    let (gr, gg, gb) = if gray_idx == 16 {
        (0, 0, 0)
    } else if gray_idx == 231 {
        (255, 255, 255)
    } else {
        let v = 8 + 10 * (gray_idx - 232);
        (v, v, v)
    };
    let gray_dist = dist2(r, g, b, gr, gg, gb);

    if gray_dist < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

pub fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

pub fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f32) -> (u8, u8, u8) {
    (
        lerp_u8(a.0, b.0, t),
        lerp_u8(a.1, b.1, t),
        lerp_u8(a.2, b.2, t),
    )
}

pub fn scale_rgb(c: (u8, u8, u8), f: f32) -> (u8, u8, u8) {
    let f = f.clamp(0.0, 1.0);
    (
        (c.0 as f32 * f).round() as u8,
        (c.1 as f32 * f).round() as u8,
        (c.2 as f32 * f).round() as u8,
    )
}

/// Map an rgb triple onto the active color depth. Mono surfaces have no
/// usable color, so the caller falls back to the terminal default.
pub fn resolve(mode: ColorMode, (r, g, b): (u8, u8, u8)) -> Option<Color> {
    match mode {
        ColorMode::Mono => None,
        ColorMode::TrueColor => Some(Color::Rgb { r, g, b }),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(r, g, b))),
    }
}

/// Grayscale helper for star brightness, `v` in 0..=255.
pub fn resolve_gray(mode: ColorMode, v: u8) -> Option<Color> {
    resolve(mode, (v, v, v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scheme_name_parses_back_to_itself() {
        for name in SCHEME_NAMES {
            let scheme = parse_scheme(name).expect("listed name parses");
            assert!(!scheme_colors(scheme).is_empty());
        }
        assert!(parse_scheme("plaid").is_err());
    }

    #[test]
    fn moon_is_a_single_entry_palette() {
        assert_eq!(scheme_colors(GlowScheme::Moon).len(), 1);
    }

    #[test]
    fn lerp_hits_both_endpoints() {
        assert_eq!(lerp_rgb((0, 10, 20), (255, 110, 220), 0.0), (0, 10, 20));
        assert_eq!(lerp_rgb((0, 10, 20), (255, 110, 220), 1.0), (255, 110, 220));
    }

    #[test]
    fn ansi256_maps_extremes_to_gray_ramp_ends() {
        assert_eq!(rgb_to_ansi256(0, 0, 0), 16);
        assert_eq!(rgb_to_ansi256(255, 255, 255), 231);
    }

    #[test]
    fn mono_resolves_to_no_color() {
        assert_eq!(resolve(ColorMode::Mono, (10, 20, 30)), None);
        assert!(resolve(ColorMode::TrueColor, (10, 20, 30)).is_some());
    }
}
