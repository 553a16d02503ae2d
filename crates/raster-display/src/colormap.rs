//! Color ramps for single-band overlays and RGBA composition.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::normalize::NormalizedImage;

/// Minimum pixels to colorize rows in parallel
const PARALLEL_THRESHOLD: usize = 4096; // 64x64 or larger

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }
}

/// Linear color interpolation
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    Color::new(
        ((color1.r as f32 * t_inv) + (color2.r as f32 * t)).round() as u8,
        ((color1.g as f32 * t_inv) + (color2.g as f32 * t)).round() as u8,
        ((color1.b as f32 * t_inv) + (color2.b as f32 * t)).round() as u8,
        ((color1.a as f32 * t_inv) + (color2.a as f32 * t)).round() as u8,
    )
}

/// Ramp applied to single-band overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorRamp {
    /// Red at the low end through yellow to green at the high end (NDVI style)
    #[default]
    RedGreen,
    /// Black to white
    Grayscale,
}

impl ColorRamp {
    /// Parse from string (case-insensitive). Unknown values fall back to `RedGreen`.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "grayscale" | "greyscale" | "gray" | "grey" => Self::Grayscale,
            _ => Self::RedGreen,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorRamp::RedGreen => "red_green",
            ColorRamp::Grayscale => "grayscale",
        }
    }

    /// Opaque color for an 8-bit sample.
    pub fn color(&self, value: u8) -> Color {
        match self {
            ColorRamp::RedGreen => interpolate_color(
                Color::new(255, 0, 0, 255),
                Color::new(0, 255, 0, 255),
                value as f32 / 255.0,
            ),
            ColorRamp::Grayscale => Color::new(value, value, value, 255),
        }
    }
}

/// Expand a normalized image into RGBA bytes (row-major, 4 bytes per pixel).
///
/// Three or more channels are composed as RGB from the first three; fewer
/// go through `ramp` on the first channel. Pixels without finite source
/// samples are fully transparent; all others get `opacity` (clamped to
/// 0.0..=1.0) as alpha.
pub fn colorize(image: &NormalizedImage, ramp: ColorRamp, opacity: f32) -> Vec<u8> {
    let (height, width, channels) = image.pixels.dim();
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    let mut rgba = vec![0u8; width * height * 4];

    let fill_row = |row: usize, out: &mut [u8]| {
        for col in 0..width {
            if !image.is_valid(row, col) {
                continue;
            }
            let color = if channels >= 3 {
                Color::new(
                    image.pixels[[row, col, 0]],
                    image.pixels[[row, col, 1]],
                    image.pixels[[row, col, 2]],
                    255,
                )
            } else {
                ramp.color(image.pixels[[row, col, 0]])
            };
            let px = &mut out[col * 4..col * 4 + 4];
            px[0] = color.r;
            px[1] = color.g;
            px[2] = color.b;
            px[3] = alpha;
        }
    };

    if width == 0 || height == 0 {
        return rgba;
    }

    if width * height >= PARALLEL_THRESHOLD {
        rgba.par_chunks_mut(width * 4)
            .enumerate()
            .for_each(|(row, out)| fill_row(row, out));
    } else {
        rgba.chunks_mut(width * 4)
            .enumerate()
            .for_each(|(row, out)| fill_row(row, out));
    }

    rgba
}
