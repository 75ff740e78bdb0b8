use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Sequential ramps for value-coloured bars
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramp {
    Blues,
    Viridis,
    Reds,
}

impl Ramp {
    fn stops(self) -> &'static [(u8, u8, u8)] {
        match self {
            Ramp::Blues => &[(222, 235, 247), (107, 174, 214), (8, 48, 107)],
            Ramp::Viridis => &[(68, 1, 84), (33, 145, 140), (253, 231, 37)],
            Ramp::Reds => &[(254, 224, 210), (251, 106, 74), (103, 0, 13)],
        }
    }

    /// Colour at `t` in `[0, 1]`, interpolated in linear RGB.
    pub fn at(self, t: f64) -> Color32 {
        let stops = self.stops();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) as f32 } else { 0.0 };
        let scaled = t * (stops.len() - 1) as f32;
        let i = (scaled.floor() as usize).min(stops.len() - 2);
        let local = scaled - i as f32;

        let linear = |(r, g, b): (u8, u8, u8)| -> LinSrgb {
            Srgb::new(r, g, b).into_format::<f32>().into_linear()
        };
        let mixed = linear(stops[i]).mix(linear(stops[i + 1]), local);
        to_color32(Srgb::from_linear(mixed))
    }
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps the categories of one axis to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map, assigning hues in the given order.
    pub fn new(categories: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let categories: Vec<String> = categories.into_iter().map(Into::into).collect();
        let palette = generate_palette(categories.len());
        let mapping: BTreeMap<String, Color32> = categories.into_iter().zip(palette).collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given category.
    pub fn color_for(&self, value: &str) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}
