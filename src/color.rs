use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// `n` hues spread around the colour wheel at fixed saturation and
/// lightness, starting from orange-red so the first continent is warm.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    const HUE_OFFSET: f32 = 20.0;
    let step = 360.0 / n.max(1) as f32;
    (0..n)
        .map(|i| {
            let rgb: Srgb = Hsl::new(HUE_OFFSET + step * i as f32, 0.7, 0.5).into_color();
            let [r, g, b] =
                [rgb.red, rgb.green, rgb.blue].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
            Color32::from_rgb(r, g, b)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: continent → Color32
// ---------------------------------------------------------------------------

/// Maps every continent of the dataset to a distinct colour.
///
/// Built once per dataset from the full continent set, so a continent keeps
/// its colour when the year or the continent selection changes.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    pub fn new(continents: &BTreeSet<String>) -> Self {
        let palette = generate_palette(continents.len());
        let mapping = continents.iter().cloned().zip(palette).collect();
        ColorMap { mapping }
    }

    /// Look up the colour for a continent; unknown ones are grey.
    pub fn color_for(&self, continent: &str) -> Color32 {
        self.mapping.get(continent).copied().unwrap_or(Color32::GRAY)
    }

    /// Legend entries (continent → colour) in sorted order.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping.iter().map(|(k, c)| (k.clone(), *c)).collect()
    }
}
