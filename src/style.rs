//! Colours, fonts and themes for the figure.

use once_cell::sync::Lazy;
use piet::{Color, FontFamily, TextAttribute, TextLayoutBuilder};
use std::fmt;

/// The dark theme, used unless asked otherwise.
pub static DEFAULT_STYLE: Lazy<FigureStyle> = Lazy::new(FigureStyle::default_dark);
pub static LIGHT_STYLE: Lazy<FigureStyle> = Lazy::new(FigureStyle::default_light);

#[derive(Clone)]
pub struct FigureStyle {
    pub background_color: Color,
    pub title: TextStyle,
    /// The text breakdown on the left.
    pub summary: TextStyle,
    pub segment_colors: Box<dyn ColorPalette + Send + Sync>,
    // if `None` labels will not be drawn
    pub segment_label: Option<TextStyle>,
}

impl fmt::Debug for FigureStyle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FigureStyle")
            .field("background_color", &self.background_color)
            .field("title", &self.title)
            .field("summary", &self.summary)
            .field("segment_colors", &"dyn ColorPalette")
            .field("segment_label", &self.segment_label)
            .finish()
    }
}

impl FigureStyle {
    pub fn default_dark() -> Self {
        Self {
            background_color: Color::rgb8(0x1c, 0x1c, 0x1c),
            title: TextStyle::default_dark().with_font_size(21.),
            summary: TextStyle::default_dark().with_monospace(true),
            segment_colors: Box::new(ViridisPalette::default()),
            segment_label: Some(TextStyle::default_dark()),
        }
    }

    pub fn default_light() -> Self {
        Self {
            background_color: Color::WHITE,
            title: TextStyle::default().with_font_size(21.),
            summary: TextStyle::default().with_monospace(true),
            segment_colors: Box::new(ViridisPalette::default()),
            segment_label: Some(TextStyle::default()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextStyle {
    pub color: Color,
    /// In pixels.
    pub font_size: f64,
    pub monospace: bool,
}

impl TextStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            font_size: 13.,
            monospace: false,
        }
    }

    fn default_dark() -> Self {
        Self {
            color: Color::WHITE,
            ..Self::default()
        }
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_monospace(mut self, monospace: bool) -> Self {
        self.monospace = monospace;
        self
    }

    /// Baseline-to-baseline distance for stacked lines.
    pub fn line_height(&self) -> f64 {
        self.font_size * 1.2
    }
}

pub(crate) trait ApplyStyle {
    fn apply_style(self, style: &TextStyle) -> Self;
}

impl<T: TextLayoutBuilder> ApplyStyle for T {
    fn apply_style(self, style: &TextStyle) -> Self {
        let mut this = self.default_attribute(TextAttribute::FontSize(px_to_pt(style.font_size)));
        if style.monospace {
            this = this.default_attribute(TextAttribute::FontFamily(FontFamily::MONOSPACE));
        }
        this.text_color(style.color)
    }
}

fn px_to_pt(px: f64) -> f64 {
    0.75 * px
}

pub trait ColorPalette: dyn_clone::DynClone {
    /// Colour of segment `index` out of `count`.
    ///
    /// This function is expected to give the same answer for the same input (i.e. be a pure fn).
    fn color(&self, index: usize, count: usize) -> Color;
}

dyn_clone::clone_trait_object!(ColorPalette);

/// Samples the viridis colour map evenly between `start` and `end` (both in `0..=1`).
#[derive(Debug, Copy, Clone)]
pub struct ViridisPalette {
    pub start: f64,
    pub end: f64,
}

impl Default for ViridisPalette {
    fn default() -> Self {
        Self {
            start: 0.2,
            end: 0.8,
        }
    }
}

/// Viridis at nine evenly spaced stops.
const VIRIDIS: [(u8, u8, u8); 9] = [
    (0x44, 0x01, 0x54),
    (0x47, 0x2d, 0x7b),
    (0x3b, 0x52, 0x8b),
    (0x2c, 0x72, 0x8e),
    (0x21, 0x91, 0x8c),
    (0x28, 0xae, 0x80),
    (0x5e, 0xc9, 0x62),
    (0xad, 0xdc, 0x30),
    (0xfd, 0xe7, 0x25),
];

impl ViridisPalette {
    /// Where segment `index` of `count` lands on the colour map.
    fn position(&self, index: usize, count: usize) -> f64 {
        if count < 2 {
            return self.start;
        }
        self.start + (self.end - self.start) * index as f64 / (count - 1) as f64
    }
}

impl ColorPalette for ViridisPalette {
    fn color(&self, index: usize, count: usize) -> Color {
        let scaled = self.position(index, count).clamp(0., 1.) * (VIRIDIS.len() - 1) as f64;
        let lower = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
        let frac = scaled - lower as f64;

        let (r0, g0, b0) = VIRIDIS[lower];
        let (r1, g1, b1) = VIRIDIS[lower + 1];
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
        Color::rgb8(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
    }
}
