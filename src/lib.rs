#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

use serde::{Serialize, Deserialize};

pub use error::{Error, Result};
pub use report::Report;
pub use settings::{RenderMethod, Settings};

#[cfg(feature = "render")]
pub use render::{encode_png, generate, render, render_to_file, render_to_image, render_with_report, write_png};

pub mod coverage;
pub mod error;
pub mod report;
pub mod settings;

#[cfg(feature = "render")]
pub mod render;

/// An RGB color with components in `[0, 1]`.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
pub struct Color(pub [f64; 3]);

impl Color {
    /// Creates a gray color with the same value in every channel.
    pub const fn gray(v: f64) -> Color {Color([v; 3])}

    /// Interpolates linearly towards `other`.
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let [r, g, b] = self.0;
        let [r2, g2, b2] = other.0;
        Color([r + (r2 - r) * t, g + (g2 - g) * t, b + (b2 - b) * t])
    }

    /// Converts to 8 bit RGBA, fully opaque.
    pub fn to_rgba8(self) -> [u8; 4] {
        let ch = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [ch(self.0[0]), ch(self.0[1]), ch(self.0[2]), 255]
    }

    /// Returns `true` if every channel is finite and within `[0, 1]`.
    pub fn is_valid(&self) -> bool {
        self.0.iter().all(|v| v.is_finite() && (0.0..=1.0).contains(v))
    }
}

/// The direction a stripe runs in.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Runs from top to bottom, positioned along X.
    Vertical,
    /// Runs from left to right, positioned along Y.
    Horizontal,
}

/// A rectangle spanning the whole canvas in one direction.
///
/// The grid path consists only of these, which is what makes the fill
/// separable into per-column and per-row coverage.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
pub struct Stripe {
    /// Direction of the stripe.
    pub orientation: Orientation,
    /// Position of the line center in pixels.
    pub center: f64,
    /// Line width in pixels.
    pub width: f64,
}

impl Stripe {
    /// Gets the `[start, end]` interval across the stripe, unclipped.
    pub fn interval(&self) -> [f64; 2] {
        let half = self.width * 0.5;
        [self.center - half, self.center + half]
    }

    /// Gets the stripe as an explicit rectangle on a canvas of `size` pixels.
    pub fn rect(&self, size: u32) -> Rect {
        let [a, _] = self.interval();
        let size = size as f64;
        match self.orientation {
            Orientation::Vertical => Rect {x: a, y: 0.0, w: self.width, h: size},
            Orientation::Horizontal => Rect {x: 0.0, y: a, w: size, h: self.width},
        }
    }
}

/// An axis aligned rectangle `(x, y, w, h)` in pixel coordinates.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl Rect {
    /// Intersects with the canvas `[0, size] x [0, size]`.
    ///
    /// Returns `None` when nothing of the rectangle is left.
    pub fn clip(&self, size: u32) -> Option<Rect> {
        let size = size as f64;
        let x = self.x.max(0.0);
        let y = self.y.max(0.0);
        let w = (self.x + self.w).min(size) - x;
        let h = (self.y + self.h).min(size) - y;
        if w > 0.0 && h > 0.0 {Some(Rect {x, y, w, h})} else {None}
    }
}

/// Computes the grid path for a square canvas.
///
/// For every octave `i` in `octaves[0]..=octaves[1]` the canvas is split into
/// `num = 2^i` cells and a vertical and a horizontal stripe of width
/// `line_width / num` is placed at each of the `num + 1` boundaries.
/// Stripes on the border extend past the canvas and are clipped by the fill.
///
/// Panics if an octave is 64 or above. `Settings::validate` caps it at 16.
pub fn grid(size: u32, octaves: [u32; 2], line_width: f64) -> Vec<Stripe> {
    let mut res = vec![];
    for i in octaves[0]..=octaves[1] {
        let num = 1u64 << i;
        let width = line_width / num as f64;
        for j in 0..=num {
            let center = j as f64 * size as f64 / num as f64;
            res.push(Stripe {orientation: Orientation::Vertical, center, width});
            res.push(Stripe {orientation: Orientation::Horizontal, center, width});
        }
    }
    res
}

/// Computes the grid path described by settings.
pub fn stripes(settings: &Settings) -> Vec<Stripe> {
    grid(settings.size, settings.octaves, settings.line_width)
}

/// Save settings to file.
pub fn save_settings(file: &str, settings: &Settings) -> anyhow::Result<()> {
    use std::fs::File;
    use std::io::Write;

    let mut file = File::create(file)?;
    let encoded: Vec<u8> = bincode::serialize(settings)?;
    file.write_all(&encoded)?;
    Ok(())
}

/// Open settings file.
pub fn open_settings(file: &str) -> anyhow::Result<Settings> {
    use std::fs::File;
    use std::io::Read;

    let mut file = File::open(file)?;
    let mut decoded: Vec<u8> = vec![];
    file.read_to_end(&mut decoded)?;
    Ok(bincode::deserialize(&decoded)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_counts() {
        let stripes = stripes(&Settings::default());
        // Sum of 2 * (2^i + 1) over i in 1..=7.
        assert_eq!(stripes.len(), 516);

        let a = grid(256, [1, 1], 8.0);
        assert_eq!(a.len(), 6);
        assert_eq!(a[0], Stripe {orientation: Orientation::Vertical, center: 0.0, width: 4.0});
        assert_eq!(a[1], Stripe {orientation: Orientation::Horizontal, center: 0.0, width: 4.0});
        assert_eq!(a[2].center, 128.0);
        assert_eq!(a[5].center, 256.0);
    }

    #[test]
    fn grid_widths_halve() {
        let a = grid(256, [1, 7], 8.0);
        let mut widths: Vec<f64> = a.iter().map(|s| s.width).collect();
        widths.dedup();
        assert_eq!(widths, vec![4.0, 2.0, 1.0, 0.5, 0.25, 0.125, 0.0625]);
    }

    #[test]
    fn center_recurs_every_octave() {
        let a = grid(256, [1, 7], 8.0);
        let n = a.iter()
            .filter(|s| s.orientation == Orientation::Vertical && s.center == 128.0)
            .count();
        assert_eq!(n, 7);
    }

    #[test]
    fn empty_octave_range() {
        assert!(grid(256, [3, 2], 8.0).is_empty());
    }

    #[test]
    fn stripe_rect() {
        let s = Stripe {orientation: Orientation::Vertical, center: 128.0, width: 4.0};
        let r = s.rect(256);
        assert_eq!(r, Rect {x: 126.0, y: 0.0, w: 4.0, h: 256.0});
        assert_eq!(r.clip(256), Some(r));

        let s = Stripe {orientation: Orientation::Horizontal, center: 0.0, width: 4.0};
        let r = s.rect(256);
        assert_eq!(r, Rect {x: 0.0, y: -2.0, w: 256.0, h: 4.0});
        assert_eq!(r.clip(256), Some(Rect {x: 0.0, y: 0.0, w: 256.0, h: 2.0}));

        let s = Stripe {orientation: Orientation::Vertical, center: 300.0, width: 4.0};
        assert_eq!(s.rect(256).clip(256), None);
    }

    #[test]
    fn color() {
        assert_eq!(Color::gray(0.125).to_rgba8(), [32, 32, 32, 255]);
        assert_eq!(Color::gray(0.25).to_rgba8(), [64, 64, 64, 255]);
        assert_eq!(Color::gray(0.125).lerp(Color::gray(0.25), 0.0), Color::gray(0.125));
        assert_eq!(Color::gray(0.125).lerp(Color::gray(0.25), 1.0), Color::gray(0.25));
        assert!(!Color([0.0, 1.5, 0.0]).is_valid());
        assert!(!Color([f64::NAN, 0.0, 0.0]).is_valid());
    }

    #[test]
    fn settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("grid.notile");
        let file = file.to_str().unwrap();

        let settings = Settings {size: 64, octaves: [2, 4], ..Settings::default()};
        save_settings(file, &settings).unwrap();
        assert_eq!(open_settings(file).unwrap(), settings);
        assert!(open_settings(&format!("{}.missing", file)).is_err());
    }
}
