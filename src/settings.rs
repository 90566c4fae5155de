//! Render settings.

use serde::{Serialize, Deserialize};

use crate::{Color, Error, Result};

/// Highest octave accepted by `Settings::validate`.
///
/// Keeps the path at a few hundred thousand stripes; finer octaves are far
/// below a pixel for any canvas that fits in memory.
pub const MAX_OCTAVE: u32 = 16;

/// How rows of the canvas are produced.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum RenderMethod {
    /// Use the current thread.
    #[default]
    Single,
    /// Use the Rayon thread pool.
    Parallel,
}

/// Stores everything that controls the placeholder texture.
///
/// The default values produce the standard 256x256 `no_tile.png`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Settings {
    /// Width and height of the square canvas in pixels.
    pub size: u32,
    /// First and last octave, inclusive.
    pub octaves: [u32; 2],
    /// Line width at octave 0, halved with every octave.
    pub line_width: f64,
    /// Color painted below the grid.
    pub background: Color,
    /// Color of the grid lines.
    pub foreground: Color,
    /// Output file.
    pub output: String,
    /// Render method.
    pub method: RenderMethod,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            size: 256,
            octaves: [1, 7],
            line_width: 8.0,
            background: Color::gray(0.125),
            foreground: Color::gray(0.25),
            output: "no_tile.png".into(),
            method: RenderMethod::Single,
        }
    }
}

impl Settings {
    /// Checks that the settings describe a texture that can be rendered.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(Error::Config("size must be positive".into()));
        }
        let [a, b] = self.octaves;
        if a > b {
            return Err(Error::Config(format!("empty octave range {}..={}", a, b)));
        }
        if b > MAX_OCTAVE {
            return Err(Error::Config(format!("octave {} is above {}", b, MAX_OCTAVE)));
        }
        if !(self.line_width.is_finite() && self.line_width >= 0.0) {
            return Err(Error::Config(format!("invalid line width {}", self.line_width)));
        }
        if !self.background.is_valid() {
            return Err(Error::Config(format!("invalid background {:?}", self.background.0)));
        }
        if !self.foreground.is_valid() {
            return Err(Error::Config(format!("invalid foreground {:?}", self.foreground.0)));
        }
        if self.output.is_empty() {
            return Err(Error::Config("empty output path".into()));
        }
        Ok(())
    }
}
