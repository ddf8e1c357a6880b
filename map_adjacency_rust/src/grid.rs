use anyhow::{bail, Result};
use image::RgbImage;

use crate::registry::Color;

/// Dense row-major color raster. `x` runs along the width, `y` along the height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    data: Vec<Color>,
}

impl Grid {
    pub fn from_vec(width: usize, height: usize, data: Vec<Color>) -> Result<Self> {
        let Some(expected) = width.checked_mul(height) else {
            bail!("grid dimensions {}x{} overflow", width, height);
        };
        if data.len() != expected {
            bail!("grid size mismatch: expected {} pixels, got {}", expected, data.len());
        }
        Ok(Self { width, height, data })
    }

    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> Color,
    {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height { for x in 0..width { data.push(f(x, y)); }}
        Self { width, height, data }
    }

    pub fn from_rgb_image(rgb: &RgbImage) -> Self {
        let (w, h) = rgb.dimensions();
        let data = rgb.pixels().map(|p| Color::from(p.0)).collect();
        Self { width: w as usize, height: h as usize, data }
    }

    pub fn width(&self) -> usize { self.width }

    pub fn height(&self) -> usize { self.height }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Color {
        self.data[y * self.width + x]
    }

    /// Rows that can act as scan centers: every row except the outermost two.
    pub fn interior_rows(&self) -> std::ops::Range<usize> {
        if self.height < 3 || self.width < 3 { 1..1 } else { 1..self.height - 1 }
    }

    pub fn interior_cols(&self) -> std::ops::Range<usize> {
        if self.height < 3 || self.width < 3 { 1..1 } else { 1..self.width - 1 }
    }
}
