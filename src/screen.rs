use std::ops::Range;
use std::path::Path;

use rayon::prelude::*;

use crate::{Color, RenderError};

/// The frame buffer a render writes into.
pub struct Screen {
    pub width: usize,
    pub height: usize,
    /// Sum of the radiance samples taken for each pixel
    accum: Box<[Color]>,
    /// Samples summed into each finished pixel
    samples: u32,
    /// Flat buffer of RGBA8 pixels with length of `width * height * 4`
    rgba: Box<[u8]>,
}
impl Screen {
    /// Both dimensions must be non-zero.
    pub fn new(width: usize, height: usize) -> Self {
        let mut screen = Self {
            width,
            height,
            accum: vec![Color::BLACK; width * height].into(),
            samples: 0,
            rgba: vec![0; width * height * 4].into(),
        };
        screen.clear();
        screen
    }

    /// Resets every pixel to opaque black and forgets all samples.
    pub fn clear(&mut self) {
        for p in self.accum.iter_mut() {
            *p = Color::BLACK;
        }
        for px in self.rgba.chunks_exact_mut(4) {
            px.copy_from_slice(&[0, 0, 0, 255]);
        }
        self.samples = 0;
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub(crate) fn set_samples(&mut self, samples: u32) {
        self.samples = samples;
    }

    /// Row-major RGBA8 bytes
    pub fn as_rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [
            self.rgba[i],
            self.rgba[i + 1],
            self.rgba[i + 2],
            self.rgba[i + 3],
        ]
    }

    /// Summed radiance of the pixel at `(x, y)`
    pub fn radiance(&self, x: usize, y: usize) -> Color {
        self.accum[y * self.width + x]
    }

    /// Encodes each Pixel into `0RGB`
    pub fn encode(&self) -> Box<[u32]> {
        self.rgba
            .chunks_exact(4)
            .map(|p| {
                let (r, g, b) = (p[0] as u32, p[1] as u32, p[2] as u32);
                (r << 16) | (g << 8) | b
            })
            .collect()
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), RenderError> {
        image::save_buffer(
            path,
            &self.rgba,
            self.width as u32,
            self.height as u32,
            image::ColorType::Rgba8,
        )?;
        Ok(())
    }

    /// Disjoint `(radiance, rgba)` row pairs for the scan lines in `rows`.
    pub(crate) fn par_rows_mut(
        &mut self,
        rows: Range<usize>,
    ) -> impl IndexedParallelIterator<Item = (&mut [Color], &mut [u8])> + '_ {
        let width = self.width;
        let accum = &mut self.accum[rows.start * width..rows.end * width];
        let rgba = &mut self.rgba[rows.start * width * 4..rows.end * width * 4];
        accum
            .par_chunks_exact_mut(width)
            .zip(rgba.par_chunks_exact_mut(width * 4))
    }
}
