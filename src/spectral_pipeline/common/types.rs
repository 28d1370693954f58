//! Image buffers produced by the integrator and the tonemapper

/// HDR tristimulus image, unbounded `f32`.
#[derive(Debug, Clone, PartialEq)]
pub struct TristimulusImage {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Interleaved channel data [c0, c1, c2, c0, c1, c2, ...], row-major
    pub data: Vec<f32>,
}

impl TristimulusImage {
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height * 3],
        }
    }

    /// True when the image is non-empty and `data` holds exactly three
    /// values per pixel.
    pub fn is_well_formed(&self) -> bool {
        well_formed(self.width, self.height, self.data.len())
    }

    /// The three channel values at (`row`, `col`).
    pub fn pixel(&self, row: usize, col: usize) -> [f32; 3] {
        let base = (row * self.width + col) * 3;
        [self.data[base], self.data[base + 1], self.data[base + 2]]
    }
}

/// Quantized 8-bit-per-channel image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdrImage {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Interleaved RGB data [R, G, B, R, G, B, ...], row-major
    pub data: Vec<u8>,
}

impl LdrImage {
    pub fn is_well_formed(&self) -> bool {
        well_formed(self.width, self.height, self.data.len())
    }

    pub fn pixel(&self, row: usize, col: usize) -> [u8; 3] {
        let base = (row * self.width + col) * 3;
        [self.data[base], self.data[base + 1], self.data[base + 2]]
    }
}

fn well_formed(width: usize, height: usize, len: usize) -> bool {
    width > 0
        && height > 0
        && width
            .checked_mul(height)
            .and_then(|pixels| pixels.checked_mul(3))
            == Some(len)
}
