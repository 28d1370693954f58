//! Output container settings

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    #[default]
    None,
    /// LZW compression (slow, good compression)
    Lzw,
    /// Deflate compression - fast level (good speed/size balance)
    DeflateFast,
    /// Deflate compression - best compression (slower)
    DeflateBest,
    /// Deflate compression - balanced
    DeflateBalanced,
}

/// File pair produced for each run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Container {
    /// `<base>.exr` (32-bit float RGB) and `<base>.png` (8-bit sRGB)
    #[default]
    ExrPng,
    /// `<base>.tiff` (32-bit float RGB) and `<base>_ldr.tiff` (8-bit RGB)
    Tiff,
}
