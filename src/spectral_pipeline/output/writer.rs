use std::io::Write;
use crate::spectral_pipeline::common::error::Result;
use crate::spectral_pipeline::common::types::{LdrImage, TristimulusImage};

pub trait HdrWriter {
    /// Appended to the output base name, e.g. `.exr`.
    fn hdr_suffix(&self) -> &'static str;
    fn write_hdr(&self, image: &TristimulusImage, output: &mut dyn Write) -> Result<()>;
}

pub trait LdrWriter {
    /// Appended to the output base name, e.g. `.png`.
    fn ldr_suffix(&self) -> &'static str;
    fn write_ldr(&self, image: &LdrImage, output: &mut dyn Write) -> Result<()>;
}
