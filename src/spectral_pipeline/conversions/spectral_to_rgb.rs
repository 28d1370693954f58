use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::spectral_pipeline::{
    cmf::{CmfTable, load_cmf_csv, resample_cmf},
    colorimetry::cmf_xyz_to_linear_srgb,
    common::error::{Result, SpectralError},
    common::types::{LdrImage, TristimulusImage},
    config::PipelineConfig,
    conversions::timing::PipelineTimings,
    integrate::integrate_stack,
    output::{ContainerWriter, HdrWriter, LdrWriter},
    render::{SpectralRenderer, render_all},
    stack::{AnySliceReader, SliceReader, SpectralStack, StackLoader},
    tonemap::to_ldr,
};

/// Files written by one conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub hdr: PathBuf,
    pub ldr: PathBuf,
}

/// Renders a spectral stack and reduces it to an HDR and an LDR RGB image.
pub struct SpectralToRgbPipeline<R, S, H, L>
where
    R: SpectralRenderer,
    S: SliceReader,
    H: HdrWriter,
    L: LdrWriter,
{
    renderer: R,
    loader: StackLoader<S>,
    hdr_writer: H,
    ldr_writer: L,
    config: PipelineConfig,
}

impl<R: SpectralRenderer> SpectralToRgbPipeline<R, AnySliceReader, ContainerWriter, ContainerWriter> {
    pub fn new(config: PipelineConfig, renderer: R) -> Self {
        let writer = ContainerWriter::new(
            config.container,
            config.tiff_compression,
            config.tiff_predictor,
        );
        Self {
            renderer,
            loader: StackLoader::new(config.slice_extension.clone()),
            hdr_writer: writer,
            ldr_writer: writer,
            config,
        }
    }
}

impl<R, S, H, L> SpectralToRgbPipeline<R, S, H, L>
where
    R: SpectralRenderer,
    S: SliceReader,
    H: HdrWriter,
    L: LdrWriter,
{
    pub fn with_custom(
        renderer: R,
        reader: S,
        hdr_writer: H,
        ldr_writer: L,
        config: PipelineConfig,
    ) -> Self {
        Self {
            renderer,
            loader: StackLoader::with_reader(reader, config.slice_extension.clone()),
            hdr_writer,
            ldr_writer,
            config,
        }
    }

    /// Reduces a loaded stack to the HDR tristimulus image and its LDR
    /// rendition. `cmf_xyz` is the CIE XYZ table as loaded from disk.
    pub fn process(
        &self,
        stack: &SpectralStack,
        cmf_xyz: &CmfTable,
    ) -> Result<(TristimulusImage, LdrImage)> {
        self.process_timed(stack, cmf_xyz, &mut PipelineTimings::new())
    }

    fn process_timed(
        &self,
        stack: &SpectralStack,
        cmf_xyz: &CmfTable,
        timings: &mut PipelineTimings,
    ) -> Result<(TristimulusImage, LdrImage)> {
        let cmf_rgb = timings.time("resample_cmf", || -> Result<CmfTable> {
            let resampled = resample_cmf(cmf_xyz, stack.wavelengths())?;
            Ok(cmf_xyz_to_linear_srgb(&resampled))
        })?;
        let hdr = timings.time("integrate", || integrate_stack(&cmf_rgb, stack))?;
        let ldr = timings.time("tonemap", || {
            to_ldr(&hdr, self.config.exposure, self.config.quantization)
        })?;
        Ok((hdr, ldr))
    }

    /// Paths the configured writers produce for the configured output base.
    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths {
            hdr: with_suffix(&self.config.output_base, self.hdr_writer.hdr_suffix()),
            ldr: with_suffix(&self.config.output_base, self.ldr_writer.ldr_suffix()),
        }
    }

    /// Encodes both images, then writes them. Either both files are written
    /// or neither is left behind.
    pub fn write_outputs(&self, hdr: &TristimulusImage, ldr: &LdrImage) -> Result<OutputPaths> {
        let paths = self.output_paths();

        let mut hdr_bytes = Vec::new();
        self.hdr_writer.write_hdr(hdr, &mut hdr_bytes)?;
        let mut ldr_bytes = Vec::new();
        self.ldr_writer.write_ldr(ldr, &mut ldr_bytes)?;

        write_file(&paths.hdr, &hdr_bytes)?;
        if let Err(e) = write_file(&paths.ldr, &ldr_bytes) {
            remove_partial(&paths.hdr);
            return Err(e);
        }
        Ok(paths)
    }

    /// Converts slices already present in `dir`, without rendering.
    pub fn convert_directory<P: AsRef<Path>>(&self, dir: P) -> Result<OutputPaths> {
        self.convert_directory_with_timings(dir).map(|(paths, _)| paths)
    }

    #[instrument(skip(self, dir), fields(dir = %dir.as_ref().display()))]
    pub fn convert_directory_with_timings<P: AsRef<Path>>(
        &self,
        dir: P,
    ) -> Result<(OutputPaths, PipelineTimings)> {
        self.config.validate()?;
        let mut timings = PipelineTimings::new();

        let cmf = timings.time("load_cmf", || load_cmf_csv(&self.config.cmf_path))?;
        let stack = timings.time("load_stack", || self.loader.load_dir(dir.as_ref()))?;
        let paths = self.finish(&stack, &cmf, &mut timings)?;
        Ok((paths, timings))
    }

    /// Renders every configured wavelength, then converts the result.
    pub fn run(&self) -> Result<OutputPaths> {
        self.run_with_timings().map(|(paths, _)| paths)
    }

    #[instrument(skip(self))]
    pub fn run_with_timings(&self) -> Result<(OutputPaths, PipelineTimings)> {
        self.config.validate()?;
        let mut timings = PipelineTimings::new();

        // Fail on a bad CMF table before spending time in the renderer.
        let cmf = timings.time("load_cmf", || load_cmf_csv(&self.config.cmf_path))?;
        let wavelengths = self.config.wavelengths.wavelengths();

        let (dir, scratch) = match &self.config.keep_slices {
            Some(dir) => {
                std::fs::create_dir_all(dir).map_err(|e| {
                    SpectralError::OutputWriteError(format!("{}: {}", dir.display(), e))
                })?;
                (dir.clone(), None)
            }
            None => {
                let tmp = tempfile::Builder::new()
                    .prefix("spectral-rgb-")
                    .tempdir()
                    .map_err(|e| {
                        SpectralError::OutputWriteError(format!("scratch directory: {}", e))
                    })?;
                (tmp.path().to_path_buf(), Some(tmp))
            }
        };
        info!(
            dir = %dir.display(),
            wavelengths = wavelengths.len(),
            jobs = self.config.jobs,
            "Rendering spectral slices"
        );

        let rendered = timings.time("render", || {
            render_all(
                &self.renderer,
                &wavelengths,
                &dir,
                &self.config.slice_extension,
                self.config.jobs,
            )
        })?;
        let slices: Vec<(f64, PathBuf)> = wavelengths.iter().copied().zip(rendered).collect();
        let stack = timings.time("load_stack", || self.loader.load_slices(&slices))?;
        let paths = self.finish(&stack, &cmf, &mut timings)?;

        if let Some(tmp) = scratch {
            tmp.close()?;
        }
        Ok((paths, timings))
    }

    fn finish(
        &self,
        stack: &SpectralStack,
        cmf_xyz: &CmfTable,
        timings: &mut PipelineTimings,
    ) -> Result<OutputPaths> {
        let (hdr, ldr) = self.process_timed(stack, cmf_xyz, timings)?;
        let paths = timings.time("write_outputs", || self.write_outputs(&hdr, &ldr))?;
        info!("Wrote RGB image to {} and {}", paths.hdr.display(), paths.ldr.display());
        Ok(paths)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).map_err(|e| {
        remove_partial(path);
        SpectralError::OutputWriteError(format!("{}: {}", path.display(), e))
    })
}

fn remove_partial(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => warn!("Removed incomplete output {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove incomplete output {}: {}", path.display(), e),
    }
}
