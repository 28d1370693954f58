//! External renderer executable.
//!
//! Invocation is `<executable> <wavelength flag> <λ> <pass-through args...> <output>`.
//! The exit status is checked and the output file must exist afterwards.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::spectral_pipeline::common::error::{Result, SpectralError};
use crate::spectral_pipeline::render::renderer::SpectralRenderer;

/// Renderer flags that make it exit without writing an image.
pub const FORBIDDEN_RENDERER_ARGS: &[&str] = &["--list-aerosol-types"];

/// Rejects pass-through arguments that would suppress image output.
pub fn check_renderer_args(args: &[String]) -> Result<()> {
    match args.iter().find(|a| FORBIDDEN_RENDERER_ARGS.contains(&a.as_str())) {
        Some(arg) => Err(SpectralError::ForbiddenRendererArgument(arg.clone())),
        None => Ok(()),
    }
}

#[derive(Debug, Clone)]
pub struct ExternalRenderer {
    executable: PathBuf,
    wavelength_flag: String,
    args: Vec<String>,
}

impl ExternalRenderer {
    pub fn new(executable: impl Into<PathBuf>, args: Vec<String>) -> Result<Self> {
        check_renderer_args(&args)?;
        Ok(Self {
            executable: executable.into(),
            wavelength_flag: "-l".to_string(),
            args,
        })
    }

    pub fn with_wavelength_flag(mut self, flag: impl Into<String>) -> Self {
        self.wavelength_flag = flag.into();
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl SpectralRenderer for ExternalRenderer {
    fn render(&self, wavelength: f64, output: &Path) -> Result<()> {
        let mut command = Command::new(&self.executable);
        command
            .arg(&self.wavelength_flag)
            .arg(wavelength.to_string())
            .args(&self.args)
            .arg(output);
        debug!(?command, "Invoking renderer");

        let status = command
            .status()
            .map_err(|source| SpectralError::RendererLaunch { wavelength, source })?;
        if !status.success() {
            return Err(SpectralError::RendererFailed { wavelength, status });
        }
        if !output.is_file() {
            return Err(SpectralError::MissingRenderOutput {
                wavelength,
                path: output.to_path_buf(),
            });
        }
        Ok(())
    }
}
