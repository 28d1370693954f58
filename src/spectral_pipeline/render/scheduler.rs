use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{info, instrument};

use crate::spectral_pipeline::common::error::{Result, SpectralError};
use crate::spectral_pipeline::render::renderer::SpectralRenderer;

/// Slice file for `wavelength` inside `dir`, e.g. `dir/550.exr`.
pub fn slice_path(dir: &Path, wavelength: f64, extension: &str) -> PathBuf {
    dir.join(format!("{}.{}", wavelength, extension))
}

/// Renders every wavelength into `dir`.
///
/// With `jobs == 1` invocations run one after another and the first failure
/// aborts the run. With more jobs they run on a pool of that size and all
/// failures are collected into [`SpectralError::RenderFailures`], ordered by
/// wavelength.
#[instrument(skip(renderer, wavelengths, dir), fields(count = wavelengths.len()))]
pub fn render_all<R: SpectralRenderer>(
    renderer: &R,
    wavelengths: &[f64],
    dir: &Path,
    extension: &str,
    jobs: usize,
) -> Result<Vec<PathBuf>> {
    let total = wavelengths.len();

    if jobs <= 1 {
        let mut paths = Vec::with_capacity(total);
        for (i, &wavelength) in wavelengths.iter().enumerate() {
            info!("Wavelength = {} nm, {}/{}", wavelength, i + 1, total);
            let path = slice_path(dir, wavelength, extension);
            renderer.render(wavelength, &path)?;
            paths.push(path);
        }
        return Ok(paths);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| SpectralError::Config(format!("failed to build render pool: {}", e)))?;

    let done = AtomicUsize::new(0);
    let results: Vec<Result<PathBuf>> = pool.install(|| {
        wavelengths
            .par_iter()
            .map(|&wavelength| {
                let path = slice_path(dir, wavelength, extension);
                let result = renderer.render(wavelength, &path).map(|_| path);
                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                info!("Wavelength = {} nm finished, {}/{}", wavelength, finished, total);
                result
            })
            .collect()
    });

    let mut paths = Vec::with_capacity(total);
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(path) => paths.push(path),
            Err(e) => failures.push(e),
        }
    }
    if !failures.is_empty() {
        return Err(SpectralError::RenderFailures(failures));
    }
    Ok(paths)
}
