use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, ValueEnum};

use spectral_rgb_rs::logger;
use spectral_rgb_rs::spectral_pipeline::{
    Container, ExternalRenderer, PipelineConfig, Quantization, SpectralToRgbPipeline,
    TiffCompression, WavelengthRange,
};

use tracing::{debug, info};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ContainerArg {
    /// <output>.exr and <output>.png
    Exr,
    /// <output>.tiff and <output>_ldr.tiff
    Tiff,
}

impl From<ContainerArg> for Container {
    fn from(arg: ContainerArg) -> Self {
        match arg {
            ContainerArg::Exr => Container::ExrPng,
            ContainerArg::Tiff => Container::Tiff,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompressionArg {
    #[value(name = "none")]
    Uncompressed,
    Lzw,
    DeflateFast,
    DeflateBalanced,
    DeflateBest,
}

impl From<CompressionArg> for TiffCompression {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::Uncompressed => TiffCompression::None,
            CompressionArg::Lzw => TiffCompression::Lzw,
            CompressionArg::DeflateFast => TiffCompression::DeflateFast,
            CompressionArg::DeflateBalanced => TiffCompression::DeflateBalanced,
            CompressionArg::DeflateBest => TiffCompression::DeflateBest,
        }
    }
}

/// Looked up next to the `render_rgb` executable unless given explicitly.
const DEFAULT_CMF: &str = "lin2012xyz2e_1_7sf.csv";
const DEFAULT_RENDERER: &str = "../build/skytracer";

#[derive(Parser, Debug)]
#[command(name = "render_rgb", disable_help_flag = true)]
#[command(about = "Compute an sRGB image (EXR and PNG) using uniform spectral sampling.")]
#[command(after_help = "All arguments that are not listed here are passed directly to the \
renderer executable, so every renderer parameter can be set from this command line.")]
struct Cli {
    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Output image path without extension
    #[arg(long, default_value = "out")]
    output: PathBuf,

    /// Path to the renderer executable [default: ../build/skytracer next to this program]
    #[arg(long = "exec")]
    executable: Option<PathBuf>,

    /// CSV file with the tabulated CIE color matching functions
    /// [default: lin2012xyz2e_1_7sf.csv next to this program]
    #[arg(long)]
    cmf: Option<PathBuf>,

    /// Left bound of the wavelength interval to sample (nm, inclusive)
    #[arg(long, default_value_t = 390)]
    begin: u32,

    /// Right bound of the wavelength interval to sample (nm, exclusive)
    #[arg(long, default_value_t = 781)]
    end: u32,

    /// Step size for the wavelength interval (nm)
    #[arg(long, default_value_t = 10)]
    step: u32,

    /// Exposure setting for the tonemapper
    #[arg(long, default_value_t = 0.05)]
    exposure: f64,

    /// Renderer invocations to run at once
    #[arg(long, default_value_t = 1)]
    jobs: usize,

    /// Round to the nearest 8-bit code instead of truncating
    #[arg(long)]
    round: bool,

    /// Output file pair
    #[arg(long, value_enum, default_value = "exr")]
    container: ContainerArg,

    /// Compression of the TIFF container
    #[arg(long, value_enum, default_value = "none")]
    tiff_compression: CompressionArg,

    /// Horizontal differencing predictor for the 8-bit TIFF
    #[arg(long)]
    tiff_predictor: bool,

    /// Render slices into this directory and keep them
    #[arg(long, value_name = "DIR")]
    keep_slices: Option<PathBuf>,

    /// Skip rendering and convert the slices already in this directory
    #[arg(long, value_name = "DIR")]
    from_slices: Option<PathBuf>,

    /// Debug logging
    #[arg(long)]
    verbose: bool,
}

/// Splits the command line into arguments this tool knows and arguments
/// forwarded to the renderer, keeping the relative order of each.
fn split_known_args(args: impl IntoIterator<Item = OsString>) -> (Vec<OsString>, Vec<String>) {
    let command = Cli::command();
    let mut args = args.into_iter();
    let mut known: Vec<OsString> = args.next().into_iter().collect();
    let mut forwarded = Vec::new();

    while let Some(arg) = args.next() {
        let text = arg.to_string_lossy().into_owned();
        let name = text
            .strip_prefix("--")
            .map(|rest| rest.split_once('=').map_or(rest, |(name, _)| name));
        let matched = name.and_then(|name| {
            command
                .get_arguments()
                .find(|a| a.get_long() == Some(name))
        });

        match matched {
            Some(known_arg) => {
                let takes_value = known_arg.get_action().takes_values() && !text.contains('=');
                known.push(arg);
                if takes_value {
                    known.extend(args.next());
                }
            }
            None => forwarded.push(text),
        }
    }
    (known, forwarded)
}

/// `explicit` if given, otherwise `default` resolved against `base`.
fn resolve_default(explicit: Option<&Path>, base: &Path, default: &str) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => base.join(default),
    }
}

fn program_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot locate the render_rgb executable")?;
    Ok(exe.parent().map(Path::to_path_buf).unwrap_or_default())
}

fn main() -> Result<()> {
    let (known, renderer_args) = split_known_args(std::env::args_os());
    let cli = Cli::parse_from(known);

    logger::init(if cli.verbose { "debug" } else { "info" });
    debug!(?cli, ?renderer_args, "Parsed command line");

    let base = program_dir()?;
    let executable = resolve_default(cli.executable.as_deref(), &base, DEFAULT_RENDERER);
    let cmf = resolve_default(cli.cmf.as_deref(), &base, DEFAULT_CMF);

    let renderer = ExternalRenderer::new(&executable, renderer_args)
        .context("refusing to run the renderer")?;

    let config = PipelineConfig::builder()
        .output_base(&cli.output)
        .cmf_path(cmf)
        .wavelengths(WavelengthRange::new(cli.begin, cli.end, cli.step))
        .exposure(cli.exposure)
        .jobs(cli.jobs)
        .quantization(if cli.round {
            Quantization::Round
        } else {
            Quantization::Truncate
        })
        .container(cli.container.into())
        .tiff_compression(cli.tiff_compression.into())
        .tiff_predictor(cli.tiff_predictor.then_some(2))
        .keep_slices(cli.keep_slices.clone())
        .build();
    config.validate().context("invalid configuration")?;

    let pipeline = SpectralToRgbPipeline::new(config, renderer);

    let (paths, timings) = match &cli.from_slices {
        Some(dir) => {
            info!("Converting existing slices in {}", dir.display());
            pipeline
                .convert_directory_with_timings(dir)
                .with_context(|| format!("failed to convert slices in {}", dir.display()))?
        }
        None => {
            info!(
                "Rendering {} wavelengths with {}",
                pipeline.config().wavelengths.len(),
                executable.display()
            );
            pipeline.run_with_timings().context("spectral rendering failed")?
        }
    };

    timings.log_summary();
    info!("Done: {} and {}", paths.hdr.display(), paths.ldr.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(args: &[&str]) -> (Vec<OsString>, Vec<String>) {
        split_known_args(args.iter().map(OsString::from))
    }

    #[test]
    fn test_unknown_arguments_are_forwarded() {
        let (known, forwarded) = split(&[
            "render_rgb", "-w", "64", "--exposure", "0.1", "--turbidity=3", "--output=sky", "-h", "32",
        ]);
        assert_eq!(known, vec!["render_rgb", "--exposure", "0.1", "--output=sky"]);
        assert_eq!(forwarded, vec!["-w", "64", "--turbidity=3", "-h", "32"]);

        let cli = Cli::parse_from(known);
        assert_eq!(cli.exposure, 0.1);
        assert_eq!(cli.output, PathBuf::from("sky"));
        assert_eq!(cli.begin, 390);
    }

    #[test]
    fn test_flags_without_values() {
        let (known, forwarded) = split(&["render_rgb", "--round", "--verbose", "--samples", "8"]);
        assert_eq!(forwarded, vec!["--samples", "8"]);

        let cli = Cli::parse_from(known);
        assert!(cli.round);
        assert!(cli.verbose);
        assert!(matches!(cli.container, ContainerArg::Exr));
    }

    #[test]
    fn test_tiff_flags() {
        let (known, forwarded) = split(&[
            "render_rgb", "--container", "tiff", "--tiff-compression", "lzw", "--tiff-predictor",
        ]);
        assert!(forwarded.is_empty());

        let cli = Cli::parse_from(known);
        assert!(matches!(cli.container, ContainerArg::Tiff));
        assert_eq!(TiffCompression::from(cli.tiff_compression), TiffCompression::Lzw);
        assert!(cli.tiff_predictor);
    }

    #[test]
    fn test_default_paths_resolve_next_to_program() {
        let cli = Cli::parse_from(["render_rgb"]);
        let base = Path::new("/opt/sky/bin");

        assert_eq!(
            resolve_default(cli.cmf.as_deref(), base, DEFAULT_CMF),
            PathBuf::from("/opt/sky/bin/lin2012xyz2e_1_7sf.csv")
        );
        assert_eq!(
            resolve_default(cli.executable.as_deref(), base, DEFAULT_RENDERER),
            PathBuf::from("/opt/sky/bin/../build/skytracer")
        );

        let cli = Cli::parse_from(["render_rgb", "--cmf", "data/cmf.csv", "--exec=./tracer"]);
        assert_eq!(
            resolve_default(cli.cmf.as_deref(), base, DEFAULT_CMF),
            PathBuf::from("data/cmf.csv")
        );
        assert_eq!(
            resolve_default(cli.executable.as_deref(), base, DEFAULT_RENDERER),
            PathBuf::from("./tracer")
        );
    }

    #[test]
    fn test_forbidden_argument_is_forwarded_then_rejected() {
        let (_, forwarded) = split(&["render_rgb", "--list-aerosol-types"]);
        assert!(ExternalRenderer::new("skytracer", forwarded).is_err());
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }
}
