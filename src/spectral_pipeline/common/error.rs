use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpectralError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Renderer argument {0} disables image output and cannot be used here")]
    ForbiddenRendererArgument(String),

    #[error("Failed to launch renderer for wavelength {wavelength} nm: {source}")]
    RendererLaunch {
        wavelength: f64,
        #[source]
        source: std::io::Error,
    },

    #[error("Renderer failed for wavelength {wavelength} nm ({status})")]
    RendererFailed { wavelength: f64, status: ExitStatus },

    #[error("Renderer produced no output for wavelength {wavelength} nm (expected {})", .path.display())]
    MissingRenderOutput { wavelength: f64, path: PathBuf },

    #[error("{} wavelength(s) failed to render: {}", .0.len(), join_errors(.0))]
    RenderFailures(Vec<SpectralError>),

    #[error("Image {} is {}x{}, expected {}x{} like the rest of the stack", .path.display(), .actual.0, .actual.1, .expected.0, .expected.1)]
    DimensionMismatch {
        path: PathBuf,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Cannot parse a wavelength from file name {}", .0.display())]
    InvalidFilename(PathBuf),

    #[error("Wavelength {0} nm appears more than once")]
    DuplicateWavelength(f64),

    #[error("No spectral slices found in {}", .0.display())]
    EmptyStack(PathBuf),

    #[error("Malformed CMF table at line {line}: {reason}")]
    MalformedCmf { line: u64, reason: String },

    #[error("CMF wavelengths must be strictly increasing: line {line} has {current} after {previous}")]
    NonMonotonicCmf { line: u64, previous: f64, current: f64 },

    #[error("{what} needs at least {required} samples, got {actual}")]
    TooFewSamples {
        what: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("CMF wavelengths do not match the stack wavelengths: {0}")]
    WavelengthMismatch(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_errors(errors: &[SpectralError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, SpectralError>;
