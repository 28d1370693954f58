//! Color matching function tables
//!
//! This module provides the CMF table type, loading from delimited text and
//! spline resampling onto arbitrary wavelength grids.

mod csv_loader;
mod resample;
pub mod types;

pub use csv_loader::{load_cmf_csv, parse_cmf_csv};
pub use resample::{CubicSpline, resample_cmf, MIN_SPLINE_POINTS};
pub use types::{CmfRow, CmfTable};
