//! Common utilities module
//!
//! This module contains the error type and the image buffers shared across
//! the spectral pipeline.

pub mod error;
pub mod types;

pub use error::{SpectralError, Result};
pub use types::{TristimulusImage, LdrImage};
