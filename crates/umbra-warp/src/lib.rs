//! Numerical core of the warped paraboloid shadow pipeline.
//!
//! This crate has no dependencies and no GPU code, so the warp fit can be
//! checked on the CPU against the values a GPU readback would produce.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`fitter`] | `FIT_MATRIX`, `fit`, `fit_channel` |
//! | [`coeffs`] | `CoeffMatrix`, `PolynomialCoefficients` |
//! | [`samples`] | `SampleGrid`, `SampleAxis` |
//! | [`grid`] | `ControlGrid`, `GridRange`, canonical layout |
//! | [`coverage`] | `CoverageTable`, `COVERAGE` |
//! | [`error`] | `SampleGridError` |
//!
//! # Quick start
//!
//! ```rust
//! use umbra_warp::{SampleGrid, fit};
//!
//! let readback = [0.0f32; 32];
//! let grid = SampleGrid::try_from_slice(&readback).unwrap();
//! let coeffs = fit(&grid);
//! assert!(coeffs.is_identity());
//! assert_eq!(coeffs.warp_ndc([0.5, -0.25], 1.0), [0.5, -0.25]);
//! ```

pub mod coeffs;
pub mod coverage;
pub mod error;
pub mod fitter;
pub mod grid;
pub mod samples;

pub use coeffs::{CoeffMatrix, PolynomialCoefficients};
pub use coverage::CoverageTable;
pub use error::SampleGridError;
pub use fitter::{fit, fit_channel, fit_interleaved};
pub use grid::{ControlGrid, GridRange};
pub use samples::{SampleAxis, SampleGrid};
