//! The fixed 16×16 linear map from a 4×4 sample grid to bicubic coefficients.
//!
//! Row `4*i + j` of [`FIT_MATRIX`] produces `m[i][j]`, the coefficient of
//! `r^i * s^j` (see [`CoeffMatrix`]). Column `4*row + col` weighs the sample at
//! grid cell `(row, col)`. The rationals are authoritative; they are kept as
//! literal fractions and evaluated in `f64`.
//!
//! The first row and first column of the output reproduce 1D cubic
//! interpolation through the four samples of grid row 0 / column 0. The mixed
//! terms do not form a tensor-product interpolant: the resulting surface
//! passes through 15 of the 16 samples, and at node `(3, 2)` it is off by
//! `19/6` times the third difference of column 0.

use crate::coeffs::{CoeffMatrix, PolynomialCoefficients};
use crate::samples::{SampleAxis, SampleGrid};

/// Number of grid samples consumed per channel.
pub const GRID_SAMPLES: usize = 16;

/// Fixed fit weights. `FIT_MATRIX[4*i + j][4*row + col]`.
#[rustfmt::skip]
pub const FIT_MATRIX: [[f64; GRID_SAMPLES]; GRID_SAMPLES] = [
    // m[0][0]
    [
        1.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 0.0,
    ],
    // m[0][1]
    [
        -11.0 / 6.0, 3.0, -3.0 / 2.0, 1.0 / 3.0,
        0.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 0.0,
    ],
    // m[0][2]
    [
        1.0, -5.0 / 2.0, 2.0, -1.0 / 2.0,
        0.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 0.0,
    ],
    // m[0][3]
    [
        -1.0 / 6.0, 1.0 / 2.0, -1.0 / 2.0, 1.0 / 6.0,
        0.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 0.0,
    ],
    // m[1][0]
    [
        -11.0 / 6.0, 0.0, 0.0, 0.0,
        3.0, 0.0, 0.0, 0.0,
        -3.0 / 2.0, 0.0, 0.0, 0.0,
        1.0 / 3.0, 0.0, 0.0, 0.0,
    ],
    // m[1][1]
    [
        89.0 / 18.0, -11.0 / 2.0, 11.0 / 4.0, -11.0 / 18.0,
        -41.0 / 4.0, 9.0, -9.0 / 2.0, 1.0,
        15.0 / 2.0, -9.0 / 2.0, 9.0 / 4.0, -1.0 / 2.0,
        -79.0 / 36.0, 1.0, -1.0 / 2.0, 1.0 / 9.0,
    ],
    // m[1][2]
    [
        -71.0 / 18.0, 55.0 / 12.0, -11.0 / 3.0, 11.0 / 12.0,
        28.0 / 3.0, -15.0 / 2.0, 6.0, -3.0 / 2.0,
        -47.0 / 6.0, 15.0 / 4.0, -3.0, 3.0 / 4.0,
        22.0 / 9.0, -5.0 / 6.0, 2.0 / 3.0, -1.0 / 6.0,
    ],
    // m[1][3]
    [
        5.0 / 6.0, -11.0 / 12.0, 11.0 / 12.0, -11.0 / 36.0,
        -25.0 / 12.0, 3.0 / 2.0, -3.0 / 2.0, 1.0 / 2.0,
        11.0 / 6.0, -3.0 / 4.0, 3.0 / 4.0, -1.0 / 4.0,
        -7.0 / 12.0, 1.0 / 6.0, -1.0 / 6.0, 1.0 / 18.0,
    ],
    // m[2][0]
    [
        1.0, 0.0, 0.0, 0.0,
        -5.0 / 2.0, 0.0, 0.0, 0.0,
        2.0, 0.0, 0.0, 0.0,
        -1.0 / 2.0, 0.0, 0.0, 0.0,
    ],
    // m[2][1]
    [
        -101.0 / 24.0, 3.0, -3.0 / 2.0, 1.0 / 3.0,
        281.0 / 24.0, -15.0 / 2.0, 15.0 / 4.0, -5.0 / 6.0,
        -259.0 / 24.0, 6.0, -3.0, 2.0 / 3.0,
        79.0 / 24.0, -3.0 / 2.0, 3.0 / 4.0, -1.0 / 6.0,
    ],
    // m[2][2]
    [
        25.0 / 6.0, -5.0 / 2.0, 2.0, -1.0 / 2.0,
        -12.0, 25.0 / 4.0, -5.0, 5.0 / 4.0,
        23.0 / 2.0, -5.0, 4.0, -1.0,
        -11.0 / 3.0, 5.0 / 4.0, -1.0, 1.0 / 4.0,
    ],
    // m[2][3]
    [
        -23.0 / 24.0, 1.0 / 2.0, -1.0 / 2.0, 1.0 / 6.0,
        67.0 / 24.0, -5.0 / 4.0, 5.0 / 4.0, -5.0 / 12.0,
        -65.0 / 24.0, 1.0, -1.0, 1.0 / 3.0,
        7.0 / 8.0, -1.0 / 4.0, 1.0 / 4.0, -1.0 / 12.0,
    ],
    // m[3][0]
    [
        -1.0 / 6.0, 0.0, 0.0, 0.0,
        1.0 / 2.0, 0.0, 0.0, 0.0,
        -1.0 / 2.0, 0.0, 0.0, 0.0,
        1.0 / 6.0, 0.0, 0.0, 0.0,
    ],
    // m[3][1]
    [
        79.0 / 72.0, -1.0 / 2.0, 1.0 / 4.0, -1.0 / 18.0,
        -79.0 / 24.0, 3.0 / 2.0, -3.0 / 4.0, 1.0 / 6.0,
        79.0 / 24.0, -3.0 / 2.0, 3.0 / 4.0, -1.0 / 6.0,
        -79.0 / 72.0, 1.0 / 2.0, -1.0 / 4.0, 1.0 / 18.0,
    ],
    // m[3][2]
    [
        -11.0 / 9.0, 5.0 / 12.0, -1.0 / 3.0, 1.0 / 12.0,
        11.0 / 3.0, -5.0 / 4.0, 1.0, -1.0 / 4.0,
        -11.0 / 3.0, 5.0 / 4.0, -1.0, 1.0 / 4.0,
        11.0 / 9.0, -5.0 / 12.0, 1.0 / 3.0, -1.0 / 12.0,
    ],
    // m[3][3]
    [
        7.0 / 24.0, -1.0 / 12.0, 1.0 / 12.0, -1.0 / 36.0,
        -7.0 / 8.0, 1.0 / 4.0, -1.0 / 4.0, 1.0 / 12.0,
        7.0 / 8.0, -1.0 / 4.0, 1.0 / 4.0, -1.0 / 12.0,
        -7.0 / 24.0, 1.0 / 12.0, -1.0 / 12.0, 1.0 / 36.0,
    ],
];

/// Fits one channel: an exact weighted sum of the 16 samples per output cell.
pub fn fit_channel(samples: &[f64; GRID_SAMPLES]) -> CoeffMatrix {
    let mut m = [[0.0f64; 4]; 4];
    for (cell, weights) in FIT_MATRIX.iter().enumerate() {
        m[cell / 4][cell % 4] = weights
            .iter()
            .zip(samples.iter())
            .map(|(w, z)| w * z)
            .sum();
    }
    CoeffMatrix::from_rows(m)
}

/// Fits both warp axes from a sampled 4×4 gradient grid.
///
/// The X and Y channel go through the same matrix with the same ordering.
pub fn fit(grid: &SampleGrid) -> PolynomialCoefficients {
    PolynomialCoefficients {
        x: fit_channel(&grid.channel(SampleAxis::X)),
        y: fit_channel(&grid.channel(SampleAxis::Y)),
    }
}

/// Fits directly from the 32-float interleaved readback (`x0, y0, x1, y1, ..`).
pub fn fit_interleaved(values: &[f32; 2 * GRID_SAMPLES]) -> PolynomialCoefficients {
    fit(&SampleGrid::from_interleaved(values))
}
