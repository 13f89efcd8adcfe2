//! The 4×4 two-channel grid read back from the GPU.

use crate::error::SampleGridError;
use crate::fitter::GRID_SAMPLES;

/// Which warp axis a channel feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleAxis {
    X,
    Y,
}

/// 16 `[x, y]` gradient samples, row-major over the 4×4 grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleGrid {
    samples: [[f32; 2]; GRID_SAMPLES],
}

impl SampleGrid {
    pub const INTERLEAVED_LEN: usize = 2 * GRID_SAMPLES;

    pub const fn zero() -> Self {
        Self { samples: [[0.0; 2]; GRID_SAMPLES] }
    }

    pub fn from_samples(samples: [[f32; 2]; GRID_SAMPLES]) -> Self {
        Self { samples }
    }

    /// Builds the grid from `x0, y0, x1, y1, ..`.
    pub fn from_interleaved(values: &[f32; 2 * GRID_SAMPLES]) -> Self {
        let mut samples = [[0.0; 2]; GRID_SAMPLES];
        for (k, pair) in values.chunks_exact(2).enumerate() {
            samples[k] = [pair[0], pair[1]];
        }
        Self { samples }
    }

    /// Like [`SampleGrid::from_interleaved`] for a slice of unknown length.
    pub fn try_from_slice(values: &[f32]) -> Result<Self, SampleGridError> {
        let fixed: &[f32; 2 * GRID_SAMPLES] = values.try_into().map_err(|_| SampleGridError {
            expected: Self::INTERLEAVED_LEN,
            found: values.len(),
        })?;
        Ok(Self::from_interleaved(fixed))
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> [f32; 2] {
        self.samples[4 * row + col]
    }

    pub fn samples(&self) -> &[[f32; 2]; GRID_SAMPLES] {
        &self.samples
    }

    /// One channel widened to `f64`, in the same row-major order for both axes.
    pub fn channel(&self, axis: SampleAxis) -> [f64; GRID_SAMPLES] {
        let c = match axis {
            SampleAxis::X => 0,
            SampleAxis::Y => 1,
        };
        let mut out = [0.0; GRID_SAMPLES];
        for (o, s) in out.iter_mut().zip(self.samples.iter()) {
            *o = f64::from(s[c]);
        }
        out
    }
}

impl Default for SampleGrid {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Vec<f32> {
        (0..32).map(|k| k as f32).collect()
    }

    #[test]
    fn interleaved_layout_is_row_major() {
        let g = SampleGrid::try_from_slice(&ramp()).unwrap();
        assert_eq!(g.get(0, 0), [0.0, 1.0]);
        assert_eq!(g.get(0, 1), [2.0, 3.0]);
        assert_eq!(g.get(1, 0), [8.0, 9.0]);
        assert_eq!(g.get(3, 3), [30.0, 31.0]);
    }

    #[test]
    fn channels_share_ordering() {
        let g = SampleGrid::try_from_slice(&ramp()).unwrap();
        let x = g.channel(SampleAxis::X);
        let y = g.channel(SampleAxis::Y);
        for k in 0..GRID_SAMPLES {
            assert_eq!(y[k], x[k] + 1.0);
        }
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = SampleGrid::try_from_slice(&[0.0; 30]).unwrap_err();
        assert_eq!(err, SampleGridError { expected: 32, found: 30 });
        assert!(err.to_string().contains("32"));
        assert!(SampleGrid::try_from_slice(&[0.0; 33]).is_err());
    }
}
