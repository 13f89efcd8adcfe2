//! Bicubic warp coefficients and their evaluation.

/// 4×4 coefficients of a bicubic polynomial over the unit square.
///
/// `m[i][j]` multiplies `r^i * s^j` with `s = 3u` and `r = 3v`, so grid node
/// `(row, col)` of the 4×4 sampling sits at `(u, v) = (col / 3, row / 3)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoeffMatrix {
    m: [[f64; 4]; 4],
}

impl CoeffMatrix {
    pub const fn zero() -> Self {
        Self { m: [[0.0; 4]; 4] }
    }

    pub const fn from_rows(m: [[f64; 4]; 4]) -> Self {
        Self { m }
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.m[i][j]
    }

    pub fn rows(&self) -> &[[f64; 4]; 4] {
        &self.m
    }

    pub fn is_zero(&self) -> bool {
        self.m.iter().flatten().all(|c| *c == 0.0)
    }

    /// Evaluates `P(u, v)`. Horner in both variables.
    pub fn evaluate(&self, u: f64, v: f64) -> f64 {
        let s = 3.0 * u;
        let r = 3.0 * v;
        self.m.iter().rev().fold(0.0, |acc, row| {
            let inner = row.iter().rev().fold(0.0, |a, c| a * s + c);
            acc * r + inner
        })
    }

    /// Column-major 4×4 as uploaded to shaders (`out[j][i] = m[i][j]`).
    ///
    /// Read as a WGSL `mat4x4<f32>`, the polynomial is `dot(M * xbasis, ybasis)` where
    /// `xbasis = (1, s, s², s³)` and `ybasis = (1, r, r², r³)`.
    pub fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        let mut out = [[0.0f32; 4]; 4];
        for (i, row) in self.m.iter().enumerate() {
            for (j, c) in row.iter().enumerate() {
                out[j][i] = *c as f32;
            }
        }
        out
    }
}

impl Default for CoeffMatrix {
    fn default() -> Self {
        Self::zero()
    }
}

/// Coefficients for both warp axes of one light.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolynomialCoefficients {
    pub x: CoeffMatrix,
    pub y: CoeffMatrix,
}

impl PolynomialCoefficients {
    /// All-zero coefficients. Evaluates to no displacement anywhere.
    pub const fn identity() -> Self {
        Self { x: CoeffMatrix::zero(), y: CoeffMatrix::zero() }
    }

    pub fn is_identity(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    /// `(Px(u, v), Py(u, v))` at parameter `(u, v)` in `[0, 1]²`.
    pub fn displacement(&self, u: f64, v: f64) -> (f64, f64) {
        (self.x.evaluate(u, v), self.y.evaluate(u, v))
    }

    /// Warps a paraboloid NDC position in `[-1, 1]²`.
    ///
    /// `t = ndc * (0.5, -0.5) + 0.5` is the texture-space parameter, it is
    /// offset by `strength * P(t)` and mapped back to NDC.
    pub fn warp_ndc(&self, ndc: [f64; 2], strength: f64) -> [f64; 2] {
        let u = ndc[0] * 0.5 + 0.5;
        let v = ndc[1] * -0.5 + 0.5;
        let (dx, dy) = self.displacement(u, v);
        let u2 = u + strength * dx;
        let v2 = v + strength * dy;
        [(u2 - 0.5) * 2.0, (v2 - 0.5) * -2.0]
    }

    /// Samples the warped parameter space on an `n × n` lattice over `[0, 1]²`.
    ///
    /// Row-major by `v`; each entry is the displaced `(u, v)`. Useful for
    /// drawing a debug overlay of the warp. `n < 2` yields the single corner.
    pub fn warp_grid(&self, n: usize, strength: f64) -> Vec<[f64; 2]> {
        if n < 2 {
            let (dx, dy) = self.displacement(0.0, 0.0);
            return vec![[strength * dx, strength * dy]];
        }
        let step = 1.0 / (n - 1) as f64;
        let mut out = Vec::with_capacity(n * n);
        for b in 0..n {
            for a in 0..n {
                let (u, v) = (a as f64 * step, b as f64 * step);
                let (dx, dy) = self.displacement(u, v);
                out.push([u + strength * dx, v + strength * dy]);
            }
        }
        out
    }
}
