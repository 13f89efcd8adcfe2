//! The 16 control points that sample the error field.
//!
//! Points live in a 128×128 reference viewport and are stored two per texel in
//! an 8×1 RGBA texture, in the order of [`CANONICAL_POINTS`]. That order is not
//! row-major over the 4×4 grid; [`grid_cell`] and [`point_index`] convert.

use crate::fitter::GRID_SAMPLES;

/// Side of the reference viewport the points are expressed in.
pub const REFERENCE_SIZE: f32 = 128.0;

/// Texels in the control-point texture (two points each).
pub const GRID_TEXELS: usize = GRID_SAMPLES / 2;

/// Start-of-frame layout, in storage order.
#[rustfmt::skip]
pub const CANONICAL_POINTS: [[f32; 2]; GRID_SAMPLES] = [
    [41.0, 11.0], [41.0, 31.0],
    [55.0, 11.0], [55.0, 31.0],
    [69.0, 11.0], [69.0, 31.0],
    [83.0, 11.0], [83.0, 31.0],
    [41.0, 21.0], [41.0, 41.0],
    [55.0, 21.0], [55.0, 41.0],
    [69.0, 21.0], [69.0, 41.0],
    [83.0, 21.0], [83.0, 41.0],
];

/// Grid cell `(row, col)` of stored point `p`.
pub const fn grid_cell(p: usize) -> (usize, usize) {
    let t = p / 2;
    let h = p % 2;
    (t / 4 + 2 * h, t % 4)
}

/// Inverse of [`grid_cell`].
pub const fn point_index(row: usize, col: usize) -> usize {
    2 * (col + 4 * (row % 2)) + row / 2
}

/// Regular lattice covering the canonical points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridRange {
    pub origin_y: f32,
    pub step_y: f32,
    pub origin_x: f32,
    pub step_x: f32,
}

impl GridRange {
    pub const CANONICAL: GridRange = GridRange { origin_y: 11.0, step_y: 10.0, origin_x: 41.0, step_x: 14.0 };

    /// `[x, y]` of lattice node `(row, col)`.
    pub fn node(&self, row: usize, col: usize) -> [f32; 2] {
        [
            self.origin_x + self.step_x * col as f32,
            self.origin_y + self.step_y * row as f32,
        ]
    }

    /// Packed as `(origin_y, step_y, origin_x, step_x)`.
    pub fn to_vec4(&self) -> [f32; 4] {
        [self.origin_y, self.step_y, self.origin_x, self.step_x]
    }
}

impl Default for GridRange {
    fn default() -> Self {
        Self::CANONICAL
    }
}

/// CPU mirror of the control-point texture.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlGrid {
    canonical: [[f32; 2]; GRID_SAMPLES],
    points: [[f32; 2]; GRID_SAMPLES],
}

impl ControlGrid {
    pub fn new(canonical: [[f32; 2]; GRID_SAMPLES]) -> Self {
        Self { canonical, points: canonical }
    }

    pub fn canonical(&self) -> &[[f32; 2]; GRID_SAMPLES] {
        &self.canonical
    }

    /// Points in storage order.
    pub fn points(&self) -> &[[f32; 2]; GRID_SAMPLES] {
        &self.points
    }

    pub fn reset(&mut self) {
        self.points = self.canonical;
    }

    /// Point at grid cell `(row, col)`.
    pub fn at(&self, row: usize, col: usize) -> [f32; 2] {
        self.points[point_index(row, col)]
    }

    /// Points reordered row-major over the 4×4 grid.
    pub fn cell_positions(&self) -> [[f32; 2]; GRID_SAMPLES] {
        let mut out = [[0.0; 2]; GRID_SAMPLES];
        for (p, point) in self.points.iter().enumerate() {
            let (row, col) = grid_cell(p);
            out[4 * row + col] = *point;
        }
        out
    }

    /// Texture payload: texel `t` holds points `2t` and `2t + 1` as `xyzw`.
    pub fn to_texels(&self) -> [[f32; 4]; GRID_TEXELS] {
        let mut out = [[0.0; 4]; GRID_TEXELS];
        for (t, texel) in out.iter_mut().enumerate() {
            let a = self.points[2 * t];
            let b = self.points[2 * t + 1];
            *texel = [a[0], a[1], b[0], b[1]];
        }
        out
    }

    pub fn set_from_texels(&mut self, texels: &[[f32; 4]; GRID_TEXELS]) {
        for (t, texel) in texels.iter().enumerate() {
            self.points[2 * t] = [texel[0], texel[1]];
            self.points[2 * t + 1] = [texel[2], texel[3]];
        }
    }

    /// One relaxation step: `p += step * gradient(p)`, clamped to the viewport.
    ///
    /// Same rule as the GPU relax pass; `gradient` receives reference-space
    /// coordinates.
    pub fn relax_with<F>(&mut self, mut gradient: F, step: f32)
    where
        F: FnMut([f32; 2]) -> [f32; 2],
    {
        for point in &mut self.points {
            let g = gradient(*point);
            *point = [
                clamp_to_viewport(point[0] + step * g[0]),
                clamp_to_viewport(point[1] + step * g[1]),
            ];
        }
    }
}

impl Default for ControlGrid {
    fn default() -> Self {
        Self::new(CANONICAL_POINTS)
    }
}

fn clamp_to_viewport(v: f32) -> f32 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, REFERENCE_SIZE - 1.0)
}
