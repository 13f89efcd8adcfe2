use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// World-space position, the only attribute the shadow passes read.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Indexed triangle list, counter-clockwise seen from outside.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

// Corner `i` of a box: bit 0 = +x, bit 1 = +y, bit 2 = +z.
#[rustfmt::skip]
const BOX_FACES: [[u32; 4]; 6] = [
    [5, 1, 3, 7], // +x
    [0, 4, 6, 2], // -x
    [6, 7, 3, 2], // +y
    [0, 1, 5, 4], // -y
    [4, 5, 7, 6], // +z
    [1, 0, 2, 3], // -z
];

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Axis-aligned box.
    pub fn cuboid(center: Vec3, half_extents: Vec3) -> Self {
        let vertices = (0..8u32)
            .map(|i| {
                let sign = Vec3::new(
                    if i & 1 != 0 { 1.0 } else { -1.0 },
                    if i & 2 != 0 { 1.0 } else { -1.0 },
                    if i & 4 != 0 { 1.0 } else { -1.0 },
                );
                Vertex { position: (center + sign * half_extents).to_array() }
            })
            .collect();

        let mut indices = Vec::with_capacity(36);
        for [a, b, c, d] in BOX_FACES {
            indices.extend_from_slice(&[a, b, c, a, c, d]);
        }

        Self { vertices, indices }
    }

    /// Square in the XZ plane facing +Y.
    pub fn plane(center: Vec3, half_extent: f32) -> Self {
        let h = half_extent;
        let corners = [
            Vec3::new(-h, 0.0, -h),
            Vec3::new(h, 0.0, -h),
            Vec3::new(h, 0.0, h),
            Vec3::new(-h, 0.0, h),
        ];
        Self {
            vertices: corners
                .iter()
                .map(|c| Vertex { position: (center + *c).to_array() })
                .collect(),
            indices: vec![3, 2, 1, 3, 1, 0],
        }
    }

    /// Bakes `transform` into the positions.
    pub fn transformed(mut self, transform: Mat4) -> Self {
        for v in &mut self.vertices {
            v.position = transform.transform_point3(Vec3::from(v.position)).to_array();
        }
        self
    }

    /// Appends `other`, rebasing its indices.
    pub fn append(&mut self, other: &Mesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn triangle(&self, t: usize) -> [Vec3; 3] {
        let corner = |k: usize| Vec3::from(self.vertices[self.indices[3 * t + k] as usize].position);
        [corner(0), corner(1), corner(2)]
    }

    /// Outward (counter-clockwise) normal of triangle `t`, unnormalized.
    pub fn face_normal(&self, t: usize) -> Vec3 {
        let [a, b, c] = self.triangle(t);
        (b - a).cross(c - a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_faces_point_outward() {
        let center = Vec3::new(1.0, 2.0, -3.0);
        let mesh = Mesh::cuboid(center, Vec3::new(0.5, 1.0, 2.0));
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.triangle_count(), 12);
        for t in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.triangle(t);
            let centroid = (a + b + c) / 3.0;
            assert!(mesh.face_normal(t).dot(centroid - center) > 0.0, "triangle {t} faces inward");
        }
    }

    #[test]
    fn plane_faces_up() {
        let mesh = Mesh::plane(Vec3::ZERO, 10.0);
        for t in 0..mesh.triangle_count() {
            assert!(mesh.face_normal(t).y > 0.0);
        }
    }

    #[test]
    fn append_rebases_indices() {
        let mut scene = Mesh::plane(Vec3::ZERO, 1.0);
        scene.append(&Mesh::cuboid(Vec3::ZERO, Vec3::ONE));
        assert_eq!(scene.vertices.len(), 12);
        assert_eq!(scene.triangle_count(), 14);
        assert!(scene.indices[6..].iter().all(|i| *i >= 4 && *i < 12));
    }

    #[test]
    fn transform_is_baked() {
        let mesh = Mesh::plane(Vec3::ZERO, 1.0).transformed(Mat4::from_translation(Vec3::Y * 2.0));
        assert!(mesh.vertices.iter().all(|v| v.position[1] == 2.0));
    }
}
