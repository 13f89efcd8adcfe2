use std::f32::consts::TAU;

use glam::{Mat4, Vec3};
use umbra_engine::scene::Mesh;
use umbra_engine::shadow::FrameInputs;

/// A floor with a ring of pillars and a few crates around the origin.
pub fn build() -> Mesh {
    let mut mesh = Mesh::plane(Vec3::ZERO, 60.0);

    for i in 0..8 {
        let a = i as f32 / 8.0 * TAU;
        let base = Vec3::new(a.cos() * 25.0, 6.0, a.sin() * 25.0);
        mesh.append(&Mesh::cuboid(base, Vec3::new(1.5, 6.0, 1.5)));
    }

    let crates = [
        (Vec3::new(6.0, 1.0, 4.0), 1.0, 0.3),
        (Vec3::new(-8.0, 2.0, -3.0), 2.0, 1.1),
        (Vec3::new(2.0, 1.5, -10.0), 1.5, 2.4),
    ];
    for (center, half, yaw) in crates {
        let cube = Mesh::cuboid(Vec3::ZERO, Vec3::splat(half))
            .transformed(Mat4::from_translation(center) * Mat4::from_rotation_y(yaw));
        mesh.append(&cube);
    }
    mesh
}

/// Fixed camera looking down at the scene.
pub fn camera(viewport: [f32; 2]) -> FrameInputs {
    let aspect = viewport[0] / viewport[1].max(1.0);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 35.0, 55.0), Vec3::ZERO, Vec3::Y);
    let proj = Mat4::perspective_rh(60f32.to_radians(), aspect, 0.5, 400.0);
    FrameInputs { camera_view_proj: proj * view, camera_viewport: viewport }
}

/// Light position on its orbit at `frame` of `frames`.
pub fn light_position(frame: u32, frames: u32) -> Vec3 {
    let t = frame as f32 / frames.max(1) as f32 * TAU;
    Vec3::new(t.cos() * 12.0, 10.0, t.sin() * 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_has_floor_pillars_and_crates() {
        let mesh = build();
        // 2 floor triangles, 12 per box.
        assert_eq!(mesh.triangle_count(), 2 + 12 * (8 + 3));
    }

    #[test]
    fn light_orbits_at_constant_height() {
        let a = light_position(0, 4);
        let b = light_position(1, 4);
        assert_eq!(a.y, b.y);
        assert!((a.length() - b.length()).abs() < 1e-4);
        assert!(a.distance(b) > 1.0);
    }

    #[test]
    fn origin_is_on_screen() {
        let frame = camera([1280.0, 720.0]);
        let clip = frame.camera_view_proj * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1.0 && ndc.y.abs() < 1.0);
        assert!((0.0..1.0).contains(&ndc.z));
    }
}
