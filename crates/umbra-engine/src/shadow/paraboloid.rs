//! Dual-paraboloid projection on the CPU.
//!
//! Mirrors the vertex stage of the shadow shaders so lookups and tests can
//! be done without a device. A hemisphere view looks down its `-Z`; a
//! direction at angle `θ` from that axis lands at radius `tan(θ / 2)`.

use glam::{Mat4, Vec2, Vec3};
use umbra_warp::PolynomialCoefficients;

/// One half of the dual-paraboloid map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hemisphere {
    /// Layer 0, facing `+axis`.
    PositiveX,
    /// Layer 1, facing `-axis`.
    NegativeX,
}

impl Hemisphere {
    pub const BOTH: [Hemisphere; 2] = [Hemisphere::PositiveX, Hemisphere::NegativeX];

    /// Array layer of this hemisphere in the shadow targets.
    #[inline]
    pub fn layer(self) -> u32 {
        match self {
            Hemisphere::PositiveX => 0,
            Hemisphere::NegativeX => 1,
        }
    }

    pub fn from_layer(layer: u32) -> Option<Self> {
        match layer {
            0 => Some(Hemisphere::PositiveX),
            1 => Some(Hemisphere::NegativeX),
            _ => None,
        }
    }

    fn sign(self) -> f32 {
        match self {
            Hemisphere::PositiveX => 1.0,
            Hemisphere::NegativeX => -1.0,
        }
    }
}

/// `look_at(pos, pos + far * (±axis), up)` for both hemispheres.
///
/// `up` is `+Y` unless `axis` is (nearly) vertical, then `+Z`.
pub fn hemisphere_views_along(position: Vec3, axis: Vec3, far: f32) -> [Mat4; 2] {
    let axis = axis.try_normalize().unwrap_or(Vec3::X);
    let up = if axis.y.abs() > 0.999 { Vec3::Z } else { Vec3::Y };
    Hemisphere::BOTH.map(|h| Mat4::look_at_rh(position, position + far * h.sign() * axis, up))
}

/// Hemisphere views facing `+X` (layer 0) and `-X` (layer 1).
pub fn hemisphere_views(position: Vec3, far: f32) -> [Mat4; 2] {
    hemisphere_views_along(position, Vec3::X, far)
}

/// A world point in one hemisphere's paraboloid space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParaboloidPoint {
    /// Unwarped position in `[-1, 1]²` for the front hemisphere.
    pub ndc: Vec2,
    /// `(distance - near) / (far - near)`.
    pub depth: f32,
    /// Cosine between the view axis and the direction to the point.
    /// Negative behind the paraboloid.
    pub cosine: f32,
}

pub fn project(view: Mat4, near_far: [f32; 2], world: Vec3) -> ParaboloidPoint {
    let p = view.transform_point3(world);
    let len = p.length();
    let [near, far] = near_far;
    let depth = (len - near) / (far - near);
    if len <= f32::EPSILON {
        return ParaboloidPoint { ndc: Vec2::ZERO, depth, cosine: 1.0 };
    }
    let n = p / len;
    let cosine = -n.z;
    let ndc = Vec2::new(n.x, n.y) / (1.0 + cosine).max(1e-4);
    ParaboloidPoint { ndc, depth, cosine }
}

/// Where a world point lands in the warped shadow map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowLookup {
    pub hemisphere: Hemisphere,
    /// Texture coordinate after the warp.
    pub uv: Vec2,
    pub depth: f32,
}

/// Reference for the lighting-side lookup: pick the hemisphere, project,
/// warp with the same coefficients the depth pass used.
pub fn shadow_lookup(
    views: &[Mat4; 2],
    coefficients: &PolynomialCoefficients,
    strength: f32,
    near_far: [f32; 2],
    world: Vec3,
) -> ShadowLookup {
    let front = project(views[0], near_far, world);
    let (hemisphere, point) = if front.cosine >= 0.0 {
        (Hemisphere::PositiveX, front)
    } else {
        (Hemisphere::NegativeX, project(views[1], near_far, world))
    };

    let warped = coefficients.warp_ndc(
        [f64::from(point.ndc.x), f64::from(point.ndc.y)],
        f64::from(strength),
    );
    let uv = Vec2::new(
        (warped[0] * 0.5 + 0.5) as f32,
        (warped[1] * -0.5 + 0.5) as f32,
    );

    ShadowLookup { hemisphere, uv, depth: point.depth }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_warp::CoeffMatrix;

    const NEAR_FAR: [f32; 2] = [1.0, 1000.0];

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    // ── views ─────────────────────────────────────────────────────────────

    #[test]
    fn hemispheres_face_opposite_directions() {
        let pos = Vec3::new(0.0, 5.0, 0.0);
        let views = hemisphere_views(pos, 1000.0);
        let ahead = project(views[0], NEAR_FAR, pos + Vec3::X * 10.0);
        let behind = project(views[1], NEAR_FAR, pos + Vec3::X * 10.0);
        assert!(approx(ahead.cosine, 1.0));
        assert!(approx(behind.cosine, -1.0));
        assert!(ahead.ndc.length() < 1e-5);
    }

    #[test]
    fn vertical_axis_gets_fallback_up() {
        let views = hemisphere_views_along(Vec3::ZERO, Vec3::Y, 100.0);
        let p = project(views[0], NEAR_FAR, Vec3::new(0.0, 10.0, 0.0));
        assert!(approx(p.cosine, 1.0));
        assert!(views[0].is_finite());
    }

    // ── projection ────────────────────────────────────────────────────────

    #[test]
    fn angle_maps_to_half_angle_tangent() {
        let views = hemisphere_views(Vec3::ZERO, 1000.0);
        let p = project(views[0], NEAR_FAR, Vec3::new(1.0, 1.0, 0.0));
        assert!(approx(p.ndc.x, 0.0));
        assert!(approx(p.ndc.y, (std::f32::consts::FRAC_PI_8).tan()));
        assert!(approx(p.cosine, std::f32::consts::FRAC_1_SQRT_2));
    }

    #[test]
    fn depth_is_linear_in_distance() {
        let views = hemisphere_views(Vec3::ZERO, 1000.0);
        let p = project(views[0], NEAR_FAR, Vec3::new(500.5, 0.0, 0.0));
        assert!(approx(p.depth, 0.5));
    }

    // ── lookup ────────────────────────────────────────────────────────────

    #[test]
    fn lookup_selects_hemisphere_by_side() {
        let views = hemisphere_views(Vec3::ZERO, 1000.0);
        let id = PolynomialCoefficients::identity();
        let front = shadow_lookup(&views, &id, 1.0, NEAR_FAR, Vec3::new(3.0, 0.0, 0.0));
        let back = shadow_lookup(&views, &id, 1.0, NEAR_FAR, Vec3::new(-3.0, 0.0, 0.0));
        assert_eq!(front.hemisphere, Hemisphere::PositiveX);
        assert_eq!(back.hemisphere, Hemisphere::NegativeX);
        assert!(approx(front.uv.x, 0.5) && approx(front.uv.y, 0.5));
        assert!(approx(back.uv.x, 0.5) && approx(back.uv.y, 0.5));
    }

    #[test]
    fn lookup_up_is_top_of_texture() {
        let views = hemisphere_views(Vec3::ZERO, 1000.0);
        let id = PolynomialCoefficients::identity();
        let l = shadow_lookup(&views, &id, 1.0, NEAR_FAR, Vec3::new(1.0, 1.0, 0.0));
        assert!(l.uv.y < 0.5);
    }

    #[test]
    fn lookup_applies_warp() {
        let views = hemisphere_views(Vec3::ZERO, 1000.0);
        let mut x = [[0.0; 4]; 4];
        x[0][0] = 0.125;
        let coeffs = PolynomialCoefficients { x: CoeffMatrix::from_rows(x), y: CoeffMatrix::zero() };
        let l = shadow_lookup(&views, &coeffs, 1.0, NEAR_FAR, Vec3::new(3.0, 0.0, 0.0));
        assert!(approx(l.uv.x, 0.625));
        assert!(approx(l.uv.y, 0.5));
        let unwarped = shadow_lookup(&views, &coeffs, 0.0, NEAR_FAR, Vec3::new(3.0, 0.0, 0.0));
        assert!(approx(unwarped.uv.x, 0.5));
    }
}
