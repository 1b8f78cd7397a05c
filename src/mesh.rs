use glam::{Mat4, Vec3};

/// Axis-aligned extent of a piece of geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshBounds {
    pub min: Vec3,
    pub max: Vec3,
    pub center: Vec3,
    pub radius: f32,
}

impl MeshBounds {
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        let lo = min.min(max);
        let hi = min.max(max);
        let center = (lo + hi) * 0.5;
        let radius = (hi - center).length();
        MeshBounds { min: lo, max: hi, center, radius }
    }

    pub fn from_points(points: &[Vec3]) -> Self {
        if points.is_empty() {
            return MeshBounds { min: Vec3::ZERO, max: Vec3::ZERO, center: Vec3::ZERO, radius: 0.0 };
        }
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for &point in points {
            min = min.min(point);
            max = max.max(point);
        }
        let center = (min + max) * 0.5;
        let mut radius: f32 = 0.0;
        for &point in points {
            radius = radius.max((point - center).length());
        }
        MeshBounds { min, max, center, radius }
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Axis-aligned box enclosing these bounds after `matrix` is applied.
    pub fn transformed(&self, matrix: &Mat4) -> MeshBounds {
        let corners = self.corners().map(|corner| matrix.transform_point3(corner));
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for corner in corners {
            min = min.min(corner);
            max = max.max(corner);
        }
        MeshBounds::from_min_max(min, max)
    }

    pub fn union(&self, other: &MeshBounds) -> MeshBounds {
        MeshBounds::from_min_max(self.min.min(other.min), self.max.max(other.max))
    }
}
