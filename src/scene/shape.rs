//! Collision shapes and ray intersection

use glam::Vec3;

/// Direction components smaller than this are treated as parallel to a slab
const PARALLEL_EPSILON: f32 = 1e-8;

/// Axis-aligned bounding box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Creates a box from two corners in any order
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates a box from its center and half extents
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Distance along a normalized ray to the box, 0 if the origin is inside
    pub fn ray_distance(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < PARALLEL_EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }

        if t_exit < 0.0 {
            return None;
        }
        Some(t_enter.max(0.0))
    }
}

/// Shape a node can be hit through
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Box(Aabb),
    Sphere { center: Vec3, radius: f32 },
}

impl Shape {
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self::Sphere {
            center,
            radius: radius.abs(),
        }
    }

    pub fn cuboid(center: Vec3, half_extents: Vec3) -> Self {
        Self::Box(Aabb::from_center(center, half_extents))
    }

    /// Axis-aligned bounds of the shape
    pub fn bounds(&self) -> Aabb {
        match *self {
            Shape::Box(aabb) => aabb,
            Shape::Sphere { center, radius } => Aabb::from_center(center, Vec3::splat(radius)),
        }
    }

    /// Distance along a normalized ray to the shape
    ///
    /// With `bounds_only` the bounding box is tested instead of the exact shape.
    pub fn ray_distance(&self, origin: Vec3, direction: Vec3, bounds_only: bool) -> Option<f32> {
        if bounds_only {
            return self.bounds().ray_distance(origin, direction);
        }

        match *self {
            Shape::Box(aabb) => aabb.ray_distance(origin, direction),
            Shape::Sphere { center, radius } => {
                let oc = origin - center;
                let b = oc.dot(direction);
                let c = oc.length_squared() - radius * radius;
                let discriminant = b * b - c;
                if discriminant < 0.0 {
                    return None;
                }
                let root = discriminant.sqrt();
                let far = -b + root;
                if far < 0.0 {
                    return None;
                }
                let near = -b - root;
                Some(near.max(0.0))
            }
        }
    }
}
