use serde::{Deserialize, Serialize};

use crate::Pt3D;

/// An axis-aligned box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Pt3D,
    pub max: Pt3D,
}

impl Bounds {
    /// A box of the given edge length centered on a point.
    pub fn centered(center: Pt3D, size: f64) -> Bounds {
        let half = Pt3D::new(size / 2.0, size / 2.0, size / 2.0);
        Bounds {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Pt3D {
        self.min.midpoint(self.max)
    }

    pub fn contains(&self, pt: Pt3D) -> bool {
        pt.x() >= self.min.x()
            && pt.x() <= self.max.x()
            && pt.y() >= self.min.y()
            && pt.y() <= self.max.y()
            && pt.z() >= self.min.z()
            && pt.z() <= self.max.z()
    }

    /// If the ray hits this box, returns the distance along the ray to the first contact. A ray
    /// starting inside the box hits at 0.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f64> {
        let origin = [ray.origin.x(), ray.origin.y(), ray.origin.z()];
        let dir = [ray.dir.x(), ray.dir.y(), ray.dir.z()];
        let min = [self.min.x(), self.min.y(), self.min.z()];
        let max = [self.max.x(), self.max.y(), self.max.z()];

        // Slab method
        let mut t_enter = 0.0_f64;
        let mut t_exit = f64::MAX;
        for axis in 0..3 {
            if dir[axis].abs() < f64::EPSILON {
                if origin[axis] < min[axis] || origin[axis] > max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir[axis];
            let mut t1 = (min[axis] - origin[axis]) * inv;
            let mut t2 = (max[axis] - origin[axis]) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_enter = t_enter.max(t1);
            t_exit = t_exit.min(t2);
            if t_enter > t_exit {
                return None;
            }
        }
        Some(t_enter)
    }
}

/// A half-infinite line, usually cast from the camera through the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Pt3D,
    pub dir: Pt3D,
}

impl Ray {
    pub fn new(origin: Pt3D, dir: Pt3D) -> Ray {
        Ray {
            origin,
            dir: dir.normalized(),
        }
    }
}
