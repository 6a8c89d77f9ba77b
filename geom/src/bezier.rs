use serde::{Deserialize, Serialize};

use crate::{Line, Pt3D, EPSILON_DIST};

// Recursion guard for arc length. 2^12 pieces is far more than any marking needs.
const MAX_LENGTH_DEPTH: usize = 12;

/// A cubic Bezier curve. `a` and `d` are the endpoints; `b` and `c` are the control points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bezier3 {
    pub a: Pt3D,
    pub b: Pt3D,
    pub c: Pt3D,
    pub d: Pt3D,
}

impl Bezier3 {
    pub fn new(a: Pt3D, b: Pt3D, c: Pt3D, d: Pt3D) -> Bezier3 {
        Bezier3 { a, b, c, d }
    }

    /// Fits a smooth curve between two endpoints. Each direction points from its endpoint into
    /// the curve, so for a straight curve `start_dir` faces `end` and `end_dir` faces `start`.
    /// The control points stay on the tangent rays, so the curve leaves and arrives along them.
    pub fn fit(start: Pt3D, start_dir: Pt3D, end: Pt3D, end_dir: Pt3D) -> Bezier3 {
        let (chord_dir, distance) = (end - start).normalized_xz();

        let straight = start_dir.x() * chord_dir.x() + start_dir.z() * chord_dir.z() > 0.999
            && end_dir.x() * chord_dir.x() + end_dir.z() * chord_dir.z() < -0.999;
        if straight {
            return Bezier3::new(
                start,
                start + start_dir * (distance * 0.276),
                end + end_dir * (distance * 0.276),
                end,
            );
        }

        let facing = start_dir.x() * end_dir.x() + start_dir.z() * end_dir.z();
        if facing >= -0.999 {
            if let Some((u, v)) = intersect_rays_xz(start, start_dir, end, end_dir) {
                let u = u.clamp(distance * 0.1, distance);
                let v = v.clamp(distance * 0.1, distance);
                let total = u + v;
                return Bezier3::new(
                    start,
                    start + start_dir * u.min(total * 0.276),
                    end + end_dir * v.min(total * 0.276),
                    end,
                );
            }
        }

        Bezier3::new(
            start,
            start + start_dir * (distance * 0.276),
            end + end_dir * (distance * 0.276),
            end,
        )
    }

    pub fn position(&self, t: f64) -> Pt3D {
        let mt = 1.0 - t;
        self.a * (mt * mt * mt)
            + self.b * (3.0 * mt * mt * t)
            + self.c * (3.0 * mt * t * t)
            + self.d * (t * t * t)
    }

    /// The derivative at `t`. Not normalized.
    pub fn tangent(&self, t: f64) -> Pt3D {
        let mt = 1.0 - t;
        (self.b - self.a) * (3.0 * mt * mt)
            + (self.c - self.b) * (6.0 * mt * t)
            + (self.d - self.c) * (3.0 * t * t)
    }

    /// The straight segment between the endpoints.
    pub fn chord(&self) -> Line {
        Line::new(self.a, self.d)
    }

    /// How far the curve bends, in degrees. 0 when the end tangents are exactly opposed, as for
    /// a straight curve; 180 when they're parallel, as for a U-turn.
    pub fn deflection_degs(&self) -> f64 {
        180.0 - (self.b - self.a).angle_degs_to(self.c - self.d)
    }

    /// The end tangents are opposed and both control points lie along the chord. Checking the
    /// deflection alone would accept S-shaped curves.
    fn is_flat(&self, tolerance_degs: f64) -> bool {
        let chord = self.d - self.a;
        self.deflection_degs() <= tolerance_degs
            && (self.b - self.a).angle_degs_to(chord) <= tolerance_degs
            && (self.c - self.d).angle_degs_to(-chord) <= tolerance_degs
    }

    /// Splits the curve at `t` into two curves covering [0, t] and [t, 1].
    pub fn split(&self, t: f64) -> (Bezier3, Bezier3) {
        let ab = self.a.lerp(self.b, t);
        let bc = self.b.lerp(self.c, t);
        let cd = self.c.lerp(self.d, t);
        let abc = ab.lerp(bc, t);
        let bcd = bc.lerp(cd, t);
        let mid = abc.lerp(bcd, t);
        (
            Bezier3::new(self.a, ab, abc, mid),
            Bezier3::new(mid, bcd, cd, self.d),
        )
    }

    /// Bisects the curve.
    pub fn divide(&self) -> (Bezier3, Bezier3) {
        self.split(0.5)
    }

    /// The part of the curve between parameters `t1` and `t2`, with 0 <= t1 <= t2 <= 1.
    pub fn cut(&self, t1: f64, t2: f64) -> Bezier3 {
        let (first, _) = self.split(t2);
        if t2 <= EPSILON_DIST {
            return Bezier3::new(self.a, self.a, self.a, self.a);
        }
        let (_, second) = first.split(t1 / t2);
        second
    }

    /// Approximates the arc length by bisecting until each piece is within `tolerance_degs` of
    /// straight, then summing the chords.
    pub fn length(&self, tolerance_degs: f64) -> f64 {
        self.length_recursive(tolerance_degs, 0)
    }

    /// Finds the parameter where the arc length measured from the start reaches `dist`.
    pub fn t_at_length(&self, dist: f64, tolerance_degs: f64) -> f64 {
        if dist <= 0.0 {
            return 0.0;
        }
        if dist >= self.length(tolerance_degs) {
            return 1.0;
        }
        let mut low = 0.0;
        let mut high = 1.0;
        for _ in 0..40 {
            let mid = (low + high) / 2.0;
            if self.cut(0.0, mid).length(tolerance_degs) < dist {
                low = mid;
            } else {
                high = mid;
            }
        }
        (low + high) / 2.0
    }

    fn length_recursive(&self, tolerance_degs: f64, depth: usize) -> f64 {
        if depth >= MAX_LENGTH_DEPTH || self.is_flat(tolerance_degs) {
            return self.chord().length();
        }
        let (first, second) = self.divide();
        first.length_recursive(tolerance_degs, depth + 1)
            + second.length_recursive(tolerance_degs, depth + 1)
    }
}

/// Intersects two rays in the ground plane. Returns the distances along each direction to the
/// crossing point, or None if they're parallel.
fn intersect_rays_xz(p1: Pt3D, dir1: Pt3D, p2: Pt3D, dir2: Pt3D) -> Option<(f64, f64)> {
    let det = dir1.x() * dir2.z() - dir1.z() * dir2.x();
    if det.abs() < EPSILON_DIST {
        return None;
    }
    let dx = p2.x() - p1.x();
    let dz = p2.z() - p1.z();
    let u = (dx * dir2.z() - dz * dir2.x()) / det;
    let v = (dx * dir1.z() - dz * dir1.x()) / det;
    Some((u, v))
}
