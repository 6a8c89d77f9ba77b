use serde::{Deserialize, Serialize};

use geom::{Angle, Bezier3, Pt3D};

use crate::{Color, MarkupConfig};

/// One oriented rectangle to draw, centered on `position` and rotated to `angle`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrokePrimitive {
    pub position: Pt3D,
    pub angle: Angle,
    pub length: f64,
    pub width: f64,
    pub color: Color,
}

/// The parameter range covered by each dash on a curve of the given length. The pattern is
/// centered, so the leftover space is split evenly between both ends.
pub fn dash_ranges(length: f64, cfg: &MarkupConfig) -> Vec<(f64, f64)> {
    let period = cfg.dash_length + cfg.dash_space;
    let count = ((length - cfg.dash_space) / period).floor();
    // Also catches NaN
    if !(count >= 1.0) {
        return Vec::new();
    }
    let count = count as usize;

    let start = (1.0 - (period * count as f64 - cfg.dash_space) / length) / 2.0;
    let dash_t = cfg.dash_length / length;
    let period_t = period / length;
    (0..count)
        .map(|i| {
            let start_t = start + period_t * i as f64;
            (start_t, start_t + dash_t)
        })
        .collect()
}

/// Evenly spaced dashes of a fixed length.
pub fn dashes(curve: &Bezier3, length: f64, cfg: &MarkupConfig) -> Vec<StrokePrimitive> {
    dash_ranges(length, cfg)
        .into_iter()
        .map(|(start_t, end_t)| {
            let position = curve.position(start_t).midpoint(curve.position(end_t));
            let angle = curve.tangent((start_t + end_t) / 2.0).angle_xz();
            StrokePrimitive {
                position,
                angle,
                length: cfg.dash_length,
                width: cfg.dash_width,
                color: cfg.dash_color,
            }
        })
        .collect()
}

/// Approximates a continuous line with straight pieces, using more of them where the curve
/// bends.
pub fn solid(curve: &Bezier3, cfg: &MarkupConfig) -> Vec<StrokePrimitive> {
    let mut results = Vec::new();
    solid_recursive(curve, cfg, &mut results);
    results
}

fn solid_recursive(curve: &Bezier3, cfg: &MarkupConfig, results: &mut Vec<StrokePrimitive>) {
    let chord = curve.chord();
    let length = chord.length();
    let too_curvy = curve.deflection_degs() > cfg.min_angle_delta;
    if (too_curvy || length > cfg.max_solid_length) && length >= cfg.min_solid_length {
        let (first, second) = curve.divide();
        solid_recursive(&first, cfg, results);
        solid_recursive(&second, cfg, results);
    } else {
        results.push(StrokePrimitive {
            position: chord.middle(),
            angle: chord.angle(),
            length,
            width: cfg.dash_width,
            color: cfg.dash_color,
        });
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;

    use super::*;

    fn straight(len: f64) -> Bezier3 {
        Bezier3::fit(
            Pt3D::ground(0.0, 0.0),
            Pt3D::ground(1.0, 0.0),
            Pt3D::ground(len, 0.0),
            Pt3D::ground(-1.0, 0.0),
        )
    }

    #[test]
    fn dash_count() {
        let cfg = MarkupConfig::default();
        for (len, expected) in [
            (0.0, 0),
            (1.5, 0),
            (4.4, 0),
            (4.5, 1),
            (20.0, 6),
            (21.0, 6),
            (100.0, 32),
        ] {
            assert_eq!(dash_ranges(len, &cfg).len(), expected, "length {}", len);
            let expected_formula = ((len - 1.5) / 3.0_f64).floor().max(0.0) as usize;
            assert_eq!(expected, expected_formula);
        }
    }

    #[test]
    fn dash_pattern_is_centered() {
        let cfg = MarkupConfig::default();
        let mut rng = XorShiftRng::seed_from_u64(7);
        for _ in 0..100 {
            let len = rng.gen_range(4.5..200.0);
            let ranges = dash_ranges(len, &cfg);
            let (first_start, _) = ranges[0];
            let (_, last_end) = *ranges.last().unwrap();
            assert!((first_start - (1.0 - last_end)).abs() < 1e-9);

            for pair in ranges.windows(2) {
                assert!((pair[1].0 - pair[0].0 - 3.0 / len).abs() < 1e-9);
            }
            for (start, end) in ranges {
                assert!((end - start - 1.5 / len).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn dashes_on_a_straight_line() {
        let cfg = MarkupConfig::default();
        let curve = straight(20.0);
        let dashes = dashes(&curve, curve.length(cfg.min_angle_delta), &cfg);
        assert_eq!(dashes.len(), 6);
        for dash in &dashes {
            assert_eq!(dash.length, 1.5);
            assert_eq!(dash.width, 0.15);
            assert_eq!(dash.color, cfg.dash_color);
            assert!(dash.angle.approx_eq(Angle::ZERO, 1e-6));
            assert!(dash.position.z().abs() < 1e-9);
        }
        // Symmetric about the middle of the curve
        let first = dashes[0].position.x();
        let last = dashes[5].position.x();
        assert!((first - (20.0 - last)).abs() < 1e-9);
    }

    #[test]
    fn short_straight_solid_is_one_piece() {
        let cfg = MarkupConfig::default();
        let pieces = solid(&straight(8.0), &cfg);
        assert_eq!(pieces.len(), 1);
        assert!((pieces[0].length - 8.0).abs() < 1e-9);
        assert!(pieces[0].position.approx_eq(Pt3D::ground(4.0, 0.0), 1e-9));
    }

    #[test]
    fn long_straight_solid_is_split() {
        let cfg = MarkupConfig::default();
        let pieces = solid(&straight(30.0), &cfg);
        assert_eq!(pieces.len(), 4);
        let total: f64 = pieces.iter().map(|p| p.length).sum();
        assert!((total - 30.0).abs() < 1e-9);
        assert!(pieces.iter().all(|p| p.length <= 10.0));
    }

    #[test]
    fn solid_subdivision_terminates_and_repeats() {
        let cfg = MarkupConfig::default();
        let mut rng = XorShiftRng::seed_from_u64(42);
        for _ in 0..200 {
            let mut pt = || Pt3D::ground(rng.gen_range(-40.0..40.0), rng.gen_range(-40.0..40.0));
            let curve = Bezier3::new(pt(), pt(), pt(), pt());

            let pieces = solid(&curve, &cfg);
            assert!(!pieces.is_empty());
            assert_eq!(pieces, solid(&curve, &cfg));

            // Anything longer than the max would have been split, since it's also above the min.
            assert!(pieces.iter().all(|p| p.length <= cfg.max_solid_length));
            // The chords are bounded by the chord of the whole curve and its control polygon.
            let total: f64 = pieces.iter().map(|p| p.length).sum();
            let polygon =
                curve.a.dist_to(curve.b) + curve.b.dist_to(curve.c) + curve.c.dist_to(curve.d);
            assert!(total <= polygon + 1e-6);
            assert!(total >= curve.chord().length() - 1e-6);
        }
    }

    #[test]
    fn tight_curves_get_more_pieces() {
        let cfg = MarkupConfig::default();
        let gentle = Bezier3::fit(
            Pt3D::ground(0.0, 0.0),
            Pt3D::ground(1.0, 0.0),
            Pt3D::ground(9.0, 1.0),
            Pt3D::ground(-1.0, 0.0),
        );
        let sharp = Bezier3::fit(
            Pt3D::ground(0.0, 0.0),
            Pt3D::ground(1.0, 0.0),
            Pt3D::ground(6.0, 6.0),
            Pt3D::ground(0.0, -1.0),
        );
        assert!(solid(&sharp, &cfg).len() > solid(&gentle, &cfg).len());
    }
}
