use approx::assert_abs_diff_eq;
use cellvision_core::detection::{Candidate, Point};
use cellvision_core::geometry::{bearing, distance, estimate_target};
use cellvision_core::pipeline::GeometryConfig;

const REFERENCE: [f64; 2] = [80.0, 60.0];

#[test]
fn test_center_on_reference_has_zero_bearing() {
    let b = bearing(Point::new(80.0, 60.0), REFERENCE);
    assert_eq!(b.horizontal, 0.0);
    assert_eq!(b.vertical, 0.0);
}

#[test]
fn test_pure_horizontal_offset() {
    // dy = 0: vertical = atan(0 / dx) = 0, horizontal is its complement.
    let b = bearing(Point::new(100.0, 60.0), REFERENCE);
    assert_abs_diff_eq!(b.vertical, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(b.horizontal, 90.0, epsilon = 1e-12);

    let b = bearing(Point::new(20.0, 60.0), REFERENCE);
    assert_abs_diff_eq!(b.vertical, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(b.horizontal, 90.0, epsilon = 1e-12);
}

#[test]
fn test_pure_vertical_offset() {
    // dx = 0, dy != 0: horizontal = atan(0) = 0.
    let b = bearing(Point::new(80.0, 90.0), REFERENCE);
    assert_abs_diff_eq!(b.horizontal, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(b.vertical, 90.0, epsilon = 1e-12);
}

#[test]
fn test_diagonal_offset() {
    let b = bearing(Point::new(90.0, 70.0), REFERENCE);
    assert_abs_diff_eq!(b.horizontal, 45.0, epsilon = 1e-9);
    assert_abs_diff_eq!(b.vertical, 45.0, epsilon = 1e-9);

    let b = bearing(Point::new(70.0, 70.0), REFERENCE);
    assert_abs_diff_eq!(b.horizontal, -45.0, epsilon = 1e-9);
    assert_abs_diff_eq!(b.vertical, 135.0, epsilon = 1e-9);
}

#[test]
fn test_angles_are_complementary() {
    for &(x, y) in &[(81.0, 59.0), (10.0, 100.0), (150.0, 3.5), (80.5, 60.0), (80.0, 61.0)] {
        let b = bearing(Point::new(x, y), REFERENCE);
        assert_abs_diff_eq!(b.horizontal + b.vertical, 90.0, epsilon = 1e-9);
    }
}

#[test]
fn test_distance_formula() {
    assert_abs_diff_eq!(distance(10.0, 7.0, 170.0).unwrap(), 59.5, epsilon = 1e-12);
    assert_abs_diff_eq!(distance(0.5, 2.0, 100.0).unwrap(), 200.0, epsilon = 1e-12);
}

#[test]
fn test_distance_strictly_decreases_with_radius() {
    let mut previous = f64::INFINITY;
    for step in 1..200 {
        let r = step as f64 * 0.3;
        let d = distance(r, 7.0, 170.0).unwrap();
        assert!(d < previous, "distance not decreasing at r = {r}");
        previous = d;
    }
}

#[test]
fn test_distance_undefined_for_non_positive_radius() {
    assert!(distance(0.0, 7.0, 170.0).is_none());
    assert!(distance(-1.0, 7.0, 170.0).is_none());
}

#[test]
fn test_estimate_target() {
    let geometry = GeometryConfig::default();
    let candidate = Candidate {
        contour_index: 3,
        center: Point::new(100.0, 80.0),
        radius: 17.0,
        polygon: vec![Point::new(100.0, 63.0)],
    };
    let target = estimate_target(&candidate, &geometry).expect("target");
    assert_eq!(target.candidate, candidate);
    assert_abs_diff_eq!(target.horizontal_angle, 45.0, epsilon = 1e-9);
    assert_abs_diff_eq!(target.vertical_angle, 45.0, epsilon = 1e-9);
    assert_abs_diff_eq!(
        target.distance,
        geometry.object_diameter * geometry.focal_length / 34.0,
        epsilon = 1e-12
    );
}

#[test]
fn test_zero_radius_candidate_has_no_target() {
    let candidate = Candidate {
        contour_index: 0,
        center: Point::new(5.0, 5.0),
        radius: 0.0,
        polygon: vec![Point::new(5.0, 5.0)],
    };
    assert!(estimate_target(&candidate, &GeometryConfig::default()).is_none());
}
