//! Geometry engine: pure path construction for primitive shapes and splines.

mod compose;

pub use compose::{merge, subtract, union_bounds};

use crate::element::Anchor;
use kurbo::{Affine, BezPath, Point, Vec2};

/// Cubic-Bezier circle approximation constant.
pub const KAPPA: f64 = 0.5523;

/// Apply rotation about the local origin, then translate by `offset`.
fn place(mut path: BezPath, rotation_degrees: f64, offset: Vec2) -> BezPath {
    let transform = Affine::translate(offset) * Affine::rotate(rotation_degrees.to_radians());
    path.apply_affine(transform);
    path
}

/// Closed ellipse path centred on the local origin, built from four cubic
/// segments with the κ approximation.
pub fn circle_path(width: f64, height: f64, rotation_degrees: f64, offset: Vec2) -> BezPath {
    let rx = width / 2.0;
    let ry = height / 2.0;
    let kx = rx * KAPPA;
    let ky = ry * KAPPA;

    let mut path = BezPath::new();
    path.move_to((rx, 0.0));
    path.curve_to((rx, ky), (kx, ry), (0.0, ry));
    path.curve_to((-kx, ry), (-rx, ky), (-rx, 0.0));
    path.curve_to((-rx, -ky), (-kx, -ry), (0.0, -ry));
    path.curve_to((kx, -ry), (rx, -ky), (rx, 0.0));
    path.close_path();
    place(path, rotation_degrees, offset)
}

/// Closed axis-aligned rectangle path centred on the local origin.
pub fn rect_path(width: f64, height: f64, rotation_degrees: f64, offset: Vec2) -> BezPath {
    let hw = width / 2.0;
    let hh = height / 2.0;

    let mut path = BezPath::new();
    path.move_to((-hw, -hh));
    path.line_to((hw, -hh));
    path.line_to((hw, hh));
    path.line_to((-hw, hh));
    path.close_path();
    place(path, rotation_degrees, offset)
}

/// Closed isoceles triangle path (apex up) centred on the local origin.
pub fn triangle_path(width: f64, height: f64, rotation_degrees: f64, offset: Vec2) -> BezPath {
    let hw = width / 2.0;
    let hh = height / 2.0;

    let mut path = BezPath::new();
    path.move_to((0.0, -hh));
    path.line_to((hw, hh));
    path.line_to((-hw, hh));
    path.close_path();
    place(path, rotation_degrees, offset)
}

/// Straight segment across the element's width.
pub fn line_path(width: f64, rotation_degrees: f64, offset: Vec2) -> BezPath {
    let hw = width / 2.0;
    let mut path = BezPath::new();
    path.move_to((-hw, 0.0));
    path.line_to((hw, 0.0));
    place(path, rotation_degrees, offset)
}

/// Open polyline through the given centre-relative points.
pub fn polyline_path(points: &[Point], rotation_degrees: f64, offset: Vec2) -> BezPath {
    let mut path = BezPath::new();
    let Some(first) = points.first() else {
        return path;
    };
    path.move_to(*first);
    for point in &points[1..] {
        path.line_to(*point);
    }
    place(path, rotation_degrees, offset)
}

/// Spline path: one cubic segment per consecutive anchor pair, using
/// `handle_out` of the first and `handle_in` of the second as control
/// offsets (relative vectors). A closed spline gains one segment from the
/// last anchor back to the first and terminates the subpath.
pub fn spline_path(
    points: &[Anchor],
    closed: bool,
    rotation_degrees: f64,
    offset: Vec2,
) -> BezPath {
    let mut path = BezPath::new();
    let Some(first) = points.first() else {
        return path;
    };
    path.move_to(first.point);

    let segment = |path: &mut BezPath, from: &Anchor, to: &Anchor| {
        let c1 = from.point + from.handle_out.unwrap_or(Vec2::ZERO);
        let c2 = to.point + to.handle_in.unwrap_or(Vec2::ZERO);
        path.curve_to(c1, c2, to.point);
    };

    for pair in points.windows(2) {
        segment(&mut path, &pair[0], &pair[1]);
    }
    if closed {
        if points.len() > 1 {
            segment(&mut path, &points[points.len() - 1], first);
        }
        path.close_path();
    }
    place(path, rotation_degrees, offset)
}

/// Corners of a rotated box, in the frame `center` is expressed in.
pub fn rotated_corners(center: Point, width: f64, height: f64, rotation_degrees: f64) -> [Point; 4] {
    let radians = rotation_degrees.to_radians();
    let (sin, cos) = radians.sin_cos();
    let hw = width / 2.0;
    let hh = height / 2.0;
    let spin = |dx: f64, dy: f64| -> Point {
        Point::new(
            center.x + dx * cos - dy * sin,
            center.y + dx * sin + dy * cos,
        )
    };
    [
        spin(-hw, -hh),
        spin(hw, -hh),
        spin(hw, hh),
        spin(-hw, hh),
    ]
}
