//! Pure connector geometry: where an edge leaves a node box and how the
//! curve between two anchors is shaped.

/// A point in absolute canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// Horizontal control-point offset as a fraction of the x span. One constant
/// for every edge; callers never vary it.
pub const CURVATURE: f64 = 0.3;

/// Vertical lift of an edge label above the connector midpoint.
pub const LABEL_RISE: f64 = 10.0;

/// The point where the ray from `center` toward `toward` exits a
/// `width x height` rectangle centered at `center`.
///
/// Picks the exit edge by comparing `|cos| * h/2` against `|sin| * w/2` and
/// solves on that edge. A zero-length ray has no angle; the center itself is
/// returned instead of a NaN.
pub fn perimeter_intersection(center: Point, toward: Point, width: f64, height: f64) -> Point {
    let dx = toward.x - center.x;
    let dy = toward.y - center.y;
    if dx == 0.0 && dy == 0.0 {
        return center;
    }

    let angle = dy.atan2(dx);
    let (sin, cos) = angle.sin_cos();
    let half_w = width / 2.0;
    let half_h = height / 2.0;

    if cos.abs() * half_h >= sin.abs() * half_w {
        // Exits through the left or right edge.
        let side = if cos >= 0.0 { 1.0 } else { -1.0 };
        Point::new(
            center.x + side * half_w,
            center.y + side * half_w * (sin / cos),
        )
    } else {
        // Exits through the top or bottom edge.
        let side = if sin >= 0.0 { 1.0 } else { -1.0 };
        Point::new(
            center.x + side * half_h * (cos / sin),
            center.y + side * half_h,
        )
    }
}

/// SVG cubic path from `start` to `end` with both control points offset
/// horizontally by `CURVATURE * dx`, sharing the y of their nearest endpoint.
/// Gives the horizontally biased "flow" curve used for every connector.
pub fn flow_path(start: Point, end: Point) -> String {
    let dx = end.x - start.x;
    let c1 = Point::new(start.x + dx * CURVATURE, start.y);
    let c2 = Point::new(end.x - dx * CURVATURE, end.y);

    format!(
        "M {:.2} {:.2} C {:.2} {:.2}, {:.2} {:.2}, {:.2} {:.2}",
        start.x, start.y, c1.x, c1.y, c2.x, c2.y, end.x, end.y
    )
}

/// Anchor point for an edge label. The flow curve passes through the chord
/// midpoint at t = 0.5, so the label sits on the midpoint lifted clear of
/// the stroke.
pub fn label_anchor(start: Point, end: Point) -> Point {
    Point::new(
        (start.x + end.x) / 2.0,
        (start.y + end.y) / 2.0 - LABEL_RISE,
    )
}
