use serde::{Deserialize, Serialize};

/// A 2D point: (longitude, latitude) in degrees, or (x, y) in projected units.
///
/// Serializes as a two-element array, matching the wire format of the
/// worker messages.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point(pub f64, pub f64);

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self(x, y)
    }

    pub fn x(&self) -> f64 {
        self.0
    }

    pub fn y(&self) -> f64 {
        self.1
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite() && self.1.is_finite()
    }
}

/// Axis-aligned bounding box `[min_x, min_y, max_x, max_y]`.
///
/// Carries no coordinate system tag: geographic and projected boxes share
/// this type, so conversions between them must go through a projection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Bbox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// Four corners of a rectangle, counter-clockwise from the minimum corner.
pub type Rectangle = [Point; 4];

impl Bbox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Smallest box enclosing all points. None for an empty slice.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = Self::new(first.x(), first.y(), first.x(), first.y());
        for p in &points[1..] {
            bbox.min_x = bbox.min_x.min(p.x());
            bbox.min_y = bbox.min_y.min(p.y());
            bbox.max_x = bbox.max_x.max(p.x());
            bbox.max_y = bbox.max_y.max(p.y());
        }
        Some(bbox)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn min(&self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    pub fn max(&self) -> Point {
        Point::new(self.max_x, self.max_y)
    }

    pub fn contains_bbox(&self, other: &Bbox) -> bool {
        other.min_x >= self.min_x
            && other.min_y >= self.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }
}

impl From<[f64; 4]> for Bbox {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Bbox> for [f64; 4] {
    fn from(b: Bbox) -> Self {
        [b.min_x, b.min_y, b.max_x, b.max_y]
    }
}

/// Convert a bbox to its corner rectangle.
pub fn bbox_to_rectangle(bbox: &Bbox) -> Rectangle {
    [
        Point::new(bbox.min_x, bbox.min_y),
        Point::new(bbox.max_x, bbox.min_y),
        Point::new(bbox.max_x, bbox.max_y),
        Point::new(bbox.min_x, bbox.max_y),
    ]
}

/// Finds a `width` x `height` box centered on `center` that stays inside `outer`.
///
/// Each axis is handled on its own: an edge that overflows `outer` is pulled
/// back to the outer edge and the opposite edge is pushed by the same amount,
/// capped at the other outer edge. A requested extent larger than `outer`
/// therefore collapses to the outer extent on that axis.
pub fn find_centered_bbox(outer: &Bbox, center: Point, width: f64, height: f64) -> Bbox {
    let (min_x, max_x) = clamp_axis(
        center.x() - width / 2.0,
        center.x() + width / 2.0,
        outer.min_x,
        outer.max_x,
    );
    let (min_y, max_y) = clamp_axis(
        center.y() - height / 2.0,
        center.y() + height / 2.0,
        outer.min_y,
        outer.max_y,
    );

    Bbox::new(min_x, min_y, max_x, max_y)
}

fn clamp_axis(mut low: f64, mut high: f64, outer_low: f64, outer_high: f64) -> (f64, f64) {
    if low < outer_low {
        let shift = outer_low - low;
        low = outer_low;
        high = (high + shift).min(outer_high);
    } else if high > outer_high {
        let shift = high - outer_high;
        high = outer_high;
        low = (low - shift).max(outer_low);
    }
    (low, high)
}

/// Even-odd ray casting test. The ring may be open or closed.
pub fn point_in_polygon(point: Point, ring: &[Point]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (ring[i].x(), ring[i].y());
        let (xj, yj) = (ring[j].x(), ring[j].y());
        if (yi > point.y()) != (yj > point.y())
            && point.x() < (xj - xi) * (point.y() - yi) / (yj - yi) + xi
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outer() -> Bbox {
        Bbox::new(0.0, 0.0, 10.0, 10.0)
    }

    #[test]
    fn centered_bbox_without_clamping() {
        let result = find_centered_bbox(&outer(), Point::new(5.0, 5.0), 4.0, 4.0);
        assert_eq!(result, Bbox::new(3.0, 3.0, 7.0, 7.0));
    }

    #[test]
    fn centered_bbox_shifts_away_from_low_edges() {
        // Naive box is [-1, -1, 3, 3]
        let result = find_centered_bbox(&outer(), Point::new(1.0, 1.0), 4.0, 4.0);
        assert_eq!(result, Bbox::new(0.0, 0.0, 4.0, 4.0));
    }

    #[test]
    fn centered_bbox_shifts_away_from_high_edges() {
        let result = find_centered_bbox(&outer(), Point::new(9.0, 8.5), 4.0, 4.0);
        assert_eq!(result, Bbox::new(6.0, 6.0, 10.0, 10.0));
    }

    #[test]
    fn centered_bbox_axes_clamp_independently() {
        let result = find_centered_bbox(&outer(), Point::new(0.5, 5.0), 2.0, 2.0);
        assert_eq!(result, Bbox::new(0.0, 4.0, 2.0, 6.0));
    }

    #[test]
    fn oversized_request_collapses_to_outer_extent() {
        let result = find_centered_bbox(&outer(), Point::new(5.0, 5.0), 20.0, 4.0);
        assert_eq!(result.min_x, 0.0);
        assert_eq!(result.max_x, 10.0);
        assert_eq!(result.height(), 4.0);

        let result = find_centered_bbox(&outer(), Point::new(2.0, 7.0), 3.0, 50.0);
        assert_eq!(result.min_y, 0.0);
        assert_eq!(result.max_y, 10.0);
        assert_eq!(result.width(), 3.0);
    }

    #[test]
    fn centered_bbox_stays_inside_for_a_grid_of_centers() {
        let outer = Bbox::new(-3.0, 2.0, 7.0, 5.0);
        for ix in 0..=20 {
            for iy in 0..=20 {
                let center = Point::new(-3.0 + ix as f64 * 0.5, 2.0 + iy as f64 * 0.15);
                let result = find_centered_bbox(&outer, center, 2.5, 1.0);

                assert!(outer.contains_bbox(&result), "{result:?} escapes {outer:?}");
                assert!((result.width() - 2.5).abs() < 1e-9);
                assert!((result.height() - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn centered_bbox_is_deterministic() {
        let a = find_centered_bbox(&outer(), Point::new(9.9, 0.1), 3.3, 7.7);
        let b = find_centered_bbox(&outer(), Point::new(9.9, 0.1), 3.3, 7.7);
        assert_eq!(a, b);
    }

    #[test]
    fn bbox_from_points_encloses_everything() {
        let points = [
            Point::new(1.0, -2.0),
            Point::new(-4.0, 3.0),
            Point::new(2.5, 0.0),
        ];
        let bbox = Bbox::from_points(&points).unwrap();
        assert_eq!(bbox, Bbox::new(-4.0, -2.0, 2.5, 3.0));
        assert!(Bbox::from_points(&[]).is_none());
    }

    #[test]
    fn rectangle_corners_run_counter_clockwise() {
        let rect = bbox_to_rectangle(&Bbox::new(0.0, 1.0, 2.0, 3.0));
        assert_eq!(rect[0], Point::new(0.0, 1.0));
        assert_eq!(rect[1], Point::new(2.0, 1.0));
        assert_eq!(rect[2], Point::new(2.0, 3.0));
        assert_eq!(rect[3], Point::new(0.0, 3.0));
    }

    #[test]
    fn point_in_polygon_handles_concave_ring() {
        // L-shape
        let ring = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 4.0),
            Point::new(0.0, 4.0),
        ];
        assert!(point_in_polygon(Point::new(0.5, 3.0), &ring));
        assert!(point_in_polygon(Point::new(3.0, 0.5), &ring));
        assert!(!point_in_polygon(Point::new(3.0, 3.0), &ring));
        assert!(!point_in_polygon(Point::new(-1.0, 0.5), &ring));
    }

    #[test]
    fn bbox_serializes_as_array() {
        let json = serde_json::to_string(&Bbox::new(1.0, 2.0, 3.0, 4.0)).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0,4.0]");

        let point: Point = serde_json::from_str("[5.5,-1.0]").unwrap();
        assert_eq!(point, Point::new(5.5, -1.0));
    }
}
