use crate::Point;
use serde::{Deserialize, Serialize};

/// 2D affine transform:
///
/// ```text
/// x' = a*x + b*y + c
/// y' = d*x + e*y + f
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

/// 3x3 matrix used for the least-squares normal equations
#[derive(Clone, Copy, Debug, PartialEq)]
struct Mat3 {
    data: [[f64; 3]; 3],
}

impl Mat3 {
    fn zero() -> Self {
        Self {
            data: [[0.0; 3]; 3],
        }
    }

    fn determinant(&self) -> f64 {
        let m = &self.data;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    fn max_abs(&self) -> f64 {
        self.data
            .iter()
            .flatten()
            .fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }

    /// Solve `M * x = rhs` by Cramer's rule.
    fn solve(&self, rhs: [f64; 3], det: f64) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (col, slot) in out.iter_mut().enumerate() {
            let mut replaced = *self;
            for (row, value) in rhs.iter().enumerate() {
                replaced.data[row][col] = *value;
            }
            *slot = replaced.determinant() / det;
        }
        out
    }
}

impl Affine {
    /// Least-squares fit mapping each `source` to its `target`.
    ///
    /// Needs at least three pairs that are not collinear; returns None otherwise.
    pub fn fit(pairs: &[(Point, Point)]) -> Option<Self> {
        if pairs.len() < 3 {
            return None;
        }

        // Normalize around the source centroid to keep the normal matrix well conditioned
        let n = pairs.len() as f64;
        let (sx, sy) = pairs
            .iter()
            .fold((0.0, 0.0), |(x, y), (s, _)| (x + s.x(), y + s.y()));
        let origin = Point::new(sx / n, sy / n);

        let mut normal = Mat3::zero();
        let mut rhs_x = [0.0; 3];
        let mut rhs_y = [0.0; 3];
        for (source, target) in pairs {
            let row = [source.x() - origin.x(), source.y() - origin.y(), 1.0];
            for i in 0..3 {
                for j in 0..3 {
                    normal.data[i][j] += row[i] * row[j];
                }
                rhs_x[i] += row[i] * target.x();
                rhs_y[i] += row[i] * target.y();
            }
        }

        let det = normal.determinant();
        let scale = normal.max_abs();
        if !det.is_finite() || det.abs() <= 1e-12 * scale.powi(3) {
            return None;
        }

        let [a, b, c0] = normal.solve(rhs_x, det);
        let [d, e, f0] = normal.solve(rhs_y, det);

        // Undo the centroid shift
        Some(Self {
            a,
            b,
            c: c0 - a * origin.x() - b * origin.y(),
            d,
            e,
            f: f0 - d * origin.x() - e * origin.y(),
        })
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x() + self.b * p.y() + self.c,
            self.d * p.x() + self.e * p.y() + self.f,
        )
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.e - self.b * self.d
    }

    /// None when the linear part is singular.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }

        let a = self.e / det;
        let b = -self.b / det;
        let d = -self.d / det;
        let e = self.a / det;
        Some(Self {
            a,
            b,
            c: -(a * self.c + b * self.f),
            d,
            e,
            f: -(d * self.c + e * self.f),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(p: Point, q: Point) {
        assert!(
            (p.x() - q.x()).abs() < 1e-6 && (p.y() - q.y()).abs() < 1e-6,
            "{p:?} != {q:?}"
        );
    }

    #[test]
    fn fit_recovers_exact_transform() {
        let truth = Affine {
            a: 2.0,
            b: 0.5,
            c: 100.0,
            d: -0.25,
            e: -3.0,
            f: 40.0,
        };
        let sources = [
            Point::new(0.0, 0.0),
            Point::new(1000.0, 0.0),
            Point::new(0.0, 800.0),
            Point::new(1000.0, 800.0),
        ];
        let pairs: Vec<_> = sources.iter().map(|s| (*s, truth.apply(*s))).collect();

        let fitted = Affine::fit(&pairs).unwrap();
        for s in sources {
            assert_close(fitted.apply(s), truth.apply(s));
        }
    }

    #[test]
    fn fit_rejects_collinear_points() {
        let pairs = [
            (Point::new(0.0, 0.0), Point::new(0.0, 0.0)),
            (Point::new(1.0, 1.0), Point::new(5.0, 5.0)),
            (Point::new(2.0, 2.0), Point::new(9.0, 9.0)),
        ];
        assert!(Affine::fit(&pairs).is_none());
        assert!(Affine::fit(&pairs[..2]).is_none());
    }

    #[test]
    fn inverse_undoes_apply() {
        let t = Affine {
            a: 0.3,
            b: -1.2,
            c: 7.0,
            d: 2.0,
            e: 0.1,
            f: -3.0,
        };
        let inv = t.inverse().unwrap();
        let p = Point::new(12.5, -4.0);
        assert_close(inv.apply(t.apply(p)), p);
    }

    #[test]
    fn singular_transform_has_no_inverse() {
        let t = Affine {
            a: 1.0,
            b: 2.0,
            c: 0.0,
            d: 2.0,
            e: 4.0,
            f: 0.0,
        };
        assert!(t.inverse().is_none());
    }
}
