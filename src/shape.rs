//! Convex collision shapes.

use itertools::Itertools;
use vek::{Aabr, Extent2, Vec2};

use crate::{
    math::{perp_dot, Iso},
    Error,
};

/// Convex shape attached to a body.
#[derive(Debug, Clone)]
pub enum Shape {
    /// Convex polygon.
    ///
    /// Vertices are in counterclockwise order with the centroid on the local
    /// origin, both enforced at construction.
    Polygon {
        /// Corner points in the local frame.
        vertices: Vec<Vec2<f64>>,
    },
    /// Disk around the local origin.
    Circle {
        /// Distance from the center to the edge.
        radius: f64,
    },
}

impl Shape {
    /// Construct a polygon from its corner points.
    ///
    /// Clockwise input is rewound and the vertices are shifted so the centroid
    /// lies on the local origin.
    pub fn polygon(vertices: impl Into<Vec<Vec2<f64>>>) -> Result<Self, Error> {
        let mut vertices = vertices.into();
        if vertices.len() < 3 {
            return Err(Error::InvalidPolygon);
        }

        let signed_area = signed_area(&vertices);
        if signed_area.abs() <= f64::EPSILON {
            // All points on a single line
            return Err(Error::InvalidPolygon);
        }
        if signed_area < 0.0 {
            vertices.reverse();
        }

        let centroid = centroid(&vertices);
        for vertex in &mut vertices {
            *vertex -= centroid;
        }

        Ok(Self::Polygon { vertices })
    }

    /// Construct an axis-aligned rectangle polygon centered on the local origin.
    pub fn rect(size: Extent2<f64>) -> Result<Self, Error> {
        let half_size = size / 2.0;

        Self::polygon(vec![
            Vec2::new(-half_size.w, -half_size.h),
            Vec2::new(half_size.w, -half_size.h),
            Vec2::new(half_size.w, half_size.h),
            Vec2::new(-half_size.w, half_size.h),
        ])
    }

    /// Construct a circle.
    pub fn circle(radius: f64) -> Result<Self, Error> {
        if radius <= 0.0 {
            return Err(Error::InvalidRadius { radius });
        }

        Ok(Self::Circle { radius })
    }

    /// World-space point of the shape furthest along `dir`, with its vertex index.
    ///
    /// Ties between polygon vertices go to the lowest index, circles always
    /// report index 0.
    pub fn support(&self, iso: Iso, dir: Vec2<f64>) -> (Vec2<f64>, usize) {
        match self {
            Self::Polygon { vertices } => {
                let mut best = iso.translate(vertices[0]);
                let mut best_dot = best.dot(dir);
                let mut best_index = 0;

                for (index, vertex) in vertices.iter().enumerate().skip(1) {
                    let world = iso.translate(*vertex);
                    let dot = world.dot(dir);
                    if dot > best_dot {
                        best = world;
                        best_dot = dot;
                        best_index = index;
                    }
                }

                (best, best_index)
            }
            Self::Circle { radius } => {
                let length = dir.magnitude();
                if length <= f64::EPSILON {
                    return (iso.pos, 0);
                }

                (iso.pos + dir * (radius / length), 0)
            }
        }
    }

    /// Moment of inertia around the center for the given mass.
    pub fn inertia(&self, mass: f64) -> f64 {
        match self {
            Self::Polygon { vertices } => {
                // Triangle fan around the centroid
                let mut numerator = 0.0;
                let mut denominator = 0.0;
                for (a, b) in vertices.iter().copied().circular_tuple_windows() {
                    let cross = perp_dot(a, b).abs();
                    numerator += cross * (a.dot(a) + a.dot(b) + b.dot(b));
                    denominator += cross;
                }

                mass / 6.0 * (numerator / denominator)
            }
            Self::Circle { radius } => mass * radius * radius / 2.0,
        }
    }

    /// Surface area of the shape.
    pub fn area(&self) -> f64 {
        match self {
            Self::Polygon { vertices } => signed_area(vertices).abs(),
            Self::Circle { radius } => std::f64::consts::PI * radius * radius,
        }
    }

    /// World-space axis-aligned bounding rectangle.
    pub fn aabr(&self, iso: Iso) -> Aabr<f64> {
        match self {
            Self::Polygon { vertices } => {
                let mut min = Vec2::broadcast(f64::MAX);
                let mut max = Vec2::broadcast(f64::MIN);
                for vertex in vertices {
                    let world = iso.translate(*vertex);
                    min.x = min.x.min(world.x);
                    min.y = min.y.min(world.y);
                    max.x = max.x.max(world.x);
                    max.y = max.y.max(world.y);
                }

                Aabr { min, max }
            }
            Self::Circle { radius } => Aabr {
                min: iso.pos - Vec2::broadcast(*radius),
                max: iso.pos + Vec2::broadcast(*radius),
            },
        }
    }
}

/// Shoelace area, positive for counterclockwise windings.
fn signed_area(vertices: &[Vec2<f64>]) -> f64 {
    vertices
        .iter()
        .copied()
        .circular_tuple_windows()
        .map(|(a, b)| perp_dot(a, b))
        .sum::<f64>()
        / 2.0
}

/// Area-weighted center of a polygon.
fn centroid(vertices: &[Vec2<f64>]) -> Vec2<f64> {
    let area = signed_area(vertices);

    vertices
        .iter()
        .copied()
        .circular_tuple_windows()
        .fold(Vec2::zero(), |acc, (a, b)| acc + (a + b) * perp_dot(a, b))
        / (6.0 * area)
}

#[cfg(test)]
mod tests {
    use vek::{Extent2, Vec2};

    use crate::math::Iso;

    use super::Shape;

    #[test]
    fn test_construction() {
        // Too few vertices
        assert!(Shape::polygon(vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)]).is_err());

        // Colinear vertices span no area
        assert!(Shape::polygon(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(2.0, 2.0)
        ])
        .is_err());

        assert!(Shape::circle(0.0).is_err());
        assert!(Shape::circle(-1.0).is_err());
    }

    #[test]
    fn test_recentered_and_rewound() {
        // Clockwise square far from the origin
        let shape = Shape::polygon(vec![
            Vec2::new(10.0, 10.0),
            Vec2::new(10.0, 12.0),
            Vec2::new(12.0, 12.0),
            Vec2::new(12.0, 10.0),
        ])
        .unwrap();

        let Shape::Polygon { vertices } = &shape else {
            panic!("not a polygon");
        };

        // Centroid moved to the local origin
        let center = vertices
            .iter()
            .fold(Vec2::<f64>::zero(), |acc, vertex| acc + *vertex)
            / 4.0;
        assert!(center.magnitude() < 1e-9, "{center:?}");

        // Winding flipped to counterclockwise
        assert!(super::signed_area(vertices) > 0.0);
        assert!((shape.area() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_support_maximal() {
        let shape = Shape::rect(Extent2::new(2.0, 2.0)).unwrap();
        let iso = Iso::from_pos(Vec2::new(1.0, -2.0));

        let Shape::Polygon { vertices } = &shape else {
            panic!("not a polygon");
        };

        // The support projection must be maximal over all vertices for any direction
        for _ in 0..100 {
            let dir = Vec2::new(fastrand::f64() * 2.0 - 1.0, fastrand::f64() * 2.0 - 1.0);
            if dir.magnitude() <= f64::EPSILON {
                continue;
            }

            let (support, index) = shape.support(iso, dir);
            assert!(support.distance(iso.translate(vertices[index])) < 1e-9);
            for vertex in vertices {
                assert!(iso.translate(*vertex).dot(dir) <= support.dot(dir) + 1e-9);
            }
        }
    }

    #[test]
    fn test_support_tie_break() {
        // Rectangle vertices are ordered (-,-), (+,-), (+,+), (-,+)
        let shape = Shape::rect(Extent2::new(2.0, 2.0)).unwrap();
        let iso = Iso::from_pos(Vec2::zero());

        // Both top vertices tie, the lower index wins
        let (_, index) = shape.support(iso, Vec2::new(0.0, 1.0));
        assert_eq!(index, 2);

        // Both right vertices tie
        let (_, index) = shape.support(iso, Vec2::new(1.0, 0.0));
        assert_eq!(index, 1);
    }

    #[test]
    fn test_circle_support() {
        let shape = Shape::circle(2.0).unwrap();
        let iso = Iso::from_pos(Vec2::new(3.0, 0.0));

        let (support, index) = shape.support(iso, Vec2::new(0.0, 10.0));
        assert_eq!(index, 0);
        assert!(support.distance(Vec2::new(3.0, 2.0)) < 1e-9, "{support:?}");
    }

    #[test]
    fn test_inertia() {
        // The polygon fan formula must match the known rectangle solution
        let shape = Shape::rect(Extent2::new(3.0, 2.0)).unwrap();
        let expected = 1.0 * (3.0f64.powi(2) + 2.0f64.powi(2)) / 12.0;
        assert!((shape.inertia(1.0) - expected).abs() < 1e-9);

        let circle = Shape::circle(2.0).unwrap();
        assert!((circle.inertia(3.0) - 3.0 * 4.0 / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_aabr() {
        let shape = Shape::rect(Extent2::new(2.0, 2.0)).unwrap();

        // A square rotated a quarter turn keeps its bounds
        let aabr = shape.aabr(Iso::new(Vec2::new(1.0, 1.0), 90f64.to_radians()));
        assert!(aabr.min.distance(Vec2::new(0.0, 0.0)) < 1e-9, "{aabr:?}");
        assert!(aabr.max.distance(Vec2::new(2.0, 2.0)) < 1e-9, "{aabr:?}");

        // Rotated an eighth turn it grows to the diagonal
        let aabr = shape.aabr(Iso::new(Vec2::zero(), 45f64.to_radians()));
        let diagonal = 2.0f64.sqrt();
        assert!((aabr.max.x - diagonal).abs() < 1e-9, "{aabr:?}");

        let circle = Shape::circle(1.5).unwrap();
        let aabr = circle.aabr(Iso::new(Vec2::new(1.0, 0.0), 1.0));
        assert!(aabr.min.distance(Vec2::new(-0.5, -1.5)) < 1e-9, "{aabr:?}");
    }
}
