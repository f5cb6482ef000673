//! Separating axis theorem.

use itertools::Itertools;
use smallvec::SmallVec;
use vek::Vec2;

use crate::{
    math::{perp, Iso},
    shape::Shape,
};

use super::Overlap;

/// Vertices transformed to world space, inline up to octagons.
type WorldVertices = SmallVec<[Vec2<f64>; 8]>;

/// Overlap test between two shapes.
///
/// Returns `None` when a separating axis exists.
/// On overlap the normal points from the shape owning the reference edge
/// towards the other shape, `swapped` tells whether that owner is the second
/// shape.
pub fn overlap(a: &Shape, a_iso: Iso, b: &Shape, b_iso: Iso) -> Option<Overlap> {
    puffin::profile_function!();

    match (a, b) {
        (Shape::Polygon { vertices: a_vertices }, Shape::Polygon { vertices: b_vertices }) => {
            polygon_polygon(a_vertices, a_iso, b_vertices, b_iso)
        }
        (Shape::Polygon { vertices }, Shape::Circle { radius }) => {
            polygon_circle(vertices, a_iso, *radius, b_iso, false)
        }
        (Shape::Circle { radius }, Shape::Polygon { vertices }) => {
            polygon_circle(vertices, b_iso, *radius, a_iso, true)
        }
        (Shape::Circle { radius: a_radius }, Shape::Circle { radius: b_radius }) => {
            circle_circle(*a_radius, a_iso, *b_radius, b_iso)
        }
    }
}

/// A simple projection on an axis that can be used to check for overlaps.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Projection {
    /// Minimum projected value.
    min: f64,
    /// Maximum projected value.
    max: f64,
}

impl Projection {
    /// Project a polygon shape on an axis.
    fn project(vertices: &[Vec2<f64>], axis: Vec2<f64>) -> Self {
        // Start by projecting the first so we don't have to check for infinite
        let mut min = vertices[0].dot(axis);
        let mut max = min;

        for vertex in vertices.iter().skip(1) {
            let dot = vertex.dot(axis);
            min = min.min(dot);
            max = max.max(dot);
        }

        Self { min, max }
    }

    /// Project a circle on an axis.
    fn circle(center: Vec2<f64>, radius: f64, axis: Vec2<f64>) -> Self {
        let dot = center.dot(axis);

        Self {
            min: dot - radius,
            max: dot + radius,
        }
    }

    /// Calculate the overlap, negative when the projections are disjoint.
    fn overlap(&self, other: &Self) -> f64 {
        (self.max - other.min).min(other.max - self.min)
    }
}

/// Smallest projection overlap over the edge normals of `axis_owner`.
///
/// Returns `None` as soon as a separating axis is found.
fn min_overlap_axes(axis_owner: &[Vec2<f64>], other: &[Vec2<f64>]) -> Option<(f64, Vec2<f64>)> {
    let mut smallest = f64::MAX;
    let mut smallest_axis = Vec2::zero();

    for (start, end) in axis_owner.iter().copied().circular_tuple_windows() {
        let edge = start - end;
        if edge.magnitude_squared() <= f64::EPSILON {
            continue;
        }
        let axis = perp(edge).normalized();

        let overlap = Projection::project(axis_owner, axis).overlap(&Projection::project(other, axis));

        if overlap < smallest {
            smallest = overlap;
            smallest_axis = axis;

            // No overlap for sure, exit
            if overlap <= 0.0 {
                return None;
            }
        }
    }

    Some((smallest, smallest_axis))
}

fn polygon_polygon(
    a: &[Vec2<f64>],
    a_iso: Iso,
    b: &[Vec2<f64>],
    b_iso: Iso,
) -> Option<Overlap> {
    let world_a: WorldVertices = a.iter().map(|vertex| a_iso.translate(*vertex)).collect();
    let world_b: WorldVertices = b.iter().map(|vertex| b_iso.translate(*vertex)).collect();

    let (b_overlap, b_axis) = min_overlap_axes(&world_b, &world_a)?;
    let (a_overlap, a_axis) = min_overlap_axes(&world_a, &world_b)?;

    // The polygon owning the minimum penetration axis holds the reference edge
    let (separation, axis, swapped) = if a_overlap < b_overlap {
        (a_overlap, a_axis, false)
    } else {
        (b_overlap, b_axis, true)
    };

    // Make sure the normal points from the reference owner to the other shape
    let (reference_center, incident_center) = if swapped {
        (b_iso.pos, a_iso.pos)
    } else {
        (a_iso.pos, b_iso.pos)
    };
    let normal = if (incident_center - reference_center).dot(axis) < 0.0 {
        -axis
    } else {
        axis
    };

    Some(Overlap {
        swapped,
        normal,
        separation,
    })
}

/// The polygon always owns the reference edge, `swapped` marks it as the second shape.
fn polygon_circle(
    vertices: &[Vec2<f64>],
    polygon_iso: Iso,
    radius: f64,
    circle_iso: Iso,
    swapped: bool,
) -> Option<Overlap> {
    let world: WorldVertices = vertices
        .iter()
        .map(|vertex| polygon_iso.translate(*vertex))
        .collect();
    let center = circle_iso.pos;

    let mut smallest = f64::MAX;
    let mut smallest_axis = Vec2::zero();

    for (start, end) in world.iter().copied().circular_tuple_windows() {
        let edge = start - end;
        if edge.magnitude_squared() <= f64::EPSILON {
            continue;
        }
        let axis = perp(edge).normalized();

        let overlap =
            Projection::project(&world, axis).overlap(&Projection::circle(center, radius, axis));

        if overlap < smallest {
            smallest = overlap;
            smallest_axis = axis;

            if overlap <= 0.0 {
                return None;
            }
        }
    }

    let normal = if (center - polygon_iso.pos).dot(smallest_axis) < 0.0 {
        -smallest_axis
    } else {
        smallest_axis
    };

    Some(Overlap {
        swapped,
        normal,
        separation: smallest,
    })
}

/// Degenerate case that doesn't need any axis projection.
fn circle_circle(a_radius: f64, a_iso: Iso, b_radius: f64, b_iso: Iso) -> Option<Overlap> {
    let delta = b_iso.pos - a_iso.pos;
    let radius_sum = a_radius + b_radius;

    let distance_squared = delta.magnitude_squared();
    if distance_squared >= radius_sum * radius_sum {
        return None;
    }

    let distance = distance_squared.sqrt();
    let normal = if distance <= f64::EPSILON {
        // Concentric circles, the push direction is arbitrary
        Vec2::unit_x()
    } else {
        delta / distance
    };

    Some(Overlap {
        swapped: false,
        normal,
        separation: radius_sum - distance,
    })
}

#[cfg(test)]
mod tests {
    use vek::{Extent2, Vec2};

    use crate::{math::Iso, shape::Shape};

    use super::overlap;

    fn square() -> Shape {
        Shape::rect(Extent2::new(2.0, 2.0)).unwrap()
    }

    #[test]
    fn test_separated_squares() {
        let shape = square();

        assert!(overlap(
            &shape,
            Iso::from_pos(Vec2::zero()),
            &shape,
            Iso::from_pos(Vec2::new(3.0, 0.0))
        )
        .is_none());

        // Exactly touching counts as separated
        assert!(overlap(
            &shape,
            Iso::from_pos(Vec2::zero()),
            &shape,
            Iso::from_pos(Vec2::new(2.0, 0.0))
        )
        .is_none());
    }

    #[test]
    fn test_overlapping_squares() {
        let shape = square();

        let result = overlap(
            &shape,
            Iso::from_pos(Vec2::zero()),
            &shape,
            Iso::from_pos(Vec2::new(1.5, 0.0)),
        )
        .unwrap();

        assert!((result.separation - 0.5).abs() < 1e-9, "{result:?}");
        // The normal points from the reference owner towards the other shape
        let direction = if result.swapped { -1.0 } else { 1.0 };
        assert!(result.normal.distance(Vec2::new(direction, 0.0)) < 1e-9, "{result:?}");
    }

    /// Two squares overlap exactly when both axis intervals do.
    #[test]
    fn test_matches_interval_overlap() {
        let shape = square();

        for x in -8..8 {
            for y in -8..8 {
                let offset = Vec2::new(f64::from(x) * 0.3, f64::from(y) * 0.3);
                let expected = offset.x.abs() < 2.0 && offset.y.abs() < 2.0;

                let result = overlap(
                    &shape,
                    Iso::from_pos(Vec2::zero()),
                    &shape,
                    Iso::from_pos(offset),
                );
                assert_eq!(result.is_some(), expected, "offset {offset:?}");
            }
        }
    }

    #[test]
    fn test_reference_owner_has_min_overlap() {
        let big = Shape::rect(Extent2::new(10.0, 10.0)).unwrap();
        let small = square();

        // The small square pokes into the big one from the right
        let result = overlap(
            &big,
            Iso::from_pos(Vec2::zero()),
            &small,
            Iso::from_pos(Vec2::new(5.5, 0.0)),
        )
        .unwrap();

        assert!((result.separation - 0.5).abs() < 1e-9, "{result:?}");
    }

    #[test]
    fn test_polygon_circle() {
        let polygon = square();
        let circle = Shape::circle(1.0).unwrap();

        // Circle dips into the top of the square
        let result = overlap(
            &polygon,
            Iso::from_pos(Vec2::zero()),
            &circle,
            Iso::from_pos(Vec2::new(0.0, 1.5)),
        )
        .unwrap();
        assert!(!result.swapped);
        assert!((result.separation - 0.5).abs() < 1e-9, "{result:?}");
        assert!(result.normal.distance(Vec2::new(0.0, 1.0)) < 1e-9, "{result:?}");

        // Same pair in the other argument order marks the roles as swapped
        let result = overlap(
            &circle,
            Iso::from_pos(Vec2::new(0.0, 1.5)),
            &polygon,
            Iso::from_pos(Vec2::zero()),
        )
        .unwrap();
        assert!(result.swapped);
        assert!(result.normal.distance(Vec2::new(0.0, 1.0)) < 1e-9, "{result:?}");

        // Far away
        assert!(overlap(
            &polygon,
            Iso::from_pos(Vec2::zero()),
            &circle,
            Iso::from_pos(Vec2::new(0.0, 5.0))
        )
        .is_none());
    }

    #[test]
    fn test_circle_circle() {
        let a = Shape::circle(1.0).unwrap();
        let b = Shape::circle(2.0).unwrap();

        let result = overlap(
            &a,
            Iso::from_pos(Vec2::zero()),
            &b,
            Iso::from_pos(Vec2::new(2.0, 0.0)),
        )
        .unwrap();
        assert!((result.separation - 1.0).abs() < 1e-9);
        assert!(result.normal.distance(Vec2::unit_x()) < 1e-9);

        assert!(overlap(
            &a,
            Iso::from_pos(Vec2::zero()),
            &b,
            Iso::from_pos(Vec2::new(3.5, 0.0))
        )
        .is_none());
    }

    #[test]
    fn test_rotated_squares() {
        let shape = square();

        // A diamond high above the square misses it even though the bounding
        // boxes overlap
        let result = overlap(
            &shape,
            Iso::from_pos(Vec2::zero()),
            &shape,
            Iso::new(Vec2::new(2.2, 2.2), 45f64.to_radians()),
        );
        assert!(result.is_none());

        // Moved closer along the diagonal they do overlap
        let result = overlap(
            &shape,
            Iso::from_pos(Vec2::zero()),
            &shape,
            Iso::new(Vec2::new(1.5, 1.5), 45f64.to_radians()),
        );
        assert!(result.is_some());
    }
}
