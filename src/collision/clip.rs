//! Sutherland-Hodgman clipping of the incident edge against the reference edge.

use arrayvec::ArrayVec;
use smallvec::SmallVec;
use vek::Vec2;

use crate::{
    math::{line_intersection, nearest_point_on_line, Iso},
    shape::Shape,
};

use super::{Manifold, ManifoldPoint, Overlap};

/// Vertices transformed to world space, inline up to octagons.
type WorldVertices = SmallVec<[Vec2<f64>; 8]>;

/// Where a point lies along a segment when projected onto it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentRegion {
    /// Past the start point.
    Before,
    /// Between both endpoints.
    Inside,
    /// Past the end point.
    After,
}

/// Build the contact manifold for an overlapping pair.
///
/// The first shape must be the one owning the reference edge as reported by
/// the overlap test, reorder the arguments with [`Overlap::swapped`] first.
pub fn manifold(
    reference: &Shape,
    reference_iso: Iso,
    incident: &Shape,
    incident_iso: Iso,
    overlap: &Overlap,
) -> Manifold {
    puffin::profile_function!();

    match (reference, incident) {
        (
            Shape::Polygon {
                vertices: reference_vertices,
            },
            Shape::Polygon {
                vertices: incident_vertices,
            },
        ) => polygon_polygon(
            reference_vertices,
            reference_iso,
            incident_vertices,
            incident_iso,
            overlap.normal,
        ),
        (Shape::Polygon { vertices }, Shape::Circle { radius }) => polygon_circle(
            vertices,
            reference_iso,
            *radius,
            incident_iso,
            overlap.normal,
            true,
        ),
        // The overlap test never puts the reference on a circle of a mixed
        // pair, but clipping the mirrored pair stays well defined
        (Shape::Circle { radius }, Shape::Polygon { vertices }) => polygon_circle(
            vertices,
            incident_iso,
            *radius,
            reference_iso,
            -overlap.normal,
            false,
        ),
        (
            Shape::Circle { radius: reference_radius },
            Shape::Circle { radius: incident_radius },
        ) => circle_circle(
            *reference_radius,
            reference_iso,
            *incident_radius,
            incident_iso,
            overlap.normal,
        ),
    }
}

/// Index of the vertex furthest along `dir`.
fn support_index(world: &[Vec2<f64>], dir: Vec2<f64>) -> usize {
    let mut best_index = 0;
    let mut best_dot = world[0].dot(dir);

    for (index, vertex) in world.iter().enumerate().skip(1) {
        let dot = vertex.dot(dir);
        if dot > best_dot {
            best_dot = dot;
            best_index = index;
        }
    }

    best_index
}

/// Pick the edge around a support point that is most perpendicular to the normal.
///
/// Candidates are the two edges meeting in the support point, the returned
/// index is that of the edge's start vertex.
fn edge_near_support(
    world: &[Vec2<f64>],
    support: usize,
    normal: Vec2<f64>,
) -> (Vec2<f64>, Vec2<f64>, usize) {
    let count = world.len();
    let previous = (support + count - 1) % count;
    let next = (support + 1) % count;
    let support_vertex = world[support];

    let towards_previous = (support_vertex - world[previous]).dot(normal);
    let towards_next = (support_vertex - world[next]).dot(normal);

    if towards_previous.abs() < towards_next.abs() {
        (world[previous], support_vertex, previous)
    } else {
        (support_vertex, world[next], support)
    }
}

/// Projection class of a point relative to the reference segment.
fn segment_region(start: Vec2<f64>, end: Vec2<f64>, point: Vec2<f64>) -> SegmentRegion {
    let edge = end - start;
    let along = (point - start).dot(edge);

    if along < 0.0 {
        SegmentRegion::Before
    } else if along > edge.magnitude_squared() {
        SegmentRegion::After
    } else {
        SegmentRegion::Inside
    }
}

fn polygon_polygon(
    reference: &[Vec2<f64>],
    reference_iso: Iso,
    incident: &[Vec2<f64>],
    incident_iso: Iso,
    normal: Vec2<f64>,
) -> Manifold {
    let reference_world: WorldVertices = reference
        .iter()
        .map(|vertex| reference_iso.translate(*vertex))
        .collect();
    let incident_world: WorldVertices = incident
        .iter()
        .map(|vertex| incident_iso.translate(*vertex))
        .collect();

    let reference_support = support_index(&reference_world, normal);
    let incident_support = support_index(&incident_world, -normal);

    let (mut reference_start, mut reference_end, mut reference_edge) =
        edge_near_support(&reference_world, reference_support, normal);
    let (mut incident_start, mut incident_end, mut incident_edge) =
        edge_near_support(&incident_world, incident_support, normal);

    // The reference edge must be the more perpendicular of the two
    let mut reference_on_first = true;
    let mut normal = normal;
    if (reference_end - reference_start).dot(normal).abs()
        > (incident_end - incident_start).dot(normal).abs()
    {
        std::mem::swap(&mut reference_start, &mut incident_start);
        std::mem::swap(&mut reference_end, &mut incident_end);
        std::mem::swap(&mut reference_edge, &mut incident_edge);
        reference_on_first = false;
        normal = -normal;
    }

    // Clip the incident segment to the slab between the planes through both
    // reference endpoints along the normal, one side at a time
    if segment_region(reference_start, reference_end, incident_start) == SegmentRegion::Before {
        if let Some(point) = line_intersection(
            reference_start,
            reference_start + normal,
            incident_start,
            incident_end,
        ) {
            incident_start = point;
        }
    }
    if segment_region(reference_start, reference_end, incident_end) == SegmentRegion::Before {
        if let Some(point) = line_intersection(
            reference_start,
            reference_start + normal,
            incident_start,
            incident_end,
        ) {
            incident_end = point;
        }
    }
    if segment_region(reference_start, reference_end, incident_start) == SegmentRegion::After {
        if let Some(point) = line_intersection(
            reference_end,
            reference_end + normal,
            incident_start,
            incident_end,
        ) {
            incident_start = point;
        }
    }
    if segment_region(reference_start, reference_end, incident_end) == SegmentRegion::After {
        if let Some(point) = line_intersection(
            reference_end,
            reference_end + normal,
            incident_start,
            incident_end,
        ) {
            incident_end = point;
        }
    }

    // Endpoints past the reference face along the normal are not penetrating
    let start_above = (incident_start - reference_start).dot(normal) > 0.0;
    let end_above = (incident_end - reference_start).dot(normal) > 0.0;

    let mut points = ArrayVec::new();
    if start_above && end_above {
        log::warn!("contact manifold clipped away completely");
    } else {
        if start_above {
            if let Some(point) =
                line_intersection(reference_start, reference_end, incident_start, incident_end)
            {
                incident_start = point;
            }
        } else if end_above {
            if let Some(point) =
                line_intersection(reference_start, reference_end, incident_start, incident_end)
            {
                incident_end = point;
            }
        }

        points.push(ManifoldPoint {
            on_reference: nearest_point_on_line(reference_start, reference_end, incident_start),
            on_incident: incident_start,
        });
        points.push(ManifoldPoint {
            on_reference: nearest_point_on_line(reference_start, reference_end, incident_end),
            on_incident: incident_end,
        });
    }

    Manifold {
        points,
        reference_on_first,
        reference_edge,
        incident_edge,
    }
}

/// Single contact of the circle's deepest point against the polygon face.
///
/// The normal must point from the polygon towards the circle.
fn polygon_circle(
    vertices: &[Vec2<f64>],
    polygon_iso: Iso,
    radius: f64,
    circle_iso: Iso,
    normal: Vec2<f64>,
    reference_on_first: bool,
) -> Manifold {
    let world: WorldVertices = vertices
        .iter()
        .map(|vertex| polygon_iso.translate(*vertex))
        .collect();

    let support = support_index(&world, normal);
    let (reference_start, reference_end, reference_edge) =
        edge_near_support(&world, support, normal);

    let deepest = circle_iso.pos - normal * radius;

    let mut points = ArrayVec::new();
    points.push(ManifoldPoint {
        on_reference: nearest_point_on_line(reference_start, reference_end, deepest),
        on_incident: deepest,
    });

    Manifold {
        points,
        reference_on_first,
        reference_edge,
        incident_edge: 0,
    }
}

/// Single contact on the line between both centers.
fn circle_circle(
    reference_radius: f64,
    reference_iso: Iso,
    incident_radius: f64,
    incident_iso: Iso,
    normal: Vec2<f64>,
) -> Manifold {
    let mut points = ArrayVec::new();
    points.push(ManifoldPoint {
        on_reference: reference_iso.pos + normal * reference_radius,
        on_incident: incident_iso.pos - normal * incident_radius,
    });

    Manifold {
        points,
        reference_on_first: true,
        reference_edge: 0,
        incident_edge: 0,
    }
}
