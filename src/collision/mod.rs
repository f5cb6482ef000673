//! Collision detection, from broad phase pair pruning to contact manifolds.

pub mod broad_phase;
pub mod clip;
pub mod sat;

use arrayvec::ArrayVec;
use vek::Vec2;

/// Result of a narrow phase overlap test between two shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlap {
    /// Whether the reference role landed on the second shape instead of the first.
    pub swapped: bool,
    /// Unit axis pointing from the reference shape towards the other shape.
    ///
    /// Moving the other shape along this axis by `separation` separates the pair.
    pub normal: Vec2<f64>,
    /// Penetration depth, always positive.
    pub separation: f64,
}

/// A single clipped contact pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManifoldPoint {
    /// Point on the reference edge.
    pub on_reference: Vec2<f64>,
    /// Point on the incident edge.
    pub on_incident: Vec2<f64>,
}

/// Contact manifold produced by clipping the incident edge against the reference edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifold {
    /// Up to two clipped contact pairs.
    pub points: ArrayVec<ManifoldPoint, 2>,
    /// Whether the reference edge lies on the first shape passed to the clipper.
    pub reference_on_first: bool,
    /// Index of the reference edge, for debugging.
    pub reference_edge: usize,
    /// Index of the incident edge, for debugging.
    pub incident_edge: usize,
}
