//! 2D impulse-based rigid body physics.
//!
//! A world of convex rigid bodies (polygons and disks) is advanced under
//! gravity and external forces.
//! Collisions are found with a sweep-and-prune broad phase and a separating
//! axis narrow phase, contact manifolds are produced by Sutherland-Hodgman
//! edge clipping, and contacts are resolved with a sequential impulse solver
//! that persists contacts across frames for warm starting.

pub mod body;
pub mod collision;
pub mod contact;
pub mod math;
pub mod shape;
mod sleeping;
mod solver;
pub mod world;

use miette::Diagnostic;
use thiserror::Error;

pub use body::{Body, BodyId, BodyType};
pub use shape::Shape;
pub use world::{Settings, World};

/// Everything that can go wrong when constructing bodies or stepping the world.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// A polygon needs at least 3 vertices spanning a non-zero area.
    #[error("polygon must have at least 3 non-colinear vertices")]
    InvalidPolygon,
    /// Circles need a positive radius.
    #[error("circle radius must be positive, got {radius}")]
    InvalidRadius {
        /// The rejected radius.
        radius: f64,
    },
    /// Densities must be positive so the mass stays meaningful.
    #[error("body density must be positive, got {density}")]
    InvalidDensity {
        /// The rejected density.
        density: f64,
    },
    /// Stepping backwards or standing still is not supported.
    #[error("time step must be positive, got {dt}")]
    InvalidTimeStep {
        /// The rejected delta time.
        dt: f64,
    },
}
