//! Rigid bodies and their integration.

use vek::{Aabr, Vec2};

use crate::{
    math::{perp_dot, Iso, Rotation},
    shape::Shape,
    Error,
};

/// Stable handle to a body inside a [`crate::World`].
///
/// Ids are allocated from a monotonic counter starting at 1 and recycled
/// through a small stack when bodies are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub(crate) u32);

/// How a body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyType {
    /// Immovable, infinite effective mass, velocities forced to zero.
    Static,
    /// Fully simulated, receives gravity.
    #[default]
    Dynamic,
    /// Integrated from user forces only, gravity is skipped.
    Kinematic,
    /// Hint for fast moving bodies, currently treated as [`Self::Dynamic`].
    Bullet,
}

/// Represents any physics object that can collide and exchange impulses.
#[derive(Debug, Clone)]
pub struct Body {
    /// Handle identifying this body in its world.
    id: BodyId,
    /// Collision shape.
    shape: Shape,
    /// Participation mode.
    body_type: BodyType,
    /// Only bodies with intersecting masks collide.
    bitmask: u32,
    /// Global position.
    pub(crate) position: Vec2<f64>,
    /// Orientation.
    pub(crate) rotation: Rotation,
    /// Velocity.
    pub(crate) velocity: Vec2<f64>,
    /// Angular velocity in radians.
    pub(crate) angular_velocity: f64,
    /// Accumulated user force, cleared at the end of every step.
    force: Vec2<f64>,
    /// Accumulated user torque, cleared at the end of every step.
    torque: f64,
    /// Surface friction coefficient.
    friction: f64,
    /// Bounciness factor in the 0..=1 range.
    restitution: f64,
    /// Mass per surface area.
    density: f64,
    /// Surface area, cached when the shape is assigned.
    area: f64,
    /// Mass, product of density and area.
    mass: f64,
    /// Inverse of the mass, zero for infinite mass.
    inv_mass: f64,
    /// Inertia tensor, corresponds to mass in rotational terms.
    inertia: f64,
    /// Inverse of the inertia, zero for infinite inertia.
    inv_inertia: f64,
    /// Cached world-space bounding rectangle, refreshed by the broad phase.
    bound: Aabr<f64>,
    /// Whether the body is excluded from integration until woken.
    pub(crate) is_sleeping: bool,
    /// How many consecutive steps the body has been nearly motionless.
    pub(crate) sleep_counter: u32,
    /// Biased rolling estimate of recent movement.
    pub(crate) motion: f64,
    /// Movement estimate of the previous step.
    pub(crate) prev_motion: f64,
}

impl Body {
    /// Construct a dynamic body around a shape.
    pub(crate) fn new(id: BodyId, shape: Shape, position: Vec2<f64>) -> Self {
        let area = shape.area();
        let density = 1.0;
        let bound = shape.aabr(Iso::from_pos(position));

        let mut body = Self {
            id,
            shape,
            body_type: BodyType::default(),
            bitmask: 1,
            position,
            rotation: Rotation::default(),
            velocity: Vec2::zero(),
            angular_velocity: 0.0,
            force: Vec2::zero(),
            torque: 0.0,
            friction: 0.01,
            restitution: 0.01,
            density,
            area,
            mass: 0.0,
            inv_mass: 0.0,
            inertia: 0.0,
            inv_inertia: 0.0,
            bound,
            is_sleeping: false,
            sleep_counter: 0,
            motion: 0.0,
            prev_motion: 0.0,
        };
        body.refresh_mass();

        body
    }

    /// Handle of this body.
    pub fn id(&self) -> BodyId {
        self.id
    }

    /// Collision shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Participation mode.
    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    /// Change the participation mode, updating the effective mass.
    pub fn set_body_type(&mut self, body_type: BodyType) {
        self.body_type = body_type;
        if body_type == BodyType::Static {
            self.velocity = Vec2::zero();
            self.angular_velocity = 0.0;
        }
        self.refresh_mass();
    }

    /// Collision filter, only bodies with intersecting masks collide.
    pub fn bitmask(&self) -> u32 {
        self.bitmask
    }

    /// Set the collision filter.
    pub fn set_bitmask(&mut self, bitmask: u32) {
        self.bitmask = bitmask;
    }

    /// Global position.
    pub fn position(&self) -> Vec2<f64> {
        self.position
    }

    /// Set the global position.
    pub fn set_position(&mut self, position: Vec2<f64>) {
        self.position = position;
    }

    /// Rotation in radians.
    pub fn rotation(&self) -> f64 {
        self.rotation.to_radians()
    }

    /// Set the rotation in radians.
    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = Rotation::from_radians(rotation);
    }

    /// Velocity.
    pub fn velocity(&self) -> Vec2<f64> {
        self.velocity
    }

    /// Set the velocity.
    pub fn set_velocity(&mut self, velocity: Vec2<f64>) {
        self.velocity = velocity;
    }

    /// Angular velocity in radians.
    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    /// Set the angular velocity in radians.
    pub fn set_angular_velocity(&mut self, angular_velocity: f64) {
        self.angular_velocity = angular_velocity;
    }

    /// Surface friction coefficient.
    pub fn friction(&self) -> f64 {
        self.friction
    }

    /// Set the surface friction coefficient.
    pub fn set_friction(&mut self, friction: f64) {
        self.friction = friction;
    }

    /// Bounciness factor.
    pub fn restitution(&self) -> f64 {
        self.restitution
    }

    /// Set the bounciness factor.
    pub fn set_restitution(&mut self, restitution: f64) {
        self.restitution = restitution;
    }

    /// Mass per surface area.
    pub fn density(&self) -> f64 {
        self.density
    }

    /// Change the density, recalculating mass and inertia.
    pub fn set_density(&mut self, density: f64) -> Result<(), Error> {
        if density <= 0.0 {
            return Err(Error::InvalidDensity { density });
        }

        self.density = density;
        self.refresh_mass();

        Ok(())
    }

    /// Mass of the body.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Inverse of the mass, zero when the body is effectively infinitely heavy.
    pub fn inv_mass(&self) -> f64 {
        self.inv_mass
    }

    /// Inverse of the inertia tensor.
    pub fn inv_inertia(&self) -> f64 {
        self.inv_inertia
    }

    /// Whether the body is currently asleep.
    pub fn is_sleeping(&self) -> bool {
        self.is_sleeping
    }

    /// Cached world-space bounding rectangle.
    ///
    /// Refreshed at the start of every broad phase pass.
    pub fn bound(&self) -> Aabr<f64> {
        self.bound
    }

    /// World transform of the body.
    pub fn iso(&self) -> Iso {
        Iso::new(self.position, self.rotation)
    }

    /// Calculate the world position of a point in the body's local frame.
    pub fn local_to_world(&self, point: Vec2<f64>) -> Vec2<f64> {
        self.iso().translate(point)
    }

    /// Map a world position into the body's local frame.
    pub fn world_to_local(&self, point: Vec2<f64>) -> Vec2<f64> {
        self.iso().inverse_translate(point)
    }

    /// Apply an impulse at an offset `r` from the center of mass.
    ///
    /// Wakes the body, a sleeping body would never notice the velocity change
    /// otherwise.
    pub fn apply_impulse(&mut self, impulse: Vec2<f64>, r: Vec2<f64>) {
        self.wake();
        self.apply_contact_impulse(impulse, r);
    }

    /// Accumulate a force applied at an offset `r` from the center of mass.
    ///
    /// The force is integrated at the next step and cleared afterwards.
    pub fn apply_force(&mut self, force: Vec2<f64>, r: Vec2<f64>) {
        self.force += force;
        self.torque += perp_dot(r, force);
    }

    /// Impulse application without the wake-up, used by the contact solver.
    ///
    /// Sleeping bodies do not accumulate solver impulses.
    pub(crate) fn apply_contact_impulse(&mut self, impulse: Vec2<f64>, r: Vec2<f64>) {
        if self.is_sleeping {
            return;
        }

        self.velocity += impulse * self.inv_mass;
        self.angular_velocity += self.inv_inertia * perp_dot(r, impulse);
    }

    /// Advance the velocities from gravity and the accumulated user forces.
    ///
    /// Damping reduces numerical instability, its factor is `1 / (1 + dt * damping)`.
    pub(crate) fn integrate_velocity(
        &mut self,
        gravity: Vec2<f64>,
        linear_damping: f64,
        angular_damping: f64,
        dt: f64,
    ) {
        if self.is_sleeping {
            return;
        }

        let linear_factor = 1.0 / (1.0 + dt * linear_damping);
        let angular_factor = 1.0 / (1.0 + dt * angular_damping);

        match self.body_type {
            BodyType::Static => {
                self.velocity = Vec2::zero();
                self.angular_velocity = 0.0;
            }
            BodyType::Dynamic | BodyType::Bullet => {
                // Gravity is mixed in here instead of the accumulator so the
                // force accumulator only ever holds user forces
                let force = self.force + gravity * self.mass;

                self.velocity += force * (self.inv_mass * dt);
                self.angular_velocity += self.inv_inertia * self.torque * dt;

                self.velocity *= linear_factor;
                self.angular_velocity *= angular_factor;
            }
            BodyType::Kinematic => {
                self.velocity += self.force * (self.inv_mass * dt);
                self.angular_velocity += self.inv_inertia * self.torque * dt;

                self.velocity *= linear_factor;
                self.angular_velocity *= angular_factor;
            }
        }
    }

    /// Advance the pose from the velocities, recording the motion estimate for
    /// the sleep detector.
    pub(crate) fn integrate_position(&mut self, dt: f64) {
        if self.body_type == BodyType::Static || self.is_sleeping {
            return;
        }

        let delta = self.velocity * dt;
        let delta_rotation = self.angular_velocity * dt;

        self.position += delta;
        self.rotation += delta_rotation;

        self.motion = delta.magnitude_squared() + delta_rotation * delta_rotation;
    }

    /// Refresh the cached world-space bounding rectangle.
    pub(crate) fn update_bound(&mut self) {
        self.bound = self.shape.aabr(self.iso());
    }

    /// Clear the force and torque accumulators.
    pub(crate) fn clear_forces(&mut self) {
        self.force = Vec2::zero();
        self.torque = 0.0;
    }

    /// Whether any user force or torque is waiting to be integrated.
    pub(crate) fn has_user_force(&self) -> bool {
        self.force != Vec2::zero() || self.torque != 0.0
    }

    /// Pull the body out of sleep.
    pub(crate) fn wake(&mut self) {
        if self.body_type != BodyType::Static {
            self.is_sleeping = false;
            self.sleep_counter = 0;
        }
    }

    /// Put the body to sleep, clearing all movement.
    pub(crate) fn fall_asleep(&mut self, sleep_counter: u32) {
        if self.body_type == BodyType::Kinematic {
            return;
        }

        self.is_sleeping = true;
        self.sleep_counter = sleep_counter;
        self.velocity = Vec2::zero();
        self.angular_velocity = 0.0;
        self.motion = 0.0;
    }

    /// Recalculate mass and inertia with their reciprocals.
    fn refresh_mass(&mut self) {
        if self.body_type == BodyType::Static {
            self.inv_mass = 0.0;
            self.inv_inertia = 0.0;
            return;
        }

        self.mass = self.density * self.area;
        self.inertia = self.shape.inertia(self.mass);
        self.inv_mass = if self.mass <= 0.0 {
            0.0
        } else {
            self.mass.recip()
        };
        self.inv_inertia = if self.inertia <= 0.0 {
            0.0
        } else {
            self.inertia.recip()
        };
    }
}

/// Mutably borrow two distinct bodies from the same list.
pub(crate) fn two_mut(bodies: &mut [Body], a: usize, b: usize) -> (&mut Body, &mut Body) {
    debug_assert_ne!(a, b);

    if a < b {
        let (head, tail) = bodies.split_at_mut(b);
        (&mut head[a], &mut tail[0])
    } else {
        let (head, tail) = bodies.split_at_mut(a);
        let (second, first) = (&mut head[b], &mut tail[0]);
        (first, second)
    }
}
