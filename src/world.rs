//! World owning all bodies and contacts, stepping the whole simulation.

use arrayvec::ArrayVec;
use hashbrown::HashMap;
use serde::Deserialize;
use vek::{Extent2, Vec2};

use crate::{
    body::{self, Body, BodyId},
    collision::{broad_phase, clip, sat},
    contact::{self, ContactPair},
    shape::Shape,
    sleeping, solver, Error,
};

/// How many freed body ids are kept around for reuse.
const MAX_RECYCLED_IDS: usize = 128;

/// Tuning parameters of the simulation.
///
/// Deserializable so hosts can hot-reload them from a settings file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Acceleration applied to every dynamic body each step.
    pub gravity: Vec2<f64>,
    /// Solver passes over the contact velocities.
    pub velocity_iterations: u32,
    /// Solver passes over the positional overlap correction.
    pub position_iterations: u32,
    /// Penetration depth absorbed without correction to avoid jitter.
    pub position_slop: f64,
    /// How much of the positional error is fed back into the solver.
    pub bias_factor: f64,
    /// Minimum squared distance between a new contact's points for it to be accepted.
    pub rest_factor: f64,
    /// Damping applied to linear velocities every step.
    pub linear_damping: f64,
    /// Damping applied to angular velocities every step.
    pub angular_damping: f64,
    /// Whether resting bodies are put to sleep.
    pub enable_sleeping: bool,
    /// Bodies moving less than this (scaled by the cubed time step) accumulate sleepiness.
    pub sleep_motion_threshold: f64,
    /// A sleeping body is woken when a touching body moves more than this.
    pub wake_motion_threshold: f64,
    /// How many consecutive calm steps are needed before a body falls asleep.
    pub sleep_counter_threshold: u32,
    /// Bias of the rolling motion average towards the smaller of two frames.
    pub motion_bias: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gravity: Vec2::zero(),
            velocity_iterations: 14,
            position_iterations: 12,
            position_slop: 0.04,
            bias_factor: 0.4,
            rest_factor: 1.0,
            linear_damping: 0.9,
            angular_damping: 0.9,
            enable_sleeping: false,
            sleep_motion_threshold: 0.08,
            wake_motion_threshold: 0.18,
            sleep_counter_threshold: 60,
            motion_bias: 0.9,
        }
    }
}

/// Physics simulation state.
///
/// Owns every body and all persistent contacts between them.
/// Worlds are fully independent, any number can be stepped side by side.
pub struct World {
    /// Tuning parameters, free to change between steps.
    pub settings: Settings,
    /// All bodies, reordered by the broad phase every step.
    bodies: Vec<Body>,
    /// Persistent contact buckets keyed by the unordered body pair.
    contacts: HashMap<u64, ContactPair>,
    /// Cache of broad phase pairs.
    ///
    /// This is a performance optimization so the vector doesn't have to be
    /// allocated every step.
    broad_phase_pairs: Vec<(usize, usize)>,
    /// Body list index per id, rebuilt after the broad phase sort.
    index_by_id: HashMap<BodyId, usize>,
    /// Next body id to hand out.
    next_id: u32,
    /// Freed ids waiting for reuse, ids released while full are dropped.
    recycled_ids: ArrayVec<BodyId, MAX_RECYCLED_IDS>,
}

impl World {
    /// Create an empty world with default settings.
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Create an empty world with the given settings.
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            bodies: Vec::new(),
            contacts: HashMap::new(),
            broad_phase_pairs: Vec::new(),
            index_by_id: HashMap::new(),
            next_id: 1,
            recycled_ids: ArrayVec::new(),
        }
    }

    /// Add a dynamic polygon body.
    ///
    /// The vertices may be in any winding order and don't need to be centered,
    /// the shape is normalized at construction.
    pub fn add_polygon(
        &mut self,
        position: Vec2<f64>,
        vertices: impl Into<Vec<Vec2<f64>>>,
    ) -> Result<BodyId, Error> {
        let shape = Shape::polygon(vertices)?;

        Ok(self.add_body(shape, position))
    }

    /// Add a dynamic rectangle body.
    pub fn add_rect(
        &mut self,
        position: Vec2<f64>,
        size: Extent2<f64>,
        rotation: f64,
    ) -> Result<BodyId, Error> {
        let shape = Shape::rect(size)?;

        let id = self.add_body(shape, position);
        if let Some(body) = self.body_mut(id) {
            body.set_rotation(rotation);
        }

        Ok(id)
    }

    /// Add a dynamic circle body.
    pub fn add_circle(&mut self, position: Vec2<f64>, radius: f64) -> Result<BodyId, Error> {
        let shape = Shape::circle(radius)?;

        Ok(self.add_body(shape, position))
    }

    /// Remove a body, dropping all contacts it participates in.
    ///
    /// Returns whether the body existed.
    pub fn remove(&mut self, id: BodyId) -> bool {
        let Some(index) = self.bodies.iter().position(|body| body.id() == id) else {
            return false;
        };

        log::debug!("removing body {id:?}");

        self.bodies.swap_remove(index);
        self.contacts.retain(|_, pair| pair.a != id && pair.b != id);

        // Hand the id out again later, unless the recycle stack is full
        let _ = self.recycled_ids.try_push(id);

        true
    }

    /// Look up a body by its id.
    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|body| body.id() == id)
    }

    /// Look up a body by its id for mutation.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|body| body.id() == id)
    }

    /// Iterator over all bodies.
    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    /// Amount of bodies currently registered.
    pub fn body_amount(&self) -> usize {
        self.bodies.len()
    }

    /// Iterator over all persistent contact buckets, for debugging and drawing.
    pub fn contact_pairs(&self) -> impl Iterator<Item = &ContactPair> {
        self.contacts.values()
    }

    /// Simulate a single step.
    ///
    /// Fails when the time step is not a positive finite number.
    pub fn step(&mut self, dt: f64) -> Result<(), Error> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(Error::InvalidTimeStep { dt });
        }

        puffin::profile_scope!("Physics step");

        // Integrate gravity, user forces and damping into the velocities
        self.step_velocity(dt);

        // Find all collisions and merge them into the persistent contacts
        self.retrieve_collision_info();

        // Wake sleeping bodies hit by a moving partner so the solver phases
        // below resolve the fresh contact this very step
        sleeping::wake_after_collision(
            &mut self.bodies,
            &self.contacts,
            &self.index_by_id,
            &self.settings,
            dt,
        );

        // Resolve the contact velocities
        self.solve_velocity(dt);

        // Integrate the velocities into the poses
        self.step_position(dt);

        // Push remaining overlap out directly
        self.solve_position(dt);

        // Sleep bookkeeping on the fresh motion values
        sleeping::update(&mut self.bodies, &self.settings, dt);

        self.clear_forces();
        self.inactivate_contacts();

        Ok(())
    }

    fn add_body(&mut self, shape: Shape, position: Vec2<f64>) -> BodyId {
        let id = self.allocate_id();
        log::debug!("adding body {id:?}");

        self.bodies.push(Body::new(id, shape, position));

        id
    }

    fn allocate_id(&mut self) -> BodyId {
        if let Some(id) = self.recycled_ids.pop() {
            return id;
        }

        let id = BodyId(self.next_id);
        self.next_id += 1;

        id
    }

    fn step_velocity(&mut self, dt: f64) {
        puffin::profile_scope!("Integrate velocities");

        let gravity = self.settings.gravity;
        let linear_damping = self.settings.linear_damping;
        let angular_damping = self.settings.angular_damping;

        for body in &mut self.bodies {
            body.integrate_velocity(gravity, linear_damping, angular_damping, dt);
        }
    }

    /// Broad phase into narrow phase, merging every found contact point into
    /// the persistent store and preparing it for the solver.
    fn retrieve_collision_info(&mut self) {
        puffin::profile_scope!("Collision detection");

        let mut pairs = std::mem::take(&mut self.broad_phase_pairs);
        broad_phase::sweep_and_prune(&mut self.bodies, &mut pairs);

        // The broad phase reordered the body list
        self.index_by_id.clear();
        for (index, body) in self.bodies.iter().enumerate() {
            self.index_by_id.insert(body.id(), index);
        }

        for &(first, second) in &pairs {
            self.process_pair(first, second);
        }

        self.broad_phase_pairs = pairs;
    }

    /// Narrow phase for a single broad phase pair.
    fn process_pair(&mut self, first: usize, second: usize) {
        puffin::profile_scope!("Narrow collision");

        let a = &self.bodies[first];
        let b = &self.bodies[second];

        let Some(overlap) = sat::overlap(a.shape(), a.iso(), b.shape(), b.iso()) else {
            return;
        };

        // Reorder so the shape owning the reference edge comes first
        let (reference_index, incident_index) = if overlap.swapped {
            (second, first)
        } else {
            (first, second)
        };

        let reference = &self.bodies[reference_index];
        let incident = &self.bodies[incident_index];
        let manifold = clip::manifold(
            reference.shape(),
            reference.iso(),
            incident.shape(),
            incident.iso(),
            &overlap,
        );

        // The clipper swaps the roles once more when the incident edge turns
        // out to be the more perpendicular one
        let (near_index, far_index, normal) = if manifold.reference_on_first {
            (reference_index, incident_index, overlap.normal)
        } else {
            (incident_index, reference_index, -overlap.normal)
        };

        for point in &manifold.points {
            // Canonical contact orientation, A is the body with the smaller id
            let (a_index, b_index, pa, pb, normal) =
                if self.bodies[near_index].id() < self.bodies[far_index].id() {
                    (
                        near_index,
                        far_index,
                        point.on_reference,
                        point.on_incident,
                        normal,
                    )
                } else {
                    (
                        far_index,
                        near_index,
                        point.on_incident,
                        point.on_reference,
                        -normal,
                    )
                };

            // No real separation to resolve
            if pa.distance_squared(pb) <= self.settings.rest_factor {
                continue;
            }

            let a_id = self.bodies[a_index].id();
            let b_id = self.bodies[b_index].id();

            let bucket = self
                .contacts
                .entry(contact::pair_key(a_id, b_id))
                .or_insert_with(|| ContactPair::new(a_id, b_id));
            let contact = bucket.merge_point(pa, pb, normal, overlap.separation);

            let (body_a, body_b) = body::two_mut(&mut self.bodies, a_index, b_index);
            solver::prepare(contact, body_a, body_b);
        }
    }

    fn solve_velocity(&mut self, dt: f64) {
        puffin::profile_scope!("Solve velocities");

        for _ in 0..self.settings.velocity_iterations {
            for pair in self.contacts.values_mut() {
                let (Some(&a_index), Some(&b_index)) =
                    (self.index_by_id.get(&pair.a), self.index_by_id.get(&pair.b))
                else {
                    continue;
                };
                let (body_a, body_b) = body::two_mut(&mut self.bodies, a_index, b_index);

                for contact in pair.contacts.iter_mut().filter(|contact| contact.is_active) {
                    let normal_impulse =
                        solver::normal_impulse(contact, body_a, body_b, &self.settings, dt);
                    solver::tangent_impulse(contact, body_a, body_b, normal_impulse);
                }
            }
        }
    }

    fn step_position(&mut self, dt: f64) {
        puffin::profile_scope!("Integrate positions");

        for body in &mut self.bodies {
            body.integrate_position(dt);
        }
    }

    fn solve_position(&mut self, dt: f64) {
        puffin::profile_scope!("Solve positions");

        for _ in 0..self.settings.position_iterations {
            for pair in self.contacts.values_mut() {
                let (Some(&a_index), Some(&b_index)) =
                    (self.index_by_id.get(&pair.a), self.index_by_id.get(&pair.b))
                else {
                    continue;
                };
                let (body_a, body_b) = body::two_mut(&mut self.bodies, a_index, b_index);

                for contact in pair.contacts.iter_mut().filter(|contact| contact.is_active) {
                    solver::position_correction(contact, body_a, body_b, &self.settings, dt);
                }
            }
        }
    }

    fn clear_forces(&mut self) {
        for body in &mut self.bodies {
            body.clear_forces();
        }
    }

    fn inactivate_contacts(&mut self) {
        for pair in self.contacts.values_mut() {
            for contact in pair.contacts.iter_mut() {
                contact.is_active = false;
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use vek::{Extent2, Vec2};

    use crate::{
        body::{BodyId, BodyType},
        world::{Settings, World},
    };

    const DT: f64 = 1.0 / 60.0;

    /// World with gravity pointing down the y axis and contact acceptance
    /// tuned for unit-sized bodies.
    fn world_with_gravity() -> World {
        World::with_settings(Settings {
            gravity: Vec2::new(0.0, 9.8),
            rest_factor: 0.0,
            ..Settings::default()
        })
    }

    /// Static 20x1 floor with its top surface at y = 9.5.
    fn add_floor(world: &mut World) -> BodyId {
        let floor = world
            .add_rect(Vec2::new(0.0, 10.0), Extent2::new(20.0, 1.0), 0.0)
            .unwrap();
        world
            .body_mut(floor)
            .unwrap()
            .set_body_type(BodyType::Static);

        floor
    }

    #[test]
    fn test_invalid_time_step() {
        let mut world = World::new();

        assert!(world.step(0.0).is_err());
        assert!(world.step(-1.0).is_err());
        assert!(world.step(f64::NAN).is_err());
        assert!(world.step(DT).is_ok());
    }

    #[test]
    fn test_id_allocation_and_recycling() {
        let mut world = World::new();

        let first = world.add_circle(Vec2::zero(), 1.0).unwrap();
        let second = world.add_circle(Vec2::new(5.0, 0.0), 1.0).unwrap();
        assert_eq!(first, BodyId(1));
        assert_eq!(second, BodyId(2));

        // A removed id is handed out again
        assert!(world.remove(first));
        assert!(!world.remove(first));
        let third = world.add_circle(Vec2::new(10.0, 0.0), 1.0).unwrap();
        assert_eq!(third, first);

        assert_eq!(world.body_amount(), 2);
    }

    #[test]
    fn test_remove_prunes_contacts() {
        let mut world = world_with_gravity();
        let floor = add_floor(&mut world);
        let rect = world
            .add_rect(Vec2::new(0.0, 9.0), Extent2::new(1.0, 1.0), 0.0)
            .unwrap();

        for _ in 0..30 {
            world.step(DT).unwrap();
        }
        assert!(world.contact_pairs().count() > 0);

        world.remove(rect);
        assert_eq!(world.contact_pairs().count(), 0);

        // Stepping afterwards must not resurrect anything
        world.step(DT).unwrap();
        assert_eq!(world.contact_pairs().count(), 0);
        assert!(world.body(floor).is_some());
    }

    /// A falling rectangle comes to rest on a static floor.
    #[test]
    fn test_resting_block() {
        let mut world = world_with_gravity();
        let floor = add_floor(&mut world);
        let rect = world
            .add_rect(Vec2::new(0.0, 0.0), Extent2::new(1.0, 1.0), 0.0)
            .unwrap();
        {
            let body = world.body_mut(rect).unwrap();
            body.set_friction(0.2);
            body.set_restitution(0.0);
        }

        let floor_position = world.body(floor).unwrap().position();

        for _ in 0..300 {
            world.step(DT).unwrap();
        }

        let body = world.body(rect).unwrap();
        assert!(
            (body.position().y - 9.0).abs() < 0.1,
            "resting height {}",
            body.position().y
        );
        assert!(
            body.velocity().magnitude() < 0.05,
            "resting speed {}",
            body.velocity().magnitude()
        );

        // The static floor never moved
        let floor = world.body(floor).unwrap();
        assert_eq!(floor.position(), floor_position);
        assert_eq!(floor.rotation(), 0.0);
        assert_eq!(floor.velocity(), Vec2::zero());
    }

    /// A disk with full restitution bounces off a wall keeping its speed.
    #[test]
    fn test_elastic_bounce() {
        let mut world = World::with_settings(Settings {
            rest_factor: 0.0,
            // Pure restitution, no damping or positional feedback on top
            linear_damping: 0.0,
            angular_damping: 0.0,
            bias_factor: 0.0,
            ..Settings::default()
        });

        let disk = world.add_circle(Vec2::new(-5.0, 0.0), 1.0).unwrap();
        {
            let body = world.body_mut(disk).unwrap();
            body.set_velocity(Vec2::new(5.0, 0.0));
            body.set_restitution(1.0);
        }

        let wall = world
            .add_rect(Vec2::new(5.5, 0.0), Extent2::new(1.0, 10.0), 0.0)
            .unwrap();
        {
            let body = world.body_mut(wall).unwrap();
            body.set_body_type(BodyType::Static);
            body.set_restitution(1.0);
        }

        for _ in 0..150 {
            world.step(DT).unwrap();
        }

        let body = world.body(disk).unwrap();
        // Reflected within 2%
        assert!(
            (body.velocity().x + 5.0).abs() < 0.1,
            "velocity after bounce {:?}",
            body.velocity()
        );
        assert!(body.position().x < 5.0);
    }

    /// Three stacked rectangles come to rest without sinking into each other.
    #[test]
    fn test_stack_of_three() {
        let mut world = world_with_gravity();
        add_floor(&mut world);

        let mut rects = Vec::new();
        for level in 0..3 {
            let rect = world
                .add_rect(
                    Vec2::new(0.0, 9.0 - f64::from(level)),
                    Extent2::new(1.0, 1.0),
                    0.0,
                )
                .unwrap();
            world.body_mut(rect).unwrap().set_friction(0.4);
            rects.push(rect);
        }

        for _ in 0..600 {
            world.step(DT).unwrap();
        }

        // The top of the stack rests around its starting height
        let top = world.body(rects[2]).unwrap();
        assert!(
            (top.position().y - 7.0).abs() < 0.15,
            "top resting height {}",
            top.position().y
        );
        assert!(
            top.velocity().magnitude() < 0.1,
            "top resting speed {}",
            top.velocity().magnitude()
        );

        // Nobody fell through anybody
        for pair in rects.windows(2) {
            let below = world.body(pair[0]).unwrap().position().y;
            let above = world.body(pair[1]).unwrap().position().y;
            assert!(below - above > 0.8, "stack heights {below} vs {above}");
        }
    }

    /// Friction brings a sliding rectangle to a halt.
    #[test]
    fn test_friction_stop() {
        let mut world = world_with_gravity();
        // Leave deceleration to friction alone
        world.settings.linear_damping = 0.0;
        world.settings.angular_damping = 0.0;
        let floor = add_floor(&mut world);
        world.body_mut(floor).unwrap().set_friction(0.5);

        let rect = world
            .add_rect(Vec2::new(-8.0, 9.0), Extent2::new(1.0, 1.0), 0.0)
            .unwrap();
        {
            let body = world.body_mut(rect).unwrap();
            body.set_friction(0.5);
            body.set_restitution(0.0);
            body.set_velocity(Vec2::new(10.0, 0.0));
        }

        // Stopping time is bounded by v / (mu * g), with 10% leeway
        let expected_steps = (10.0 / (0.5 * 9.8) / DT * 1.1) as usize;

        let mut previous_speed = f64::MAX;
        for _ in 0..expected_steps {
            world.step(DT).unwrap();

            let body = world.body(rect).unwrap();

            // The horizontal speed never increases
            let speed = body.velocity().x.abs();
            assert!(speed <= previous_speed + 1e-6, "speed went up to {speed}");
            previous_speed = speed;

            // Impulse accumulators stay inside their bounds the whole time
            for pair in world.contact_pairs() {
                for contact in &pair.contacts {
                    assert!(contact.normal_impulse >= 0.0);
                    assert!(
                        contact.tangent_impulse.abs() <= 0.5 * contact.normal_impulse + 1e-9,
                        "tangent {} exceeds friction cone of {}",
                        contact.tangent_impulse,
                        contact.normal_impulse
                    );
                }
            }
        }

        let body = world.body(rect).unwrap();
        assert!(
            body.velocity().x.abs() < 0.1,
            "speed after sliding {:?}",
            body.velocity()
        );
    }

    /// Resting bodies fall asleep and an impulse wakes the whole stack.
    #[test]
    fn test_sleep_and_wake() {
        let mut world = world_with_gravity();
        world.settings.enable_sleeping = true;
        add_floor(&mut world);

        let bottom = world
            .add_rect(Vec2::new(0.0, 9.0), Extent2::new(1.0, 1.0), 0.0)
            .unwrap();
        let top = world
            .add_rect(Vec2::new(0.0, 8.0), Extent2::new(1.0, 1.0), 0.0)
            .unwrap();

        for _ in 0..400 {
            world.step(DT).unwrap();
        }

        assert!(world.body(bottom).unwrap().is_sleeping());
        assert!(world.body(top).unwrap().is_sleeping());
        assert_eq!(world.body(top).unwrap().velocity(), Vec2::zero());

        // A sideways shove on the top box wakes it immediately
        world
            .body_mut(top)
            .unwrap()
            .apply_impulse(Vec2::new(2.0, 0.0), Vec2::zero());
        assert!(!world.body(top).unwrap().is_sleeping());

        // And propagates to the box below through their contact, one step to
        // register the shoved box's motion and one for the wake check to see it
        world.step(DT).unwrap();
        world.step(DT).unwrap();
        assert!(!world.body(bottom).unwrap().is_sleeping());
    }

    /// A moving body crashing into a sleeper wakes it and pushes it along.
    #[test]
    fn test_collision_wakes_sleeper() {
        let mut world = world_with_gravity();
        world.settings.enable_sleeping = true;
        add_floor(&mut world);

        let sleeper = world
            .add_rect(Vec2::new(0.0, 9.0), Extent2::new(1.0, 1.0), 0.0)
            .unwrap();

        for _ in 0..300 {
            world.step(DT).unwrap();
        }
        assert!(world.body(sleeper).unwrap().is_sleeping());

        // Slide a second box into the sleeping one
        let projectile = world
            .add_rect(Vec2::new(-3.0, 9.0), Extent2::new(1.0, 1.0), 0.0)
            .unwrap();
        world
            .body_mut(projectile)
            .unwrap()
            .set_velocity(Vec2::new(5.0, 0.0));

        for _ in 0..60 {
            world.step(DT).unwrap();
        }

        // The impact woke the sleeper and the same-step impulses moved it
        let sleeper = world.body(sleeper).unwrap();
        assert!(!sleeper.is_sleeping());
        assert!(
            sleeper.position().x > 0.01,
            "sleeper was never pushed, x {}",
            sleeper.position().x
        );
    }

    /// Bodies with disjoint filter masks pass through each other.
    #[test]
    fn test_bitmask_filter() {
        let mut world = World::with_settings(Settings {
            rest_factor: 0.0,
            ..Settings::default()
        });

        let a = world
            .add_rect(Vec2::new(0.0, 0.0), Extent2::new(2.0, 2.0), 0.0)
            .unwrap();
        let b = world
            .add_rect(Vec2::new(0.5, 0.0), Extent2::new(2.0, 2.0), 0.0)
            .unwrap();
        world.body_mut(a).unwrap().set_bitmask(0b01);
        world.body_mut(b).unwrap().set_bitmask(0b10);

        for _ in 0..10 {
            world.step(DT).unwrap();
        }

        // No bucket was ever created and no impulse was applied
        assert_eq!(world.bodies().count(), 2);
        assert_eq!(world.contact_pairs().count(), 0);
        assert_eq!(world.body(a).unwrap().velocity(), Vec2::zero());
        assert_eq!(world.body(b).unwrap().velocity(), Vec2::zero());
    }

    /// Every unordered pair maps to at most one bucket.
    #[test]
    fn test_contact_bucket_uniqueness() {
        let mut world = world_with_gravity();
        add_floor(&mut world);
        for level in 0..3 {
            world
                .add_rect(
                    Vec2::new(0.0, 9.0 - f64::from(level)),
                    Extent2::new(1.0, 1.0),
                    0.0,
                )
                .unwrap();
        }

        for _ in 0..60 {
            world.step(DT).unwrap();
        }

        let mut pairs: Vec<(BodyId, BodyId)> = world
            .contact_pairs()
            .map(|pair| {
                assert!(pair.a < pair.b);
                (pair.a, pair.b)
            })
            .collect();
        pairs.sort();
        pairs.dedup();
        assert_eq!(pairs.len(), world.contact_pairs().count());
    }

    /// Kinematic bodies ignore gravity but keep their velocity.
    #[test]
    fn test_kinematic_ignores_gravity() {
        let mut world = world_with_gravity();
        world.settings.linear_damping = 0.0;

        let kinematic = world
            .add_rect(Vec2::new(0.0, 0.0), Extent2::new(1.0, 1.0), 0.0)
            .unwrap();
        {
            let body = world.body_mut(kinematic).unwrap();
            body.set_body_type(BodyType::Kinematic);
            body.set_velocity(Vec2::new(1.0, 0.0));
        }

        for _ in 0..60 {
            world.step(DT).unwrap();
        }

        let body = world.body(kinematic).unwrap();
        assert_eq!(body.velocity(), Vec2::new(1.0, 0.0));
        assert!((body.position().x - 1.0).abs() < 1e-6);
        assert_eq!(body.position().y, 0.0);
    }
}
