//! Persistent contact points between body pairs.

use arrayvec::ArrayVec;
use vek::Vec2;

use crate::{body::BodyId, math::perp};

/// Positional tolerance for re-matching a contact point against the previous frame.
const MATCH_TOLERANCE: f64 = 0.01;

/// Key for a contact bucket, identical for both orderings of the same pair.
pub fn pair_key(a: BodyId, b: BodyId) -> u64 {
    let min = a.0.min(b.0);
    let max = a.0.max(b.0);

    (u64::from(min) << 32) | u64::from(max)
}

/// A single contact point between two bodies.
///
/// Impulse accumulators persist across frames so the solver can warm start
/// while the pair keeps touching.
#[derive(Debug, Clone)]
pub struct Contact {
    /// World-space contact point on body A.
    pub pa: Vec2<f64>,
    /// World-space contact point on body B.
    pub pb: Vec2<f64>,
    /// Unit normal pointing from A to B.
    pub normal: Vec2<f64>,
    /// Normal rotated a quarter turn.
    pub tangent: Vec2<f64>,
    /// Penetration depth, positive while overlapping.
    pub depth: f64,
    /// Lever arm from A's center to the contact, set during preparation.
    pub ra: Vec2<f64>,
    /// Lever arm from B's center to the contact, set during preparation.
    pub rb: Vec2<f64>,
    /// Inverse of the pair's combined inverse mass along the normal.
    pub effective_mass_normal: f64,
    /// Inverse of the pair's combined inverse mass along the tangent.
    pub effective_mass_tangent: f64,
    /// Accumulated normal impulse, never negative.
    pub normal_impulse: f64,
    /// Accumulated friction impulse, bounded by the normal impulse.
    pub tangent_impulse: f64,
    /// Pre-solve relative contact velocity scaled by the restitution.
    pub velocity_bias: Vec2<f64>,
    /// Whether the narrow phase saw this contact this frame.
    pub is_active: bool,
}

impl Contact {
    pub(crate) fn new(pa: Vec2<f64>, pb: Vec2<f64>, normal: Vec2<f64>, depth: f64) -> Self {
        Self {
            pa,
            pb,
            normal,
            tangent: perp(normal),
            depth,
            ra: Vec2::zero(),
            rb: Vec2::zero(),
            effective_mass_normal: 0.0,
            effective_mass_tangent: 0.0,
            normal_impulse: 0.0,
            tangent_impulse: 0.0,
            velocity_bias: Vec2::zero(),
            is_active: true,
        }
    }
}

/// Persistent bucket owning the contact points of one body pair.
///
/// Created the first time a pair collides and kept for the lifetime of the
/// world, contact points inside it are re-matched by proximity every frame.
#[derive(Debug, Clone)]
pub struct ContactPair {
    /// Body with the smaller id.
    pub a: BodyId,
    /// Body with the larger id.
    pub b: BodyId,
    /// Stored contact points.
    pub contacts: ArrayVec<Contact, 2>,
}

impl ContactPair {
    /// Construct an empty bucket for the canonically ordered pair.
    pub(crate) fn new(a: BodyId, b: BodyId) -> Self {
        debug_assert!(a < b);

        Self {
            a,
            b,
            contacts: ArrayVec::new(),
        }
    }

    /// Merge a fresh narrow phase point into the bucket.
    ///
    /// A stored point with both endpoints within the match tolerance is
    /// reactivated with the new depth while keeping its accumulated impulses
    /// for warm starting.
    /// Anything else becomes a new contact with cleared impulses, evicting an
    /// inactive slot when the bucket is full.
    pub(crate) fn merge_point(
        &mut self,
        pa: Vec2<f64>,
        pb: Vec2<f64>,
        normal: Vec2<f64>,
        depth: f64,
    ) -> &mut Contact {
        let matched = self.contacts.iter().position(|contact| {
            contact.pa.distance(pa) <= MATCH_TOLERANCE && contact.pb.distance(pb) <= MATCH_TOLERANCE
        });

        let index = match matched {
            Some(index) => {
                let contact = &mut self.contacts[index];
                contact.depth = depth;
                contact.is_active = true;

                index
            }
            None => {
                let contact = Contact::new(pa, pb, normal, depth);

                if self.contacts.is_full() {
                    let slot = self
                        .contacts
                        .iter()
                        .position(|contact| !contact.is_active)
                        .unwrap_or(0);
                    self.contacts[slot] = contact;

                    slot
                } else {
                    self.contacts.push(contact);

                    self.contacts.len() - 1
                }
            }
        };

        &mut self.contacts[index]
    }
}
