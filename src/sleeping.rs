//! Inactivity detection so resting bodies stop consuming solver work.

use hashbrown::HashMap;

use crate::{
    body::{self, Body, BodyId, BodyType},
    contact::ContactPair,
    world::Settings,
};

/// Per-step sleep bookkeeping for every body.
///
/// Keeps a biased rolling average of each body's motion, counts how long the
/// body stays under the sleep threshold and puts it to sleep once the counter
/// fills up.
/// A pending user force wakes the body immediately instead.
pub(crate) fn update(bodies: &mut [Body], settings: &Settings, dt: f64) {
    if !settings.enable_sleeping {
        return;
    }

    puffin::profile_function!();

    let time_factor = dt * dt * dt;

    for body in bodies.iter_mut() {
        if body.body_type() == BodyType::Static {
            continue;
        }

        // An external force is applied
        if body.has_user_force() {
            body.wake();
            continue;
        }

        // Biased average motion estimation between frames
        let min_motion = body.motion.min(body.prev_motion);
        let max_motion = body.motion.max(body.prev_motion);
        body.prev_motion = body.motion;
        body.motion =
            settings.motion_bias * min_motion + (1.0 - settings.motion_bias) * max_motion;

        if body.is_sleeping {
            continue;
        }

        if settings.sleep_counter_threshold > 0
            && body.motion < settings.sleep_motion_threshold * time_factor
        {
            if body.sleep_counter < settings.sleep_counter_threshold {
                body.sleep_counter += 1;
            }

            if body.sleep_counter >= settings.sleep_counter_threshold {
                body.fall_asleep(settings.sleep_counter_threshold);
            }
        } else if body.sleep_counter > 0 {
            body.sleep_counter -= 1;
        }
    }
}

/// Wake propagation through fresh contacts.
///
/// A sleeping body touching a sufficiently moving awake body is woken so
/// stacks collapse properly when something crashes into them.
pub(crate) fn wake_after_collision(
    bodies: &mut [Body],
    contacts: &HashMap<u64, ContactPair>,
    index_by_id: &HashMap<BodyId, usize>,
    settings: &Settings,
    dt: f64,
) {
    if !settings.enable_sleeping {
        return;
    }

    puffin::profile_function!();

    let wake_threshold = settings.wake_motion_threshold * dt * dt * dt;

    for pair in contacts.values() {
        if !pair.contacts.iter().any(|contact| contact.is_active) {
            continue;
        }

        let (Some(&a_index), Some(&b_index)) =
            (index_by_id.get(&pair.a), index_by_id.get(&pair.b))
        else {
            continue;
        };
        let (a, b) = body::two_mut(bodies, a_index, b_index);

        if a.is_sleeping == b.is_sleeping {
            continue;
        }
        if a.body_type() == BodyType::Static || b.body_type() == BodyType::Static {
            continue;
        }

        let (sleeping, moving) = if a.is_sleeping { (a, b) } else { (b, a) };
        if moving.motion > wake_threshold {
            sleeping.wake();
        }
    }
}
