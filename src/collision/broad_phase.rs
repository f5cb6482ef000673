//! Sweep and prune.

use crate::body::Body;

/// Collect the indices of every pair of bodies whose bounds and filters allow a collision.
///
/// Refreshes all cached bounds, then sorts the body list on the minimum x
/// coordinate so the inner loop can bail out as soon as the gap on the sweep
/// axis is too big.
/// Pairs are pushed into the reused `pairs` buffer as indices into the sorted
/// list, expected near-linear for spatially coherent scenes.
pub(crate) fn sweep_and_prune(bodies: &mut [Body], pairs: &mut Vec<(usize, usize)>) {
    puffin::profile_function!();

    pairs.clear();

    for body in bodies.iter_mut() {
        body.update_bound();
    }

    // Sort bodies by X in ascending order, stability is irrelevant
    bodies.sort_unstable_by(|a, b| a.bound().min.x.total_cmp(&b.bound().min.x));

    for i in 0..bodies.len() {
        let a = bodies[i].bound();

        for j in (i + 1)..bodies.len() {
            let b = bodies[j].bound();

            // X-axis: everything after this body starts even further to the right
            if b.min.x > a.max.x {
                break;
            }

            // Y-axis: both intervals need to overlap
            if a.max.y < b.min.y || a.min.y > b.max.y {
                continue;
            }

            // The filter masks need to share at least one bit
            if bodies[i].bitmask() & bodies[j].bitmask() == 0 {
                continue;
            }

            pairs.push((i, j));
        }
    }
}
