//! Sequential impulse resolution of contact constraints.

use crate::{
    body::{Body, BodyType},
    contact::Contact,
    math::{angular_velocity_at, perp_dot},
    world::Settings,
};

/// Prepare a contact for the solver iterations.
///
/// Computes the lever arms and effective masses, captures the restitution
/// velocity bias and immediately re-applies the accumulated impulses from the
/// previous frame as the warm start.
pub(crate) fn prepare(contact: &mut Contact, a: &mut Body, b: &mut Body) {
    contact.ra = contact.pa - a.position();
    contact.rb = contact.pb - b.position();

    let ra_normal = perp_dot(contact.ra, contact.normal);
    let rb_normal = perp_dot(contact.rb, contact.normal);
    let ra_tangent = perp_dot(contact.ra, contact.tangent);
    let rb_tangent = perp_dot(contact.rb, contact.tangent);

    // Inverse of J(M^-1)(J^T), a zero denominator means nobody can move
    let normal_denominator = a.inv_mass()
        + b.inv_mass()
        + a.inv_inertia() * ra_normal * ra_normal
        + b.inv_inertia() * rb_normal * rb_normal;
    let tangent_denominator = a.inv_mass()
        + b.inv_mass()
        + a.inv_inertia() * ra_tangent * ra_tangent
        + b.inv_inertia() * rb_tangent * rb_tangent;

    contact.effective_mass_normal = if normal_denominator <= f64::EPSILON {
        0.0
    } else {
        normal_denominator.recip()
    };
    contact.effective_mass_tangent = if tangent_denominator <= f64::EPSILON {
        0.0
    } else {
        tangent_denominator.recip()
    };

    let restitution = a.restitution().min(b.restitution());

    let velocity_a = a.velocity() + angular_velocity_at(a.angular_velocity(), contact.ra);
    let velocity_b = b.velocity() + angular_velocity_at(b.angular_velocity(), contact.rb);
    contact.velocity_bias = (velocity_a - velocity_b) * restitution;

    // Warm start with the impulses accumulated in the previous frame
    if contact.normal_impulse != 0.0 || contact.tangent_impulse != 0.0 {
        let impulse =
            contact.normal * contact.normal_impulse + contact.tangent * contact.tangent_impulse;

        a.apply_contact_impulse(-impulse, contact.ra);
        b.apply_contact_impulse(impulse, contact.rb);
    }
}

/// One normal impulse iteration.
///
/// The accumulated impulse is clamped to stay non-negative, pulling bodies
/// together is never allowed.
/// Returns the accumulated impulse bounding the friction this iteration.
pub(crate) fn normal_impulse(
    contact: &mut Contact,
    a: &mut Body,
    b: &mut Body,
    settings: &Settings,
    dt: f64,
) -> f64 {
    let velocity_a = a.velocity() + angular_velocity_at(a.angular_velocity(), contact.ra);
    let velocity_b = b.velocity() + angular_velocity_at(b.angular_velocity(), contact.rb);
    let relative_velocity = velocity_b - velocity_a;

    // Positional bias pushing the overlap out, minus the allowed slop
    let penetration = (contact.pb - contact.pa).magnitude();
    let position_bias =
        settings.bias_factor / dt * (penetration - settings.position_slop).max(0.0);

    // Restitution bias captured before the solver started changing velocities
    let restitution_bias = contact.velocity_bias.dot(contact.normal);

    let lambda = (-relative_velocity.dot(contact.normal) + position_bias + restitution_bias)
        * contact.effective_mass_normal;

    let accumulated = contact.normal_impulse;
    contact.normal_impulse = (accumulated + lambda).max(0.0);
    let lambda = contact.normal_impulse - accumulated;

    let impulse = contact.normal * lambda;
    a.apply_contact_impulse(-impulse, contact.ra);
    b.apply_contact_impulse(impulse, contact.rb);

    contact.normal_impulse
}

/// One friction impulse iteration.
///
/// The accumulated tangent impulse obeys the Coulomb cone around the
/// accumulated normal impulse.
pub(crate) fn tangent_impulse(
    contact: &mut Contact,
    a: &mut Body,
    b: &mut Body,
    normal_impulse: f64,
) {
    let velocity_a = a.velocity() + angular_velocity_at(a.angular_velocity(), contact.ra);
    let velocity_b = b.velocity() + angular_velocity_at(b.angular_velocity(), contact.rb);
    let relative_velocity = velocity_b - velocity_a;

    let lambda = relative_velocity.dot(contact.tangent) * contact.effective_mass_tangent;

    let max_friction = (a.friction() * b.friction()).sqrt() * normal_impulse;

    let accumulated = contact.tangent_impulse;
    contact.tangent_impulse = (accumulated + lambda).clamp(-max_friction, max_friction);
    let lambda = contact.tangent_impulse - accumulated;

    let impulse = contact.tangent * lambda;
    a.apply_contact_impulse(impulse, contact.ra);
    b.apply_contact_impulse(-impulse, contact.rb);
}

/// One positional correction iteration.
///
/// Directly translates and rotates both bodies out of the remaining overlap
/// instead of going through their velocities.
/// The stored contact points move along with their bodies so consecutive
/// iterations see the shrinking error and the correction converges on the
/// slop instead of overshooting.
pub(crate) fn position_correction(
    contact: &mut Contact,
    a: &mut Body,
    b: &mut Body,
    settings: &Settings,
    dt: f64,
) {
    let delta = contact.pb - contact.pa;

    // Already separated
    if delta.dot(contact.normal) >= 0.0 {
        return;
    }

    let bias = settings.bias_factor / dt * (delta.magnitude() - settings.position_slop).max(0.0);
    let impulse = contact.normal * (contact.effective_mass_normal * bias);

    if a.body_type() != BodyType::Static && !a.is_sleeping() {
        let translation = impulse * (a.inv_mass() * dt);
        a.position -= translation;
        a.rotation -= a.inv_inertia() * perp_dot(contact.ra, impulse) * dt;
        contact.pa -= translation;
    }
    if b.body_type() != BodyType::Static && !b.is_sleeping() {
        let translation = impulse * (b.inv_mass() * dt);
        b.position += translation;
        b.rotation += b.inv_inertia() * perp_dot(contact.rb, impulse) * dt;
        contact.pb += translation;
    }
}
