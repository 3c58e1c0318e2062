//! Shared world setup for the contact solver benchmarks.

use glam::DVec3;
use nudge::{Contact, RigidBody};

/// Spawn `n` unit-mass bodies resting on one shared static ground and build
/// one contact per body, gravity already in the force accumulators.
pub fn setup_resting_contacts(n: usize) -> (hecs::World, Vec<Contact>) {
    let mut world = hecs::World::new();
    let ground = world.spawn((RigidBody::new_static(DVec3::new(0.0, -0.5, 0.0)),));

    let mut contacts = Vec::with_capacity(n);
    for i in 0..n {
        let x = i as f64 * 2.0;
        let mut body = RigidBody::new_dynamic(1.0, DVec3::new(x, 0.5, 0.0));
        body.force_accumulator = DVec3::new(0.0, -9.81, 0.0);
        let entity = world.spawn((body,));

        let contact = Contact::new(
            &mut world,
            entity,
            ground,
            DVec3::new(x, 0.0, 0.0),
            DVec3::new(0.0, -1.0, 0.0),
            0.0,
            1.0 / 60.0,
        )
        .expect("resting contact should build");
        contacts.push(contact);
    }

    (world, contacts)
}
