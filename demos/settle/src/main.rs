//! Settle demo - a unit-mass box dropped onto a fixed ground plane, headless.
//!
//! Drives the contact core through a manual fixed-timestep loop: apply
//! gravity, integrate velocity, build a contact when the box face reaches
//! the plane, run the solver sweeps, fold the corrections back, integrate
//! position.
//!
//! Run: cargo run -p settle

use anyhow::Result;
use glam::DVec3;
use hecs::Entity;
use nudge::{solve_contacts, Contact, RigidBody, SolverConfig};

const MASS: f64 = 1.0;
const BOX_HALF_HEIGHT: f64 = 0.5;
const DROP_HEIGHT: f64 = 3.0;
const STEPS: u32 = 240;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = SolverConfig::default();
    let gravity = DVec3::new(0.0, -9.81, 0.0);

    let mut world = hecs::World::new();
    let body = world.spawn((RigidBody::new_dynamic(
        MASS,
        DVec3::new(0.0, DROP_HEIGHT, 0.0),
    ),));
    let ground = world.spawn((RigidBody::new_static(DVec3::new(0.0, -0.5, 0.0)),));

    for step in 0..STEPS {
        // Apply gravity and integrate velocity
        {
            let mut rb = world.get::<&mut RigidBody>(body)?;
            rb.force_accumulator = gravity * MASS;
            let dv = rb.linear_impulse(config.timestep);
            rb.linear_velocity += dv;
        }

        // Narrowphase stand-in: the bottom face against the plane y = 0
        if let Some(point) = ground_contact(&world, body)? {
            let contact = Contact::new(
                &mut world,
                body,
                ground,
                point,
                DVec3::new(0.0, -1.0, 0.0),
                config.restitution,
                config.timestep,
            )?;
            let mut contacts = [contact];
            solve_contacts(
                &mut contacts,
                &mut world,
                config.friction,
                config.solver_iterations,
            );
        }

        // Fold corrections, integrate position, clear forces
        {
            let mut rb = world.get::<&mut RigidBody>(body)?;
            rb.apply_corrections();
            let dp = rb.linear_velocity * config.timestep;
            rb.position += dp;
            rb.force_accumulator = DVec3::ZERO;

            if step % 30 == 0 {
                println!(
                    "t = {:5.2}s  y = {:7.4}  vy = {:8.4}",
                    f64::from(step) * config.timestep,
                    rb.position.y,
                    rb.linear_velocity.y
                );
            }
        }
    }

    let rb = world.get::<&RigidBody>(body)?;
    println!(
        "settled at y = {:.4} (expected {:.4})",
        rb.position.y, BOX_HALF_HEIGHT
    );
    Ok(())
}

/// Report the contact point when the box face touches or penetrates the
/// ground plane.
fn ground_contact(world: &hecs::World, body: Entity) -> Result<Option<DVec3>> {
    let rb = world.get::<&RigidBody>(body)?;
    if rb.position.y - BOX_HALF_HEIGHT <= 0.0 {
        Ok(Some(DVec3::new(rb.position.x, 0.0, rb.position.z)))
    } else {
        Ok(None)
    }
}
