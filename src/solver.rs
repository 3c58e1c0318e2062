//! Sequential impulse resolution (projected Gauss-Seidel).

use crate::contact::{Contact, ConstraintRow};
use crate::rigid_body::RigidBody;

/// Configuration for the contact solver sweep.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Number of Gauss-Seidel sweeps per step. Default: 8.
    pub solver_iterations: u32,
    /// Coulomb friction coefficient (must be non-negative). Default: 0.5.
    pub friction: f64,
    /// Coefficient of restitution fed to contact construction. Default: 0.3.
    pub restitution: f64,
    /// Fixed timestep in seconds. Default: 1/60.
    pub timestep: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            solver_iterations: 8,
            friction: 0.5,
            restitution: 0.3,
            timestep: 1.0 / 60.0,
        }
    }
}

impl Contact {
    /// Run one Gauss-Seidel sweep over the three rows: normal, tangent1,
    /// tangent2.
    ///
    /// All three candidate impulses are computed against the correction
    /// state read at the top of the call, and the friction bounds use the
    /// freshly clamped normal impulse from step 1 -- never the previous
    /// iteration's. The combined deltas are then applied to both bodies'
    /// accumulators in one write each. Convergence is the caller's
    /// responsibility (repeated calls across solver iterations).
    ///
    /// No-op if either body has been despawned. `friction` must be
    /// non-negative.
    pub fn resolve(&mut self, world: &mut hecs::World, friction: f64) {
        let (va, wa, vb, wb) = {
            let a = match world.get::<&RigidBody>(self.body_a) {
                Ok(a) => a,
                Err(_) => return,
            };
            let b = match world.get::<&RigidBody>(self.body_b) {
                Ok(b) => b,
                Err(_) => return,
            };
            (a.correction_v, a.correction_w, b.correction_v, b.correction_w)
        };

        let project = |row_a: &ConstraintRow, row_b: &ConstraintRow| {
            row_a.lin_scaled_d.dot(va)
                + row_a.ang_scaled_d.dot(wa)
                + row_b.lin_scaled_d.dot(vb)
                + row_b.ang_scaled_d.dot(wb)
        };

        // Normal row: no pulling contacts together.
        let c1 = (self.lambda[0] - self.bias[0] - project(&self.rows_a[0], &self.rows_b[0]))
            .max(0.0);

        // Friction pyramid: both tangent rows share one limit derived from
        // the just-computed normal impulse.
        let limit = friction * c1;
        let c2 = (self.lambda[1] - self.bias[1] - project(&self.rows_a[1], &self.rows_b[1]))
            .clamp(-limit, limit);
        let c3 = (self.lambda[2] - self.bias[2] - project(&self.rows_a[2], &self.rows_b[2]))
            .clamp(-limit, limit);

        let delta = [
            c1 - self.lambda[0],
            c2 - self.lambda[1],
            c3 - self.lambda[2],
        ];
        self.apply_deltas(world, delta);
        self.lambda = [c1, c2, c3];
    }

    /// Seed the accumulated impulses (e.g. from the previous frame's solved
    /// contact) and apply the matching mass-scaled corrections, so the next
    /// resolve call continues from that state.
    ///
    /// The seed is projected onto the friction pyramid first: the normal
    /// impulse is clamped non-negative and each tangent impulse to
    /// `friction * normal`. Construction always zero-initializes; warm
    /// starting is strictly opt-in.
    pub fn warm_start(
        &mut self,
        world: &mut hecs::World,
        normal_impulse: f64,
        tangent_impulses: [f64; 2],
        friction: f64,
    ) {
        let l1 = normal_impulse.max(0.0);
        let limit = friction * l1;
        let l2 = tangent_impulses[0].clamp(-limit, limit);
        let l3 = tangent_impulses[1].clamp(-limit, limit);

        let delta = [l1 - self.lambda[0], l2 - self.lambda[1], l3 - self.lambda[2]];
        self.apply_deltas(world, delta);
        self.lambda = [l1, l2, l3];
    }

    /// Accumulate the mass-scaled impulse deltas into both bodies'
    /// correction accumulators.
    fn apply_deltas(&self, world: &mut hecs::World, delta: [f64; 3]) {
        if let Ok(mut a) = world.get::<&mut RigidBody>(self.body_a) {
            for (row, d) in self.rows_a.iter().zip(delta) {
                a.correction_v += row.lin_scaled_m * d;
                a.correction_w += row.ang_scaled_m * d;
            }
        }
        if let Ok(mut b) = world.get::<&mut RigidBody>(self.body_b) {
            for (row, d) in self.rows_b.iter().zip(delta) {
                b.correction_v += row.lin_scaled_m * d;
                b.correction_w += row.ang_scaled_m * d;
            }
        }
    }
}

/// Solve contact constraints with repeated Gauss-Seidel sweeps.
///
/// Contacts sharing a body mutate that body's accumulators without locking,
/// so every contact touching a given body must go through the same
/// single-threaded call (or the caller must partition bodies into disjoint
/// islands and solve each island independently).
pub fn solve_contacts(
    contacts: &mut [Contact],
    world: &mut hecs::World,
    friction: f64,
    iterations: u32,
) {
    tracing::debug!(
        contacts = contacts.len(),
        iterations,
        "solving contact constraints"
    );
    for _ in 0..iterations {
        for contact in contacts.iter_mut() {
            contact.resolve(world, friction);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;
    use hecs::Entity;

    use super::*;

    const DT: f64 = 1.0 / 60.0;
    const GRAVITY: f64 = -9.81;

    /// Unit-mass body resting on a static ground plane, contact normal
    /// pointing from the body down into the ground.
    fn resting_setup(force: DVec3) -> (hecs::World, Entity, Entity, Contact) {
        let mut world = hecs::World::new();
        let mut body = RigidBody::new_dynamic(1.0, DVec3::new(0.0, 0.5, 0.0));
        body.force_accumulator = force;
        let a = world.spawn((body,));
        let b = world.spawn((RigidBody::new_static(DVec3::new(0.0, -0.5, 0.0)),));

        let contact = Contact::new(
            &mut world,
            a,
            b,
            DVec3::ZERO,
            DVec3::new(0.0, -1.0, 0.0),
            0.0,
            DT,
        )
        .expect("contact should build");

        (world, a, b, contact)
    }

    #[test]
    fn test_resting_contact_converges_to_gravity_impulse() {
        let (mut world, a, _, mut contact) = resting_setup(DVec3::new(0.0, GRAVITY, 0.0));

        for _ in 0..20 {
            contact.resolve(&mut world, 0.5);
        }

        // The normal impulse must cancel exactly the velocity gravity would
        // add this step.
        let expected = -GRAVITY * DT;
        assert!(
            (contact.normal_impulse() - expected).abs() < 1e-9,
            "lambda1 = {}, expected {}",
            contact.normal_impulse(),
            expected
        );

        let rb = world.get::<&RigidBody>(a).unwrap();
        assert!((rb.correction_v.y - expected).abs() < 1e-9);
        assert!(rb.correction_v.x.abs() < 1e-9);
        assert!(rb.correction_v.z.abs() < 1e-9);
    }

    #[test]
    fn test_normal_impulse_never_negative() {
        // Body separating upward with full restitution: the candidate
        // impulse goes negative and must clamp to zero.
        let mut world = hecs::World::new();
        let mut body = RigidBody::new_dynamic(1.0, DVec3::new(0.0, 0.5, 0.0));
        body.linear_velocity = DVec3::new(0.0, 2.0, 0.0);
        let a = world.spawn((body,));
        let b = world.spawn((RigidBody::new_static(DVec3::new(0.0, -0.5, 0.0)),));

        let mut contact = Contact::new(
            &mut world,
            a,
            b,
            DVec3::ZERO,
            DVec3::new(0.0, -1.0, 0.0),
            1.0,
            DT,
        )
        .unwrap();

        for _ in 0..10 {
            contact.resolve(&mut world, 0.5);
            assert!(
                contact.normal_impulse() >= 0.0,
                "lambda1 = {}",
                contact.normal_impulse()
            );
        }
        assert_eq!(contact.normal_impulse(), 0.0);
    }

    #[test]
    fn test_restitution_bounce_impulse() {
        // Body hitting the ground at 2 m/s with restitution 1.
        let mut world = hecs::World::new();
        let mut body = RigidBody::new_dynamic(1.0, DVec3::new(0.0, 0.5, 0.0));
        body.linear_velocity = DVec3::new(0.0, -2.0, 0.0);
        let a = world.spawn((body,));
        let b = world.spawn((RigidBody::new_static(DVec3::new(0.0, -0.5, 0.0)),));

        let mut contact = Contact::new(
            &mut world,
            a,
            b,
            DVec3::ZERO,
            DVec3::new(0.0, -1.0, 0.0),
            1.0,
            DT,
        )
        .unwrap();

        for _ in 0..20 {
            contact.resolve(&mut world, 0.0);
        }

        assert!(
            (contact.normal_impulse() - 2.0).abs() < 1e-9,
            "lambda1 = {}",
            contact.normal_impulse()
        );
        let rb = world.get::<&RigidBody>(a).unwrap();
        assert!((rb.correction_v.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_friction_cone_containment() {
        // Strong tangential force: the friction impulses must saturate at
        // the pyramid bound instead of canceling the slide.
        let friction = 0.3;
        let (mut world, _, _, mut contact) = resting_setup(DVec3::new(20.0, GRAVITY, 0.0));

        for _ in 0..20 {
            contact.resolve(&mut world, friction);

            let limit = friction * contact.normal_impulse() + 1e-9;
            let [t1, t2] = contact.tangent_impulses();
            assert!(t1.abs() <= limit, "t1 = {t1}, limit = {limit}");
            assert!(t2.abs() <= limit, "t2 = {t2}, limit = {limit}");
        }

        // With a 20 N lateral force the demand exceeds mu * lambda1, so at
        // least one tangent row must actually be saturated.
        let limit = friction * contact.normal_impulse();
        let [t1, t2] = contact.tangent_impulses();
        assert!(
            (t1.abs() - limit).abs() < 1e-9 || (t2.abs() - limit).abs() < 1e-9,
            "expected saturation: t1 = {t1}, t2 = {t2}, limit = {limit}"
        );
    }

    #[test]
    fn test_separating_contact_is_fixed_point() {
        // Both bodies at rest, no external forces: every bias is zero and
        // repeated resolution must leave everything untouched.
        let (mut world, a, b, mut contact) = resting_setup(DVec3::ZERO);

        for _ in 0..10 {
            contact.resolve(&mut world, 0.5);
        }

        assert_eq!(contact.normal_impulse(), 0.0);
        assert_eq!(contact.tangent_impulses(), [0.0, 0.0]);
        for entity in [a, b] {
            let rb = world.get::<&RigidBody>(entity).unwrap();
            assert_eq!(rb.correction_v, DVec3::ZERO);
            assert_eq!(rb.correction_w, DVec3::ZERO);
        }
    }

    #[test]
    fn test_warm_start_projects_onto_cone() {
        let (mut world, a, _, mut contact) = resting_setup(DVec3::ZERO);

        contact.warm_start(&mut world, 1.0, [5.0, -5.0], 0.2);

        assert_eq!(contact.normal_impulse(), 1.0);
        assert_eq!(contact.tangent_impulses(), [0.2, -0.2]);

        // Corrections must reflect the seeded impulses: the normal row alone
        // pushes the unit-mass body up by lambda1.
        let rb = world.get::<&RigidBody>(a).unwrap();
        assert!((rb.correction_v.y - 1.0).abs() < 1e-9, "correction_v = {}", rb.correction_v);

        // A negative normal seed projects to zero everywhere.
        let (mut world2, _, _, mut contact2) = resting_setup(DVec3::ZERO);
        contact2.warm_start(&mut world2, -3.0, [1.0, 1.0], 0.2);
        assert_eq!(contact2.normal_impulse(), 0.0);
        assert_eq!(contact2.tangent_impulses(), [0.0, 0.0]);
    }

    #[test]
    fn test_resolve_after_despawn_is_noop() {
        let (mut world, a, _, mut contact) = resting_setup(DVec3::new(0.0, GRAVITY, 0.0));

        world.despawn(a).unwrap();
        contact.resolve(&mut world, 0.5);

        assert_eq!(contact.normal_impulse(), 0.0);
    }

    #[test]
    fn test_solve_contacts_matches_manual_sweeps() {
        let (mut world_a, _, _, mut manual) = resting_setup(DVec3::new(2.0, GRAVITY, 0.0));
        let (mut world_b, _, _, sweep) = resting_setup(DVec3::new(2.0, GRAVITY, 0.0));

        for _ in 0..8 {
            manual.resolve(&mut world_a, 0.5);
        }

        let mut contacts = vec![sweep];
        solve_contacts(&mut contacts, &mut world_b, 0.5, 8);

        assert!((contacts[0].normal_impulse() - manual.normal_impulse()).abs() < 1e-12);
        assert_eq!(contacts[0].tangent_impulses(), manual.tangent_impulses());
    }

    #[test]
    fn test_solver_config_default() {
        let config = SolverConfig::default();
        assert_eq!(config.solver_iterations, 8);
        assert!((config.friction - 0.5).abs() < 1e-12);
        assert!((config.restitution - 0.3).abs() < 1e-12);
        assert!((config.timestep - 1.0 / 60.0).abs() < 1e-10);
    }
}
