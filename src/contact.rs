//! Contact constraint construction.
//!
//! [`Contact::new`] is the basis builder: it runs once per detected contact
//! and caches, for each of the three constraint rows (normal, tangent1,
//! tangent2) and each body, the Jacobian direction pair together with its
//! mass-scaled and effective-mass-scaled projections, plus the per-row
//! velocity bias. Resolution lives in [`crate::solver`].

use glam::DVec3;
use hecs::Entity;

use crate::error::{ConstraintError, RowId};
use crate::rigid_body::RigidBody;

/// Effective-mass denominators at or below this magnitude are degenerate.
const EFFECTIVE_MASS_EPSILON: f64 = 1e-6;

/// One Jacobian row for one body: a linear and an angular constraint
/// direction, plus the cached scaled forms the resolver reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintRow {
    /// Linear constraint direction.
    pub lin: DVec3,
    /// Angular (lever-arm-crossed) constraint direction.
    pub ang: DVec3,
    /// `lin` scaled by the body's inverse mass.
    pub lin_scaled_m: DVec3,
    /// `ang` scaled by the body's inverse inertia.
    pub ang_scaled_m: DVec3,
    /// `lin` scaled by the row's effective-mass inverse.
    pub lin_scaled_d: DVec3,
    /// `ang` scaled by the row's effective-mass inverse.
    pub ang_scaled_d: DVec3,
}

/// A single contact constraint between two bodies.
///
/// Owns three rows per body (normal plus two friction tangents), one bias
/// per row, and the accumulated impulse magnitudes. Invariants maintained by
/// the resolver: the normal impulse never goes negative, and each tangent
/// impulse stays within `friction * normal_impulse`.
#[derive(Debug, Clone)]
pub struct Contact {
    pub(crate) body_a: Entity,
    pub(crate) body_b: Entity,
    /// Rows for body A, indexed normal / tangent1 / tangent2.
    pub(crate) rows_a: [ConstraintRow; 3],
    /// Rows for body B. Linear parts are the negation of A's; angular lever
    /// arms are independent.
    pub(crate) rows_b: [ConstraintRow; 3],
    /// Per-row bias, pre-scaled by the row's effective-mass inverse.
    pub(crate) bias: [f64; 3],
    /// Accumulated impulse magnitudes: normal, tangent1, tangent2.
    pub(crate) lambda: [f64; 3],
}

impl Contact {
    /// Build the constraint basis for a contact between `body_a` and
    /// `body_b`.
    ///
    /// `normal` points from A to B and should be near unit length; the
    /// caller is responsible for normalizing its collision-detection output.
    /// Zeroes both bodies' correction accumulators as a side effect, so
    /// construction must run exactly once before the first resolve call and
    /// never between resolve calls within the same step.
    pub fn new(
        world: &mut hecs::World,
        body_a: Entity,
        body_b: Entity,
        point: DVec3,
        normal: DVec3,
        restitution: f64,
        dt: f64,
    ) -> Result<Self, ConstraintError> {
        let (t1, t2) = tangent_basis(normal).ok_or(ConstraintError::DegenerateNormal {
            normal,
            body_a,
            body_b,
        })?;

        let a = snapshot(world, body_a)?;
        let b = snapshot(world, body_b)?;

        let mut contact = Self {
            body_a,
            body_b,
            rows_a: [ConstraintRow::default(); 3],
            rows_b: [ConstraintRow::default(); 3],
            bias: [0.0; 3],
            lambda: [0.0; 3],
        };

        // Each row is built independently: off-diagonal coupling in the true
        // 3x3 effective-mass matrix is deliberately ignored.
        contact.build_row(RowId::Normal, &a, &b, point, normal, restitution, dt)?;
        contact.build_row(RowId::Tangent1, &a, &b, point, t1, 0.0, dt)?;
        contact.build_row(RowId::Tangent2, &a, &b, point, t2, 0.0, dt)?;

        Ok(contact)
    }

    /// Build one constraint row pair from a world-space direction.
    ///
    /// `restitution` contributes a bounce term projected onto the current
    /// velocities; it is nonzero only for the normal row. The friction rows'
    /// bias carries just the external-impulse projection (the velocity this
    /// step's applied forces would add absent the constraint).
    fn build_row(
        &mut self,
        row: RowId,
        a: &RigidBody,
        b: &RigidBody,
        point: DVec3,
        direction: DVec3,
        restitution: f64,
        dt: f64,
    ) -> Result<(), ConstraintError> {
        let lin_a = -direction;
        let ang_a = -a.lever_arm_cross(point, direction);
        let lin_b = direction;
        let ang_b = b.lever_arm_cross(point, direction);

        let lin_a_m = a.scale_by_inv_mass(lin_a);
        let ang_a_m = a.scale_by_inv_inertia(ang_a);
        let lin_b_m = b.scale_by_inv_mass(lin_b);
        let ang_b_m = b.scale_by_inv_inertia(ang_b);

        let d = lin_a.dot(lin_a_m) + ang_a.dot(ang_a_m) + lin_b.dot(lin_b_m) + ang_b.dot(ang_b_m);
        if d.abs() <= EFFECTIVE_MASS_EPSILON {
            return Err(ConstraintError::DegenerateConstraint {
                row,
                body_a: self.body_a,
                body_b: self.body_b,
            });
        }
        let d_inv = 1.0 / d;

        let mut bias = lin_a.dot(a.linear_impulse(dt))
            + ang_a.dot(a.angular_impulse(dt))
            + lin_b.dot(b.linear_impulse(dt))
            + ang_b.dot(b.angular_impulse(dt));
        bias += restitution
            * (a.dot_with_linear_velocity(lin_a)
                + a.dot_with_angular_velocity(ang_a)
                + b.dot_with_linear_velocity(lin_b)
                + b.dot_with_angular_velocity(ang_b));

        let idx = row as usize;
        self.bias[idx] = bias * d_inv;
        self.rows_a[idx] = ConstraintRow {
            lin: lin_a,
            ang: ang_a,
            lin_scaled_m: lin_a_m,
            ang_scaled_m: ang_a_m,
            lin_scaled_d: lin_a * d_inv,
            ang_scaled_d: ang_a * d_inv,
        };
        self.rows_b[idx] = ConstraintRow {
            lin: lin_b,
            ang: ang_b,
            lin_scaled_m: lin_b_m,
            ang_scaled_m: ang_b_m,
            lin_scaled_d: lin_b * d_inv,
            ang_scaled_d: ang_b * d_inv,
        };

        Ok(())
    }

    /// Accumulated normal impulse magnitude (never negative).
    pub fn normal_impulse(&self) -> f64 {
        self.lambda[0]
    }

    /// Accumulated friction impulse magnitudes.
    pub fn tangent_impulses(&self) -> [f64; 2] {
        [self.lambda[1], self.lambda[2]]
    }

    /// The two bodies this contact constrains.
    pub fn bodies(&self) -> (Entity, Entity) {
        (self.body_a, self.body_b)
    }
}

/// Clone a body's state for row construction, zeroing its correction
/// accumulators first.
fn snapshot(world: &mut hecs::World, entity: Entity) -> Result<RigidBody, ConstraintError> {
    let mut body = world
        .get::<&mut RigidBody>(entity)
        .map_err(|_| ConstraintError::MissingBody(entity))?;
    body.correction_v = DVec3::ZERO;
    body.correction_w = DVec3::ZERO;
    Ok(body.clone())
}

/// Construct an orthonormal tangent basis for a contact normal.
///
/// The first tangent comes from a component-magnitude case split so the
/// construction never degenerates near an axis: each candidate is exactly
/// orthogonal to the normal by construction, and the thresholds tighten from
/// 1e-3 down to 1e-16 as the earlier components are ruled out. Returns
/// `None` when no component qualifies, i.e. the normal is (numerically)
/// zero.
pub(crate) fn tangent_basis(normal: DVec3) -> Option<(DVec3, DVec3)> {
    let t1 = if normal.x.abs() >= 1e-3 {
        DVec3::new(-normal.y - normal.z, normal.x, normal.x)
    } else if normal.y.abs() >= 1e-6 {
        DVec3::new(normal.y, -normal.z - normal.x, normal.y)
    } else if normal.z.abs() >= 1e-16 {
        DVec3::new(normal.z, normal.z, -normal.x - normal.y)
    } else {
        return None;
    };

    let t1 = t1.normalize();
    let t2 = normal.cross(t1).normalize();
    Some((t1, t2))
}
