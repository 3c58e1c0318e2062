//! Rigid body component and the derived operations the constraint core uses.

use glam::{DMat3, DVec3};

/// Rigid body component.
///
/// The solver never touches mass or velocity directly; it works through the
/// derived operations below and through the per-step correction
/// accumulators. `correction_v` / `correction_w` start at zero, are zeroed
/// again by contact construction, and accumulate impulse-induced velocity
/// corrections across resolve calls. The outer loop reads them back when
/// integrating (see [`RigidBody::apply_corrections`]).
#[derive(Debug, Clone)]
pub struct RigidBody {
    /// Inverse mass (zero for immovable bodies).
    pub inv_mass: f64,
    /// Inverse inertia tensor in world space (zero for immovable bodies).
    pub inv_inertia: DMat3,
    /// Center of mass in world space.
    pub position: DVec3,
    pub linear_velocity: DVec3,
    pub angular_velocity: DVec3,
    pub force_accumulator: DVec3,
    pub torque_accumulator: DVec3,
    /// Accumulated linear velocity correction for the current step.
    pub correction_v: DVec3,
    /// Accumulated angular velocity correction for the current step.
    pub correction_w: DVec3,
}

impl RigidBody {
    /// Create a dynamic rigid body with the given mass.
    ///
    /// Uses the unit-sphere approximation `I = m * identity` for inertia.
    pub fn new_dynamic(mass: f64, position: DVec3) -> Self {
        let inv_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };
        Self {
            inv_mass,
            inv_inertia: DMat3::from_diagonal(DVec3::splat(inv_mass)),
            position,
            linear_velocity: DVec3::ZERO,
            angular_velocity: DVec3::ZERO,
            force_accumulator: DVec3::ZERO,
            torque_accumulator: DVec3::ZERO,
            correction_v: DVec3::ZERO,
            correction_w: DVec3::ZERO,
        }
    }

    /// Create an immovable rigid body (zero inverse mass and inertia).
    pub fn new_static(position: DVec3) -> Self {
        Self {
            inv_mass: 0.0,
            inv_inertia: DMat3::ZERO,
            position,
            linear_velocity: DVec3::ZERO,
            angular_velocity: DVec3::ZERO,
            force_accumulator: DVec3::ZERO,
            torque_accumulator: DVec3::ZERO,
            correction_v: DVec3::ZERO,
            correction_w: DVec3::ZERO,
        }
    }

    /// Linear velocity the accumulated forces will add over `dt` absent any
    /// constraint: `M^-1 * F * dt`. Used only in bias computation.
    pub fn linear_impulse(&self, dt: f64) -> DVec3 {
        self.inv_mass * self.force_accumulator * dt
    }

    /// Angular velocity the accumulated torques will add over `dt`:
    /// `I^-1 * tau * dt`. Used only in bias computation.
    pub fn angular_impulse(&self, dt: f64) -> DVec3 {
        self.inv_inertia * self.torque_accumulator * dt
    }

    /// `(point - center_of_mass) x direction`: converts a linear constraint
    /// direction into its angular (torque) analog.
    pub fn lever_arm_cross(&self, point: DVec3, direction: DVec3) -> DVec3 {
        (point - self.position).cross(direction)
    }

    /// Apply the body's inverse-mass scalar.
    pub fn scale_by_inv_mass(&self, v: DVec3) -> DVec3 {
        self.inv_mass * v
    }

    /// Apply the body's inverse-inertia tensor.
    pub fn scale_by_inv_inertia(&self, v: DVec3) -> DVec3 {
        self.inv_inertia * v
    }

    /// Project a constraint direction onto the current linear velocity.
    pub fn dot_with_linear_velocity(&self, v: DVec3) -> f64 {
        v.dot(self.linear_velocity)
    }

    /// Project a constraint direction onto the current angular velocity.
    pub fn dot_with_angular_velocity(&self, v: DVec3) -> f64 {
        v.dot(self.angular_velocity)
    }

    /// Fold the correction accumulators into the velocities and clear them.
    ///
    /// Called by the outer loop once per step, after all solver sweeps for
    /// that step have finished.
    pub fn apply_corrections(&mut self) {
        self.linear_velocity += self.correction_v;
        self.angular_velocity += self.correction_w;
        self.correction_v = DVec3::ZERO;
        self.correction_w = DVec3::ZERO;
    }
}
