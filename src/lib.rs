//! Sequential-impulse contact constraint solver.
//!
//! Given two colliding rigid bodies, a contact point, and a contact normal,
//! this crate builds a three-row velocity constraint (one non-penetration
//! row, two friction rows) and iteratively resolves it into corrective
//! impulses.
//!
//! # Architecture
//!
//! One solver step, driven by the caller:
//!
//! 1. Collision detection (external) produces a contact point and normal
//! 2. [`Contact::new`] builds the constraint basis once per contact,
//!    zeroing both bodies' correction accumulators
//! 3. [`solve_contacts`] runs projected Gauss-Seidel sweeps, each sweep
//!    calling [`Contact::resolve`] on every contact in fixed order
//! 4. The caller folds the accumulated corrections back into the body
//!    velocities ([`RigidBody::apply_corrections`]) and integrates
//!
//! The effective-mass matrix is approximated block-diagonally (cross-row
//! coupling between the normal and tangent rows is ignored) and the Coulomb
//! friction cone by a pyramid. Both approximations are part of the method's
//! contract: a full 3x3 solve would change convergence behavior relative to
//! reference implementations.
//!
//! Everything is single-threaded by contract. Contacts sharing a body mutate
//! that body's accumulators without locking, so the caller must serialize
//! all resolve calls within a sweep (or partition bodies into disjoint
//! islands).

pub mod contact;
pub mod error;
pub mod rigid_body;
pub mod solver;

// Re-export commonly used types
pub use contact::{Contact, ConstraintRow};
pub use error::{ConstraintError, RowId};
pub use rigid_body::RigidBody;
pub use solver::{solve_contacts, SolverConfig};
