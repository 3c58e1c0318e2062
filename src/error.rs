//! Error types for contact constraint construction.

use glam::DVec3;
use thiserror::Error;

/// Identifies one of the three constraint rows in error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowId {
    /// Non-penetration row along the contact normal.
    Normal,
    /// First friction row.
    Tangent1,
    /// Second friction row.
    Tangent2,
}

/// Contact configuration errors raised during constraint construction.
///
/// All variants are modeling precondition violations rather than recoverable
/// runtime failures: the caller should drop (or merge) the offending contact
/// and log it. Skipping a contact silently changes solver correctness, so
/// none of these may be ignored.
#[derive(Debug, Error)]
pub enum ConstraintError {
    /// A row's effective-mass denominator is below threshold: both bodies
    /// have zero mobility along that constraint direction (e.g. two fixed
    /// bodies colliding), so the row cannot be inverted.
    #[error("degenerate effective mass on {row:?} row between bodies {body_a:?} and {body_b:?}")]
    DegenerateConstraint {
        row: RowId,
        body_a: hecs::Entity,
        body_b: hecs::Entity,
    },

    /// No component of the contact normal clears its magnitude threshold,
    /// so no tangent basis exists.
    #[error("degenerate contact normal {normal} between bodies {body_a:?} and {body_b:?}")]
    DegenerateNormal {
        normal: DVec3,
        body_a: hecs::Entity,
        body_b: hecs::Entity,
    },

    /// An entity handed to the builder has no rigid body component.
    #[error("entity {0:?} has no rigid body")]
    MissingBody(hecs::Entity),
}
