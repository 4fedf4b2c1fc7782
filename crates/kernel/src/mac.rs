//! Boundary to the staggered velocity/pressure grid.
//!
//! The density core never reads or writes MAC grid contents. It only owns the
//! collaborator for the lifetime of a [`Simulator`](crate::Simulator) and
//! tells it to release its resources when the simulator goes away.

/// Teardown hook of the MAC grid collaborator.
pub trait MacGrid {
    /// Release every resource held by the grid. Called exactly once, when the
    /// owning simulator is dropped.
    fn release(&mut self);
}

/// Placeholder for simulators running without a velocity grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMacGrid;

impl MacGrid for NullMacGrid {
    fn release(&mut self) {}
}
