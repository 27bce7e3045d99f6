//! Error type shared by every fallible container operation.

use smallvec::CollectionAllocErr;
use thiserror::Error;

/// Failure reported by insert-family, resize and copy operations.
///
/// Precondition violations (adding a present key, deleting an absent one)
/// are not represented here; those panic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Slot-count or byte-size arithmetic would overflow `usize`.
    #[error("capacity overflow: a table sized for {requested} is not addressable")]
    CapacityOverflow { requested: usize },

    /// The allocator refused the slot array.
    #[error("allocation of a {slots}-slot table failed")]
    AllocationFailed { slots: usize },
}

pub type Result<T> = core::result::Result<T, TableError>;

impl TableError {
    pub(crate) fn from_alloc(err: CollectionAllocErr, slots: usize) -> Self {
        match err {
            CollectionAllocErr::CapacityOverflow => TableError::CapacityOverflow { requested: slots },
            CollectionAllocErr::AllocErr { .. } => TableError::AllocationFailed { slots },
        }
    }
}
