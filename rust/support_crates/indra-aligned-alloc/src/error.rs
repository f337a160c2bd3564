use thiserror::Error;

/// Failure reported by an [`AlignedAlloc`](crate::AlignedAlloc) implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    /// The size/alignment pair does not describe a valid layout: the alignment
    /// is not a power of two, or the rounded size exceeds `isize::MAX`.
    #[error("invalid layout: {size} bytes, alignment {alignment}")]
    InvalidLayout { size: usize, alignment: usize },

    /// The underlying allocator could not satisfy the request.
    #[error("out of memory: {size} bytes, alignment {alignment}")]
    OutOfMemory { size: usize, alignment: usize },
}

impl From<AllocError> for indra_common::error::Error {
    fn from(e: AllocError) -> Self {
        use indra_common::error::Error;
        match e {
            AllocError::InvalidLayout { alignment, .. } if !alignment.is_power_of_two() => {
                Error::invalid_alignment(alignment)
            }
            AllocError::InvalidLayout { size, .. } => Error::capacity_overflow(size),
            AllocError::OutOfMemory { size, alignment } => {
                Error::allocation_failure(size, alignment)
            }
        }
    }
}
