use thiserror::Error;

/// Storage acquisition failures.
///
/// These are never handled inside the crate, only propagated to the caller.
/// The operation that returned the error documents the state it leaves the
/// container in (for everything except the in-place branch of
/// [`Array::assign_from`](crate::Array::assign_from), that state is
/// "unchanged").
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum AllocError {
    /// The requested element count does not fit into a valid memory layout.
    #[error("capacity overflow: no layout for {elements} elements of {element_size} bytes")]
    CapacityOverflow {
        /// Number of elements requested.
        elements: usize,
        /// Size of one element in bytes.
        element_size: usize,
    },
    /// The allocator refused the request.
    #[error("allocation of {bytes} bytes failed")]
    OutOfMemory {
        /// Size of the refused request in bytes.
        bytes: usize,
    },
}
