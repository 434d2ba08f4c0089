//! Growable array storage with explicit control over raw memory and element
//! lifetime.
//!
//! The crate is built from two layered parts. [`Arena`] owns one contiguous
//! block of uninitialized memory sized in elements and never constructs or
//! drops a value. [`Array`] owns exactly one `Arena` plus a live-element
//! count, and is the only place where values are built into slots, moved
//! between slots, or dropped.
//!
//! Storage acquisition is explicit: any operation that may allocate returns
//! `Result<_, AllocError>` instead of aborting. Failures raised by element
//! types themselves (a panicking constructor closure or clone) unwind
//! through the container, which first disposes of everything it built for
//! the failed operation, so no value and no block is ever leaked.
//!
//! How live values travel to new storage during growth is decided by the
//! [`Relocate`] capability of the element type: a bitwise move when the type
//! declares moving never fails, a rollback-friendly duplicate otherwise.
//!
//! ```
//! use flexar::Array;
//!
//! let mut names = Array::new();
//! names.push(String::from("ada"))?;
//! names.push(String::from("grace"))?;
//! names.insert(1, String::from("edsger"))?;
//! assert_eq!(names.as_slice(), ["ada", "edsger", "grace"]);
//! # Ok::<(), flexar::AllocError>(())
//! ```

#[macro_use]
mod logging;

mod arena;
mod array;
mod error;
mod relocate;

pub use arena::Arena;
pub use array::Array;
pub use error::AllocError;
pub use relocate::Relocate;

#[cfg(test)]
pub mod instrument;
