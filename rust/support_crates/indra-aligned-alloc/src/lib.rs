//! Aligned memory allocation capability used by the indra containers.
//!
//! The containers never talk to the global allocator directly. They go through
//! the [`AlignedAlloc`] trait, which bundles the three primitives they need:
//! allocate an aligned block, free it, and bulk-copy between two disjoint
//! blocks. [`SystemAlloc`] is the default implementation.

pub mod align;
pub mod alloc;
pub mod error;

#[cfg_attr(target_arch = "x86_64", path = "bulk_copy_sse2.rs")]
#[cfg_attr(not(target_arch = "x86_64"), path = "bulk_copy_fallback.rs")]
pub mod bulk_copy;

pub use alloc::{AlignedAlloc, SystemAlloc};
pub use error::AllocError;

/// Smallest alignment an aligned container accepts.
pub const MIN_ALIGNMENT: usize = 16;

/// Default container alignment (one SSE lane).
pub const DEFAULT_ALIGNMENT: usize = MIN_ALIGNMENT;

/// Alignment suitable for AVX-512 loads and whole cache lines.
pub const SIMD_ALIGNMENT: usize = 64;

#[cfg(test)]
mod tests;
