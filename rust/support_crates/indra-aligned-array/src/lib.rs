//! A growable array of `Copy` elements whose storage is aligned for SIMD access.
//!
//! [`AlignedArray`] is a building block for vertex and geometry buffers that get
//! handed to vectorized code. Its storage always starts on an `ALIGN`-byte
//! boundary (at least 16), it grows by bulk-copying into a fresh aligned block,
//! and it never constructs or drops elements individually.
//!
//! ```
//! use indra_aligned_array::AlignedArray;
//!
//! let mut positions: AlignedArray<[f32; 4]> = AlignedArray::new();
//! positions.push([0.0, 0.0, 0.0, 1.0]);
//! positions.append(2).copy_from_slice(&[[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0]]);
//! assert_eq!(positions.len(), 3);
//! assert_eq!(positions.as_ptr().addr() % 16, 0);
//! ```

pub mod array;
mod growth;

pub use array::AlignedArray;
pub use indra_aligned_alloc::{
    AlignedAlloc, AllocError, DEFAULT_ALIGNMENT, MIN_ALIGNMENT, SIMD_ALIGNMENT, SystemAlloc,
};
