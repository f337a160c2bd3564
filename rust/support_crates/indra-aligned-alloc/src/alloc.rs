//! The [`AlignedAlloc`] capability and its global-allocator implementation.

use std::{alloc::Layout, ptr::NonNull};

use crate::{bulk_copy, error::AllocError};

/// An allocator of aligned, untyped memory blocks.
///
/// # Safety
///
/// Implementors must guarantee that:
/// - A block returned by `allocate(size, alignment)` starts at a multiple of
///   `alignment` and is valid for reads and writes of `size` bytes until it is
///   passed to `free`.
/// - A zero-size request succeeds with a non-null, `alignment`-aligned pointer
///   that is never dereferenced, and freeing it is a no-op.
/// - Blocks are exclusively owned by the caller; the allocator never hands out
///   overlapping live blocks.
pub unsafe trait AlignedAlloc {
    /// Allocates `size` bytes aligned to `alignment`.
    ///
    /// `alignment` must be a power of two, otherwise
    /// [`AllocError::InvalidLayout`] is returned.
    fn allocate(&self, size: usize, alignment: usize) -> Result<NonNull<u8>, AllocError>;

    /// Frees a block previously returned by [`allocate`](Self::allocate).
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate` on this allocator with exactly the same
    /// `size` and `alignment`, and must not be used afterwards.
    unsafe fn free(&self, ptr: NonNull<u8>, size: usize, alignment: usize);

    /// Copies `size` bytes from `src` to `dst`.
    ///
    /// The default implementation uses the platform [`bulk_copy`] routine.
    ///
    /// # Safety
    ///
    /// Both ranges must be valid for `size` bytes and must not overlap.
    #[inline]
    unsafe fn copy_nonoverlapping(&self, dst: *mut u8, src: *const u8, size: usize) {
        unsafe { bulk_copy::copy_nonoverlapping(dst, src, size) }
    }
}

unsafe impl<A: AlignedAlloc + ?Sized> AlignedAlloc for &A {
    #[inline]
    fn allocate(&self, size: usize, alignment: usize) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(size, alignment)
    }

    #[inline]
    unsafe fn free(&self, ptr: NonNull<u8>, size: usize, alignment: usize) {
        unsafe { (**self).free(ptr, size, alignment) }
    }

    #[inline]
    unsafe fn copy_nonoverlapping(&self, dst: *mut u8, src: *const u8, size: usize) {
        unsafe { (**self).copy_nonoverlapping(dst, src, size) }
    }
}

/// [`AlignedAlloc`] backed by the process global allocator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemAlloc;

unsafe impl AlignedAlloc for SystemAlloc {
    fn allocate(&self, size: usize, alignment: usize) -> Result<NonNull<u8>, AllocError> {
        let layout = Layout::from_size_align(size, alignment)
            .map_err(|_| AllocError::InvalidLayout { size, alignment })?;
        if layout.size() == 0 {
            return Ok(dangling(layout.align()));
        }
        let ptr = unsafe { std::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(AllocError::OutOfMemory { size, alignment })
    }

    unsafe fn free(&self, ptr: NonNull<u8>, size: usize, alignment: usize) {
        if size == 0 {
            return;
        }
        unsafe {
            let layout = Layout::from_size_align_unchecked(size, alignment);
            std::alloc::dealloc(ptr.as_ptr(), layout);
        }
    }
}

/// A non-null, well-aligned pointer for zero-size blocks.
#[inline]
fn dangling(alignment: usize) -> NonNull<u8> {
    // `Layout` guarantees a non-zero alignment.
    unsafe { NonNull::new_unchecked(std::ptr::without_provenance_mut(alignment)) }
}
