//! Portable non-aliasing bulk copy.

/// Name of the copy strategy compiled for this target.
pub const STRATEGY: &str = "portable";

/// Copies `len` bytes from `src` to `dst`.
///
/// # Safety
///
/// Both ranges must be valid for `len` bytes and must not overlap.
#[inline]
pub unsafe fn copy_nonoverlapping(dst: *mut u8, src: *const u8, len: usize) {
    unsafe { std::ptr::copy_nonoverlapping(src, dst, len) }
}
