/// Checks whether a number is a multiple of the specified alignment.
///
/// # Arguments
///
/// * `n` - The number to check
/// * `alignment` - The alignment boundary (must be a power of 2 and non-zero)
///
/// # Returns
///
/// `true` if `n` is a multiple of `alignment`, `false` otherwise.
///
/// # Examples
///
/// ```
/// use indra_aligned_alloc::align::is_aligned;
///
/// assert!(is_aligned(0, 16));
/// assert!(is_aligned(64, 16));
/// assert!(!is_aligned(17, 16));
/// ```
///
/// # Panics
///
/// Panics in debug builds if `alignment` is not a power of 2.
#[inline]
pub fn is_aligned(n: usize, alignment: usize) -> bool {
    debug_assert!(alignment.is_power_of_two());
    (n & (alignment - 1)) == 0
}

/// Checks whether a pointer's address lies on the specified alignment boundary.
///
/// Only the address is inspected; the pointer is never dereferenced.
///
/// # Arguments
///
/// * `ptr` - The pointer to check
/// * `alignment` - The alignment boundary
///
/// # Returns
///
/// `true` if `alignment` is a power of 2 and the address of `ptr` is a
/// multiple of it. An alignment that is not a power of 2 yields `false`.
///
/// # Examples
///
/// ```
/// use indra_aligned_alloc::align::is_aligned_ptr;
///
/// let p = std::ptr::without_provenance::<u8>(128);
/// assert!(is_aligned_ptr(p, 64));
/// assert!(!is_aligned_ptr(p, 256));
/// assert!(!is_aligned_ptr(p, 3));
/// ```
#[inline]
pub fn is_aligned_ptr<T>(ptr: *const T, alignment: usize) -> bool {
    alignment.is_power_of_two() && is_aligned(ptr.addr(), alignment)
}
