use std::{
    mem::{self, MaybeUninit},
    ops::{Deref, DerefMut, Index, IndexMut},
    ptr::NonNull,
};

use indra_aligned_alloc::{
    AlignedAlloc, DEFAULT_ALIGNMENT, MIN_ALIGNMENT, SystemAlloc, align::is_aligned_ptr,
    bulk_copy,
};
use indra_common::{
    Result,
    error::{Error, ErrorKind},
    result::verify_index,
};

use crate::growth;

/// A growable, contiguous array of `T` whose storage starts on an `ALIGN`-byte
/// boundary.
///
/// The array exclusively owns one memory block obtained from the allocator `A`.
/// The block is not allocated until the first growth, and it is replaced (never
/// shrunk) when the array outgrows it: the elements are bulk-copied into a new
/// block and the old block is released afterwards. Elements are plain `Copy`
/// data; the array never runs per-element constructors or destructors.
///
/// `ALIGN` must be a power of two no smaller than [`MIN_ALIGNMENT`]; this is
/// checked at compile time. The effective block alignment is the larger of
/// `ALIGN` and the natural alignment of `T`.
///
/// The array is not `Clone`. Copy its contents with [`AlignedArray::from_slice`]
/// when a second array is needed.
///
/// # Element access
///
/// - `array[i]` panics with an `index out of range` message when `i >= len()`.
/// - [`get`](Self::get) and [`try_get`](Self::try_get) return `None` or an
///   [`ErrorKind::IndexOutOfRange`] error.
/// - [`get_unchecked`](Self::get_unchecked) skips the check in release builds
///   (it is a `debug_assert!` in debug builds); out-of-range access through it
///   is undefined behavior.
///
/// # Allocation failure
///
/// The infallible operations (`push`, `resize`, `append`, ...) hand allocation
/// failures to [`std::alloc::handle_alloc_error`] and panic on capacity
/// overflow. Their `try_*` counterparts return the error and leave the array
/// unchanged.
pub struct AlignedArray<
    T: Copy,
    const ALIGN: usize = DEFAULT_ALIGNMENT,
    A: AlignedAlloc = SystemAlloc,
> {
    ptr: NonNull<T>,
    len: usize,
    capacity: usize,
    alloc: A,
}

unsafe impl<T: Copy + Send, const ALIGN: usize, A: AlignedAlloc + Send> Send
    for AlignedArray<T, ALIGN, A>
{
}

unsafe impl<T: Copy + Sync, const ALIGN: usize, A: AlignedAlloc + Sync> Sync
    for AlignedArray<T, ALIGN, A>
{
}

impl<T: Copy, const ALIGN: usize> AlignedArray<T, ALIGN, SystemAlloc> {
    /// Creates an empty array. Nothing is allocated.
    pub fn new() -> Self {
        Self::new_in(SystemAlloc)
    }

    /// Creates an empty array able to hold `capacity` elements without growing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, SystemAlloc)
    }

    /// Creates an array holding a copy of `values`.
    pub fn from_slice(values: &[T]) -> Self {
        let mut array = Self::with_capacity(values.len());
        array.extend_from_slice(values);
        array
    }
}

impl<T: Copy, const ALIGN: usize, A: AlignedAlloc> AlignedArray<T, ALIGN, A> {
    /// Alignment of the owned block, in bytes.
    const ALIGNMENT: usize = if mem::align_of::<T>() > ALIGN {
        mem::align_of::<T>()
    } else {
        ALIGN
    };

    /// Creates an empty array that will allocate from `alloc`.
    pub fn new_in(alloc: A) -> Self {
        const {
            assert!(
                ALIGN >= MIN_ALIGNMENT && ALIGN.is_power_of_two(),
                "ALIGN must be a power of two of at least 16"
            )
        };
        AlignedArray {
            // Unallocated, but still reports an `ALIGNMENT`-aligned address.
            ptr: unsafe {
                NonNull::new_unchecked(std::ptr::without_provenance_mut(Self::ALIGNMENT))
            },
            len: 0,
            capacity: 0,
            alloc,
        }
    }

    /// Creates an empty array with room for exactly `capacity` elements.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        Self::try_with_capacity_in(capacity, alloc).unwrap_or_else(|e| fail(e))
    }

    pub fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<Self> {
        let mut array = Self::new_in(alloc);
        if capacity != 0 {
            let retired = array.reallocate(capacity)?;
            unsafe { array.release(retired) };
        }
        Ok(array)
    }

    /// Number of elements in the array.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the current block can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Alignment of the storage block in bytes.
    #[inline]
    pub fn alignment(&self) -> usize {
        Self::ALIGNMENT
    }

    /// Size of the owned block in bytes.
    #[inline]
    pub fn heap_size(&self) -> usize {
        self.capacity * mem::size_of::<T>()
    }

    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Appends `value`, growing the block to `(capacity + 1) * 2` elements if
    /// the array is full.
    ///
    /// Growing invalidates all pointers into the array. The value is written to
    /// the new block before the old one is released, so pushing an element
    /// read from the array itself is fine.
    #[inline]
    pub fn push(&mut self, value: T) {
        if let Err(e) = self.try_push(value) {
            fail(e);
        }
    }

    pub fn try_push(&mut self, value: T) -> Result<()> {
        let retired = if self.len == self.capacity {
            Some(self.reallocate(growth::for_push(self.capacity)?)?)
        } else {
            None
        };

        unsafe { self.ptr.as_ptr().add(self.len).write(value) };
        self.len += 1;

        if let Some(retired) = retired {
            unsafe { self.release(retired) };
        }
        Ok(())
    }

    /// Removes the last element and returns it.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(unsafe { self.ptr.as_ptr().add(self.len).read() })
    }

    /// Sets the length to `new_len`.
    ///
    /// Growing past the capacity reallocates to `new_len + capacity * 2`
    /// elements. Slots between the old and the new length are zero-filled.
    /// Shrinking only adjusts the length; the block is kept.
    pub fn resize(&mut self, new_len: usize)
    where
        T: bytemuck::Zeroable,
    {
        if let Err(e) = self.try_resize(new_len) {
            fail(e);
        }
    }

    pub fn try_resize(&mut self, new_len: usize) -> Result<()>
    where
        T: bytemuck::Zeroable,
    {
        let old_len = self.len;
        unsafe { self.set_len_growing(new_len)? };
        if new_len > old_len {
            unsafe {
                self.ptr
                    .as_ptr()
                    .add(old_len)
                    .write_bytes(0, new_len - old_len)
            };
        }
        Ok(())
    }

    /// Same as [`resize`](Self::resize), but the slots between the old and the
    /// new length are left as they are.
    ///
    /// # Safety
    ///
    /// When growing, the new slots may hold uninitialized memory or stale
    /// values. The caller must write every one of them before reading it.
    pub unsafe fn resize_uninit(&mut self, new_len: usize) {
        if let Err(e) = unsafe { self.set_len_growing(new_len) } {
            fail(e);
        }
    }

    /// Grows the array by `count` zeroed elements and returns them for
    /// in-place writing.
    pub fn append(&mut self, count: usize) -> &mut [T]
    where
        T: bytemuck::Zeroable,
    {
        self.try_append(count).unwrap_or_else(|e| fail(e))
    }

    pub fn try_append(&mut self, count: usize) -> Result<&mut [T]>
    where
        T: bytemuck::Zeroable,
    {
        let start = self.len;
        let new_len = start
            .checked_add(count)
            .ok_or_else(|| Error::capacity_overflow(count))?;
        self.try_resize(new_len)?;
        Ok(&mut self.as_mut_slice()[start..])
    }

    /// Grows the array by `count` elements without initializing them and
    /// returns them for in-place writing.
    ///
    /// # Safety
    ///
    /// The returned slots are already counted in [`len`](Self::len). The
    /// caller must initialize all of them before the array is read.
    pub unsafe fn append_uninit(&mut self, count: usize) -> &mut [MaybeUninit<T>] {
        match unsafe { self.try_append_uninit(count) } {
            Ok(slots) => slots,
            Err(e) => fail(e),
        }
    }

    unsafe fn try_append_uninit(&mut self, count: usize) -> Result<&mut [MaybeUninit<T>]> {
        let start = self.len;
        let new_len = start
            .checked_add(count)
            .ok_or_else(|| Error::capacity_overflow(count))?;
        unsafe {
            self.set_len_growing(new_len)?;
            Ok(std::slice::from_raw_parts_mut(
                self.ptr.as_ptr().add(start).cast::<MaybeUninit<T>>(),
                count,
            ))
        }
    }

    /// Ensures room for at least `additional` more elements.
    pub fn reserve(&mut self, additional: usize) {
        if let Err(e) = self.try_reserve(additional) {
            fail(e);
        }
    }

    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or_else(|| Error::capacity_overflow(additional))?;
        if required > self.capacity {
            let retired = self.reallocate(growth::for_resize(self.capacity, required)?)?;
            unsafe { self.release(retired) };
        }
        Ok(())
    }

    /// Appends a copy of every element of `values`.
    pub fn extend_from_slice(&mut self, values: &[T]) {
        if let Err(e) = self.try_extend_from_slice(values) {
            fail(e);
        }
    }

    pub fn try_extend_from_slice(&mut self, values: &[T]) -> Result<()> {
        let slots = unsafe { self.try_append_uninit(values.len())? };
        unsafe {
            std::ptr::copy_nonoverlapping(
                values.as_ptr(),
                slots.as_mut_ptr().cast::<T>(),
                values.len(),
            )
        };
        Ok(())
    }

    /// Shortens the array to `len` elements. Has no effect if `len` is not
    /// smaller than the current length. The capacity is unchanged.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len);
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Returns the element at `index`, or an `IndexOutOfRange` error.
    #[inline]
    pub fn try_get(&self, index: usize) -> Result<&T> {
        let index = verify_index(index, self.len)?;
        Ok(unsafe { self.get_unchecked(index) })
    }

    #[inline]
    pub fn try_get_mut(&mut self, index: usize) -> Result<&mut T> {
        let index = verify_index(index, self.len)?;
        Ok(unsafe { self.get_unchecked_mut(index) })
    }

    /// Returns the element at `index` without a bounds check in release builds.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len`](Self::len).
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len, "index out of range: {index} >= {}", self.len);
        unsafe { &*self.ptr.as_ptr().add(index) }
    }

    /// # Safety
    ///
    /// `index` must be less than [`len`](Self::len).
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len, "index out of range: {index} >= {}", self.len);
        unsafe { &mut *self.ptr.as_ptr().add(index) }
    }

    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Returns the raw bytes of the elements, e.g. for a vertex upload.
    #[inline]
    pub fn as_bytes(&self) -> &[u8]
    where
        T: bytemuck::NoUninit,
    {
        bytemuck::cast_slice(self.as_slice())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }
}

/// A block that has been swapped out by [`AlignedArray::reallocate`] and still
/// has to be returned to the allocator.
#[must_use]
struct RetiredBlock {
    ptr: NonNull<u8>,
    bytes: usize,
    capacity: usize,
}

impl<T: Copy, const ALIGN: usize, A: AlignedAlloc> AlignedArray<T, ALIGN, A> {
    /// Moves the elements into a freshly allocated block of `new_capacity`
    /// elements and installs it. The old block is handed back to the caller,
    /// which must release it once nothing refers to it anymore.
    ///
    /// On failure the array is left untouched.
    #[cold]
    fn reallocate(&mut self, new_capacity: usize) -> Result<RetiredBlock> {
        debug_assert!(new_capacity > self.capacity);
        let bytes = new_capacity
            .checked_mul(mem::size_of::<T>())
            .ok_or_else(|| Error::capacity_overflow(new_capacity))?;

        let block = self
            .alloc
            .allocate(bytes, Self::ALIGNMENT)
            .inspect_err(|e| log::warn!("aligned array: cannot grow to {new_capacity}: {e}"))?;
        debug_assert!(is_aligned_ptr(block.as_ptr(), Self::ALIGNMENT));

        if self.len != 0 {
            unsafe {
                self.alloc.copy_nonoverlapping(
                    block.as_ptr(),
                    self.ptr.as_ptr().cast::<u8>(),
                    self.len * mem::size_of::<T>(),
                )
            };
        }

        log::trace!(
            "aligned array: grow {} -> {} elements ({bytes} bytes, align {}, {} copy)",
            self.capacity,
            new_capacity,
            Self::ALIGNMENT,
            bulk_copy::STRATEGY,
        );

        let retired = RetiredBlock {
            ptr: self.ptr.cast(),
            bytes: self.heap_size(),
            capacity: self.capacity,
        };
        self.ptr = block.cast();
        self.capacity = new_capacity;
        Ok(retired)
    }

    /// # Safety
    ///
    /// `retired` must come from `reallocate` on this array, and no pointer into
    /// it may be used afterwards.
    #[inline]
    unsafe fn release(&self, retired: RetiredBlock) {
        if retired.capacity != 0 {
            unsafe {
                self.alloc
                    .free(retired.ptr, retired.bytes, Self::ALIGNMENT)
            };
        }
    }

    /// Sets the length, reallocating with the resize growth policy when
    /// `new_len` exceeds the capacity.
    ///
    /// # Safety
    ///
    /// Slots between the old and the new length are not initialized.
    unsafe fn set_len_growing(&mut self, new_len: usize) -> Result<()> {
        if new_len > self.capacity {
            let retired = self.reallocate(growth::for_resize(self.capacity, new_len)?)?;
            unsafe { self.release(retired) };
        }
        self.len = new_len;
        Ok(())
    }
}

impl<T: Copy, const ALIGN: usize, A: AlignedAlloc> Drop for AlignedArray<T, ALIGN, A> {
    fn drop(&mut self) {
        if self.capacity != 0 {
            unsafe {
                self.alloc
                    .free(self.ptr.cast(), self.heap_size(), Self::ALIGNMENT)
            };
        }
    }
}

/// Routes a growth error to the process-wide failure policy.
#[cold]
#[track_caller]
fn fail(error: Error) -> ! {
    if let ErrorKind::AllocationFailure { size, alignment } = *error.kind() {
        if let Ok(layout) = std::alloc::Layout::from_size_align(size, alignment) {
            std::alloc::handle_alloc_error(layout);
        }
    }
    panic!("{error}");
}

#[cold]
#[track_caller]
fn index_out_of_range(index: usize, len: usize) -> ! {
    panic!("{}", Error::index_out_of_range(index, len));
}

impl<T: Copy, const ALIGN: usize, A: AlignedAlloc> Index<usize> for AlignedArray<T, ALIGN, A> {
    type Output = T;

    #[inline]
    #[track_caller]
    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => index_out_of_range(index, self.len),
        }
    }
}

impl<T: Copy, const ALIGN: usize, A: AlignedAlloc> IndexMut<usize> for AlignedArray<T, ALIGN, A> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        match self.get_mut(index) {
            Some(value) => value,
            None => index_out_of_range(index, len),
        }
    }
}

impl<T: Copy, const ALIGN: usize, A: AlignedAlloc> Deref for AlignedArray<T, ALIGN, A> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Copy, const ALIGN: usize, A: AlignedAlloc> DerefMut for AlignedArray<T, ALIGN, A> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: Copy, const ALIGN: usize, A: AlignedAlloc + Default> Default for AlignedArray<T, ALIGN, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T: Copy + std::fmt::Debug, const ALIGN: usize, A: AlignedAlloc> std::fmt::Debug
    for AlignedArray<T, ALIGN, A>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedArray")
            .field("values", &self.as_slice())
            .field("len", &self.len)
            .field("cap", &self.capacity)
            .field("alignment", &Self::ALIGNMENT)
            .finish_non_exhaustive()
    }
}

impl<T: Copy + PartialEq, const ALIGN: usize, A: AlignedAlloc> PartialEq
    for AlignedArray<T, ALIGN, A>
{
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Copy + Eq, const ALIGN: usize, A: AlignedAlloc> Eq for AlignedArray<T, ALIGN, A> {}

impl<T: Copy, const ALIGN: usize, A: AlignedAlloc> Extend<T> for AlignedArray<T, ALIGN, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for value in iter {
            self.push(value);
        }
    }
}

impl<'a, T: Copy + 'a, const ALIGN: usize, A: AlignedAlloc> Extend<&'a T>
    for AlignedArray<T, ALIGN, A>
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T: Copy, const ALIGN: usize> FromIterator<T> for AlignedArray<T, ALIGN, SystemAlloc> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<'a, T: Copy, const ALIGN: usize, A: AlignedAlloc> IntoIterator
    for &'a AlignedArray<T, ALIGN, A>
{
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T: Copy, const ALIGN: usize, A: AlignedAlloc> IntoIterator
    for &'a mut AlignedArray<T, ALIGN, A>
{
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
