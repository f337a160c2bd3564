//! Non-aliasing bulk copy using aligned SSE2 loads and stores.
//!
//! When both blocks start on a 16-byte boundary (which every aligned container
//! block does), the body is moved in 64-byte strides of four 128-bit lanes and
//! the tail falls back to `ptr::copy_nonoverlapping`. Unaligned or short
//! copies go straight to the portable routine.

use std::arch::x86_64::{__m128i, _mm_load_si128, _mm_store_si128};

/// Name of the copy strategy compiled for this target.
pub const STRATEGY: &str = "sse2";

const LANE: usize = 16;
const STRIDE: usize = 4 * LANE;

/// Copies `len` bytes from `src` to `dst`.
///
/// # Safety
///
/// Both ranges must be valid for `len` bytes and must not overlap.
#[inline]
pub unsafe fn copy_nonoverlapping(dst: *mut u8, src: *const u8, len: usize) {
    if len < STRIDE || ((dst.addr() | src.addr()) & (LANE - 1)) != 0 {
        unsafe { std::ptr::copy_nonoverlapping(src, dst, len) };
        return;
    }

    let strides = len / STRIDE;
    // SSE2 is part of the x86_64 baseline.
    unsafe {
        let mut s = src as *const __m128i;
        let mut d = dst as *mut __m128i;
        for _ in 0..strides {
            let a = _mm_load_si128(s);
            let b = _mm_load_si128(s.add(1));
            let c = _mm_load_si128(s.add(2));
            let e = _mm_load_si128(s.add(3));
            _mm_store_si128(d, a);
            _mm_store_si128(d.add(1), b);
            _mm_store_si128(d.add(2), c);
            _mm_store_si128(d.add(3), e);
            s = s.add(4);
            d = d.add(4);
        }

        let done = strides * STRIDE;
        if done < len {
            std::ptr::copy_nonoverlapping(src.add(done), dst.add(done), len - done);
        }
    }
}
