//! Capacity growth policy.
//!
//! Two formulas are in use. A single push that finds the array full grows to
//! `(capacity + 1) * 2`. A resize past capacity grows to
//! `new_len + capacity * 2`, i.e. the requested length plus twice the old
//! capacity as headroom. Both are strictly increasing, so capacity is monotonic
//! and a sequence of pushes costs amortized O(1) each.

use indra_common::{Result, error::Error};

/// Capacity after a push into a full array.
#[inline]
pub(crate) fn for_push(capacity: usize) -> Result<usize> {
    capacity
        .checked_add(1)
        .and_then(|c| c.checked_mul(2))
        .ok_or_else(|| Error::capacity_overflow(capacity))
}

/// Capacity after growing the length to `new_len`, which exceeds `capacity`.
#[inline]
pub(crate) fn for_resize(capacity: usize, new_len: usize) -> Result<usize> {
    debug_assert!(new_len > capacity);
    capacity
        .checked_mul(2)
        .and_then(|c| c.checked_add(new_len))
        .ok_or_else(|| Error::capacity_overflow(new_len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_growth() {
        assert_eq!(for_push(0).unwrap(), 2);
        assert_eq!(for_push(2).unwrap(), 6);
        assert_eq!(for_push(6).unwrap(), 14);
        assert!(for_push(usize::MAX / 2).is_err());
    }

    #[test]
    fn test_resize_growth() {
        assert_eq!(for_resize(0, 3).unwrap(), 3);
        assert_eq!(for_resize(3, 4).unwrap(), 10);
        assert_eq!(for_resize(10, 100).unwrap(), 120);
        assert!(for_resize(usize::MAX / 2 + 1, usize::MAX).is_err());
    }
}
