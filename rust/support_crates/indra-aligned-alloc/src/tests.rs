use std::{cell::Cell, ptr::NonNull};

use indra_common::error::ErrorKind;

use crate::{
    AlignedAlloc, AllocError, SIMD_ALIGNMENT, SystemAlloc,
    align::{is_aligned, is_aligned_ptr},
    bulk_copy,
};

#[test]
fn test_system_alloc_alignments() {
    for alignment in [16, 32, 64, 128, 4096] {
        for size in [1, 15, 16, 17, 1000, 65536] {
            let p = SystemAlloc.allocate(size, alignment).expect("allocate");
            assert!(is_aligned_ptr(p.as_ptr(), alignment));
            unsafe {
                p.as_ptr().write_bytes(0xAB, size);
                assert_eq!(*p.as_ptr().add(size - 1), 0xAB);
                SystemAlloc.free(p, size, alignment);
            }
        }
    }
}

#[test]
fn test_system_alloc_zero_size() {
    let p = SystemAlloc.allocate(0, SIMD_ALIGNMENT).expect("allocate");
    assert!(is_aligned_ptr(p.as_ptr(), SIMD_ALIGNMENT));
    unsafe { SystemAlloc.free(p, 0, SIMD_ALIGNMENT) };
}

#[test]
fn test_system_alloc_invalid_alignment() {
    let err = SystemAlloc.allocate(64, 24).unwrap_err();
    assert_eq!(
        err,
        AllocError::InvalidLayout {
            size: 64,
            alignment: 24
        }
    );

    let err: indra_common::error::Error = err.into();
    assert!(matches!(
        err.kind(),
        ErrorKind::InvalidAlignment { alignment: 24 }
    ));
}

#[test]
fn test_system_alloc_oversized_layout() {
    let err = SystemAlloc.allocate(usize::MAX - 8, 16).unwrap_err();
    assert!(matches!(err, AllocError::InvalidLayout { .. }));
    let err: indra_common::error::Error = err.into();
    assert!(matches!(err.kind(), ErrorKind::CapacityOverflow { .. }));
}

#[test]
fn test_out_of_memory_conversion() {
    let err = AllocError::OutOfMemory {
        size: 1 << 20,
        alignment: 64,
    };
    assert_eq!(err.to_string(), "out of memory: 1048576 bytes, alignment 64");

    let err: indra_common::error::Error = err.into();
    assert!(err.is_allocation_failure());
    assert!(matches!(
        err.kind(),
        ErrorKind::AllocationFailure {
            size: 1048576,
            alignment: 64
        }
    ));
}

#[test]
fn test_bulk_copy_aligned_and_unaligned() {
    let src: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
    for len in [0, 1, 15, 16, 63, 64, 65, 127, 128, 200, 999] {
        let s = SystemAlloc.allocate(1024, 16).unwrap();
        let d = SystemAlloc.allocate(1024, 16).unwrap();
        unsafe {
            std::ptr::copy_nonoverlapping(src.as_ptr(), s.as_ptr(), 1000);
            d.as_ptr().write_bytes(0, 1024);

            // aligned source and destination
            bulk_copy::copy_nonoverlapping(d.as_ptr(), s.as_ptr(), len);
            let copied = std::slice::from_raw_parts(d.as_ptr(), len);
            assert_eq!(copied, &src[..len], "aligned len = {len}");
            assert_eq!(*d.as_ptr().add(len), 0);

            // misaligned destination
            d.as_ptr().write_bytes(0, 1024);
            bulk_copy::copy_nonoverlapping(d.as_ptr().add(1), s.as_ptr(), len);
            let copied = std::slice::from_raw_parts(d.as_ptr().add(1), len);
            assert_eq!(copied, &src[..len], "unaligned len = {len}");

            SystemAlloc.free(s, 1024, 16);
            SystemAlloc.free(d, 1024, 16);
        }
    }
    assert!(!bulk_copy::STRATEGY.is_empty());
}

#[test]
fn test_alloc_by_reference() {
    struct Tracking {
        live: Cell<isize>,
    }

    unsafe impl AlignedAlloc for Tracking {
        fn allocate(&self, size: usize, alignment: usize) -> Result<NonNull<u8>, AllocError> {
            self.live.set(self.live.get() + 1);
            SystemAlloc.allocate(size, alignment)
        }

        unsafe fn free(&self, ptr: NonNull<u8>, size: usize, alignment: usize) {
            self.live.set(self.live.get() - 1);
            unsafe { SystemAlloc.free(ptr, size, alignment) }
        }
    }

    fn roundtrip<A: AlignedAlloc>(alloc: A) {
        let p = alloc.allocate(256, 32).unwrap();
        let q = alloc.allocate(256, 32).unwrap();
        unsafe {
            p.as_ptr().write_bytes(7, 256);
            alloc.copy_nonoverlapping(q.as_ptr(), p.as_ptr(), 256);
            assert_eq!(*q.as_ptr().add(255), 7);
            alloc.free(p, 256, 32);
            alloc.free(q, 256, 32);
        }
    }

    let tracking = Tracking { live: Cell::new(0) };
    roundtrip(&tracking);
    assert_eq!(tracking.live.get(), 0);
}

#[test]
fn test_align_helpers() {
    assert!(is_aligned(4096, 4096));
    assert!(!is_aligned(4097, 16));
    assert!(!is_aligned_ptr(std::ptr::without_provenance::<u8>(64), 3));
}
