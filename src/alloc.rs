use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{RankedList, SizeClass, SnapshotSource};

/// This module provides a custom Allocator ([`GlobalAlloc`]) that counts the live allocations of each [`SizeClass`],
/// so that they can be sampled into a [`crate::LeakAnalyzer`].
///
/// Counting is lock-free and never allocates, so it is safe to use as the global allocator.
///
/// ## Example
///
/// ```rust
/// use leakanalyzer::{LeakAnalyzer, SizeClass, SizeClassAllocator};
///
/// #[global_allocator]
/// static ALLOCATOR: SizeClassAllocator = SizeClassAllocator::init();
///
/// fn main() {
///     let mut analyzer = LeakAnalyzer::<SizeClass>::new(16, 4).expect("valid config");
///     analyzer.submit(ALLOCATOR.snapshot(16));
/// }
/// ```
pub struct SizeClassAllocator {
    allocated: AtomicUsize,
    live: [AtomicUsize; SizeClass::COUNT],
}

impl SizeClassAllocator {
    /// Creates a new instance of the [`SizeClassAllocator`].
    pub const fn init() -> Self {
        SizeClassAllocator {
            allocated: AtomicUsize::new(0),
            live: [const { AtomicUsize::new(0) }; SizeClass::COUNT],
        }
    }

    /// Returns the number of bytes currently allocated through the allocator.
    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }

    /// Returns the number of live allocations in `class`.
    pub fn live(&self, class: SizeClass) -> usize {
        self.live[class.index()].load(Ordering::Relaxed)
    }

    /// Ranks the size classes by their live allocation count, keeping the top `ranking_size` ones.
    ///
    /// Classes without live allocations are skipped.
    pub fn snapshot(&self, ranking_size: usize) -> RankedList<SizeClass> {
        let mut snapshot = RankedList::new(ranking_size);
        snapshot.extend(
            (0..SizeClass::COUNT)
                .filter_map(SizeClass::from_index)
                .map(|class| (class, self.live(class)))
                .filter(|(_, count)| *count > 0),
        );

        snapshot
    }

    fn track(&self, size: usize) {
        self.allocated.fetch_add(size, Ordering::Relaxed);
        self.live[SizeClass::of(size).index()].fetch_add(1, Ordering::Relaxed);
    }

    fn untrack(&self, size: usize) {
        self.allocated.fetch_sub(size, Ordering::Relaxed);
        self.live[SizeClass::of(size).index()].fetch_sub(1, Ordering::Relaxed);
    }
}

impl Default for SizeClassAllocator {
    fn default() -> Self {
        Self::init()
    }
}

unsafe impl GlobalAlloc for SizeClassAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            self.track(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            self.track(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if !ptr.is_null() {
            self.untrack(layout.size());
        }
        unsafe { System.dealloc(ptr, layout) };
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        // on failure the old block is still alive
        if !new_ptr.is_null() {
            self.untrack(layout.size());
            self.track(new_size);
        }
        new_ptr
    }
}

impl SnapshotSource<SizeClass> for &SizeClassAllocator {
    fn sample(&mut self, ranking_size: usize) -> RankedList<SizeClass> {
        self.snapshot(ranking_size)
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_should_count_live_allocations() {
        let allocator = SizeClassAllocator::init();
        let small = Layout::from_size_align(24, 8).expect("valid layout");
        let large = Layout::from_size_align(1000, 8).expect("valid layout");

        let a = unsafe { allocator.alloc(small) };
        let b = unsafe { allocator.alloc(small) };
        let c = unsafe { allocator.alloc_zeroed(large) };
        assert_eq!(allocator.live(SizeClass::of(24)), 2);
        assert_eq!(allocator.live(SizeClass::of(1000)), 1);
        assert_eq!(allocator.allocated(), 1048);

        unsafe { allocator.dealloc(a, small) };
        assert_eq!(allocator.live(SizeClass::of(24)), 1);
        assert_eq!(allocator.allocated(), 1024);

        unsafe {
            allocator.dealloc(b, small);
            allocator.dealloc(c, large);
        }
        assert_eq!(allocator.allocated(), 0);
        assert!(allocator.snapshot(4).is_empty());
    }

    #[test]
    fn test_should_move_realloc_to_new_class() {
        let allocator = SizeClassAllocator::init();
        let layout = Layout::from_size_align(16, 8).expect("valid layout");

        let ptr = unsafe { allocator.alloc(layout) };
        let ptr = unsafe { allocator.realloc(ptr, layout, 100) };
        assert!(!ptr.is_null());
        assert_eq!(allocator.live(SizeClass::of(16)), 0);
        assert_eq!(allocator.live(SizeClass::of(100)), 1);

        let grown = Layout::from_size_align(100, 8).expect("valid layout");
        unsafe { allocator.dealloc(ptr, grown) };
        assert_eq!(allocator.allocated(), 0);
    }

    #[test]
    fn test_should_rank_size_classes() {
        let allocator = SizeClassAllocator::init();
        let small = Layout::from_size_align(8, 8).expect("valid layout");
        let medium = Layout::from_size_align(64, 8).expect("valid layout");

        let ptrs: Vec<_> = (0..3)
            .map(|_| unsafe { allocator.alloc(small) })
            .chain(std::iter::once(unsafe { allocator.alloc(medium) }))
            .collect();

        let mut source = &allocator;
        let snapshot = source.sample(4);
        let ranked: Vec<_> = snapshot
            .iter()
            .map(|entry| (entry.value, entry.count))
            .collect();
        assert_eq!(ranked, vec![(SizeClass::of(8), 3), (SizeClass::of(64), 1)]);

        for (index, ptr) in ptrs.into_iter().enumerate() {
            let layout = if index < 3 { small } else { medium };
            unsafe { allocator.dealloc(ptr, layout) };
        }
    }
}
