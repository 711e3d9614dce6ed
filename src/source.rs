use crate::{RankedList, ValueType};

/// A producer of ranked snapshots, sampled once per analysis cycle.
///
/// Implemented by the instrumentation shipped with this crate ([`crate::SizeClassAllocator`] and [`crate::CallSiteTable`]),
/// and by any closure wrapped with [`from_fn`].
pub trait SnapshotSource<V: ValueType> {
    /// Takes a snapshot of the live instance count of each class, keeping the top `ranking_size` ones.
    fn sample(&mut self, ranking_size: usize) -> RankedList<V>;
}

/// A [`SnapshotSource`] which calls a closure. See [`from_fn`].
#[derive(Debug, Clone)]
pub struct FromFn<F>(F);

/// Creates a [`SnapshotSource`] from a closure, which is called with the ranking size.
///
/// ```rust
/// use leakanalyzer::{LeakAnalyzer, RankedList, SizeClass};
///
/// let mut analyzer = LeakAnalyzer::new(8, 3).expect("valid config");
/// let mut source = leakanalyzer::from_fn(|ranking_size| {
///     let mut snapshot = RankedList::new(ranking_size);
///     snapshot.add(SizeClass::of(32), 12);
///     snapshot
/// });
///
/// analyzer.sample(&mut source);
/// ```
pub fn from_fn<V, F>(f: F) -> FromFn<F>
where
    V: ValueType,
    F: FnMut(usize) -> RankedList<V>,
{
    FromFn(f)
}

impl<V, F> SnapshotSource<V> for FromFn<F>
where
    V: ValueType,
    F: FnMut(usize) -> RankedList<V>,
{
    fn sample(&mut self, ranking_size: usize) -> RankedList<V> {
        (self.0)(ranking_size)
    }
}
