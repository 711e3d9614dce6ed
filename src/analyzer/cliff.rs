use std::collections::BTreeSet;

use crate::RankedList;

/// Finds the classes suspected in this cycle.
///
/// The deltas are scanned for the first entry whose delta is more than twice the next one;
/// every class ranked up to that entry is suspected.
/// Nothing is suspected if there is no such drop, or if the top delta is not positive.
pub fn current_suspects<V>(deltas: &RankedList<V, i64>) -> BTreeSet<V>
where
    V: Clone + Ord,
{
    let Some(drop) = find_drop(deltas) else {
        return BTreeSet::new();
    };

    deltas
        .iter()
        .take(drop)
        .map(|entry| entry.value.clone())
        .collect()
}

/// Returns the position of the first entry after the drop.
fn find_drop<V>(deltas: &RankedList<V, i64>) -> Option<usize> {
    if deltas.len() < 2 {
        return None;
    }
    // all deltas are zero or negative: nothing is growing
    if deltas.first()?.count <= 0 {
        return None;
    }

    deltas
        .iter()
        .zip(deltas.iter().skip(1))
        .position(|(entry, next)| entry.count > next.count.saturating_mul(2))
        .map(|index| index + 1)
}
