/// A single entry of a [`RankedList`]: a value and how many times it was counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<V, C = usize> {
    pub value: V,
    pub count: C,
}

/// A bounded list of entries, kept sorted by count in descending order.
///
/// Entries with the same count keep the order in which they were added.
/// Once the list holds `max_size` entries, adding an entry pushes out the lowest one,
/// unless the new entry would rank past the end itself, in which case it is discarded.
///
/// ```rust
/// use leakanalyzer::RankedList;
///
/// let mut list = RankedList::new(2);
/// list.add("a", 10);
/// list.add("b", 30);
/// list.add("c", 20);
///
/// let values: Vec<_> = list.iter().map(|entry| entry.value).collect();
/// assert_eq!(values, vec!["b", "c"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedList<V, C = usize> {
    max_size: usize,
    entries: Vec<Entry<V, C>>,
}

impl<V, C> Default for RankedList<V, C> {
    fn default() -> Self {
        Self {
            max_size: 0,
            entries: Vec::new(),
        }
    }
}

impl<V, C> RankedList<V, C>
where
    C: Ord + Copy,
{
    /// Creates a new empty [`RankedList`] which holds at most `max_size` entries.
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            entries: Vec::with_capacity(max_size),
        }
    }

    /// Adds `value` with `count`, keeping the list sorted and bounded.
    pub fn add(&mut self, value: V, count: C) {
        // insert after any entry with the same count
        let index = self.entries.partition_point(|entry| entry.count >= count);
        if index >= self.max_size {
            return;
        }

        self.entries.insert(index, Entry { value, count });
        self.entries.truncate(self.max_size);
    }

    /// Returns the same list, bounded to `max_size` entries.
    pub fn capped(mut self, max_size: usize) -> Self {
        self.entries.truncate(max_size);
        self.max_size = max_size;
        self
    }
}

impl<V, C> RankedList<V, C> {
    /// The maximum amount of entries in the list.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The highest ranked entry.
    pub fn first(&self) -> Option<&Entry<V, C>> {
        self.entries.first()
    }

    /// Iterates over the entries from the highest count to the lowest.
    pub fn iter(&self) -> std::slice::Iter<'_, Entry<V, C>> {
        self.entries.iter()
    }

    /// Looks up the entry for `value`.
    ///
    /// This is a linear scan; lists are expected to be small.
    pub fn find(&self, value: &V) -> Option<&Entry<V, C>>
    where
        V: PartialEq,
    {
        self.entries.iter().find(|entry| entry.value == *value)
    }
}

impl<'a, V, C> IntoIterator for &'a RankedList<V, C> {
    type Item = &'a Entry<V, C>;
    type IntoIter = std::slice::Iter<'a, Entry<V, C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<V, C> Extend<(V, C)> for RankedList<V, C>
where
    C: Ord + Copy,
{
    fn extend<I: IntoIterator<Item = (V, C)>>(&mut self, iter: I) {
        for (value, count) in iter {
            self.add(value, count);
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;

    fn counts(list: &RankedList<&'static str, i64>) -> Vec<(&'static str, i64)> {
        list.iter().map(|entry| (entry.value, entry.count)).collect()
    }

    #[test]
    fn test_should_keep_entries_sorted() {
        let mut list = RankedList::new(5);
        list.extend([("a", 3), ("b", 7), ("c", -2), ("d", 5)]);

        assert_eq!(counts(&list), vec![("b", 7), ("d", 5), ("a", 3), ("c", -2)]);
        assert_eq!(list.first().map(|entry| entry.value), Some("b"));
    }

    #[test]
    fn test_should_keep_insertion_order_on_ties() {
        let mut list = RankedList::new(5);
        list.extend([("a", 1), ("b", 2), ("c", 1), ("d", 2)]);

        assert_eq!(counts(&list), vec![("b", 2), ("d", 2), ("a", 1), ("c", 1)]);
    }

    #[test]
    fn test_should_truncate_beyond_max_size() {
        let mut list = RankedList::new(2);
        list.extend([("a", 1), ("b", 2), ("c", 3)]);
        assert_eq!(counts(&list), vec![("c", 3), ("b", 2)]);

        // ranks past the end, so it is dropped
        list.add("d", 2);
        assert_eq!(counts(&list), vec![("c", 3), ("b", 2)]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_should_hold_nothing_with_zero_capacity() {
        let mut list = RankedList::new(0);
        list.add("a", 1);
        assert!(list.is_empty());
        assert!(RankedList::<&str, i64>::default().is_empty());
    }

    #[test]
    fn test_should_cap_list() {
        let mut list = RankedList::new(4);
        list.extend([("a", 4), ("b", 3), ("c", 2), ("d", 1)]);

        let list = list.capped(2);
        assert_eq!(list.max_size(), 2);
        assert_eq!(counts(&list), vec![("a", 4), ("b", 3)]);
    }

    #[test]
    fn test_should_find_entry() {
        let mut list = RankedList::new(3);
        list.extend([("a", 4), ("b", 3)]);

        assert_eq!(list.find(&"b").map(|entry| entry.count), Some(3));
        assert!(list.find(&"z").is_none());
    }
}
