mod demangle;

use std::collections::HashMap;

use crate::{CallSite, RankedList, SnapshotSource};

/// A table of live instance counts, by [`CallSite`].
///
/// Instances are recorded explicitly with [`CallSiteTable::track`], which resolves the call site from the current
/// backtrace, and released with [`CallSiteTable::release`].
/// Only the functions of the given `modules` (e.g. `my_crate`) are considered call sites, since the backtrace is
/// polluted by calls to [`std::vec`], [`std::collections`], etc.
///
/// ```rust
/// use leakanalyzer::CallSiteTable;
///
/// let mut table = CallSiteTable::new(&["rust_out"]);
/// let site = table.track();
/// assert_eq!(table.live(&site), 1);
///
/// table.release(&site);
/// assert_eq!(table.live(&site), 0);
/// ```
#[derive(Debug)]
pub struct CallSiteTable {
    /// The modules that are being traced.
    modules: Vec<String>,
    /// Live instance count of each call site.
    sites: HashMap<CallSite, usize>,
}

impl CallSiteTable {
    /// Creates a new [`CallSiteTable`] tracing the given modules.
    pub fn new(modules: &[&str]) -> Self {
        Self {
            modules: modules.iter().map(|module| module.to_string()).collect(),
            sites: HashMap::new(),
        }
    }

    /// Records a new instance created by the caller, and returns its [`CallSite`].
    ///
    /// Callers which cannot be resolved are all recorded as `<unknown>`.
    pub fn track(&mut self) -> CallSite {
        let modules: Vec<&str> = self.modules.iter().map(String::as_str).collect();
        let name =
            demangle::caller_name(&modules).unwrap_or_else(|| demangle::UNKNOWN.to_string());

        self.track_named(&name)
    }

    /// Records a new instance created at `site`.
    pub fn track_at(&mut self, site: &CallSite) {
        self.track_named(site.name());
    }

    /// Records that an instance created at `site` has been dropped.
    pub fn release(&mut self, site: &CallSite) {
        if let Some(count) = self.sites.get_mut(site.name()) {
            *count = count.saturating_sub(1);
        }
    }

    /// Returns the number of live instances created at `site`.
    pub fn live(&self, site: &CallSite) -> usize {
        self.sites.get(site.name()).copied().unwrap_or_default()
    }

    /// Iterates over the [`CallSite`]s in the table, with their live instance count.
    pub fn iter(&self) -> impl Iterator<Item = (&CallSite, usize)> {
        self.sites.iter().map(|(site, count)| (site, *count))
    }

    /// Ranks the call sites by their live instance count, keeping the top `ranking_size` ones.
    pub fn snapshot(&self, ranking_size: usize) -> RankedList<CallSite> {
        // sort first, so ties do not depend on the hash map order
        let mut sites: Vec<_> = self.iter().filter(|(_, count)| *count > 0).collect();
        sites.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut snapshot = RankedList::new(ranking_size);
        snapshot.extend(sites.into_iter().map(|(site, count)| (site.clone(), count)));
        snapshot
    }

    fn track_named(&mut self, name: &str) -> CallSite {
        // reuse the interned name
        let site = self
            .sites
            .get_key_value(name)
            .map(|(site, _)| site.clone())
            .unwrap_or_else(|| CallSite::new(name));

        *self.sites.entry(site.clone()).or_default() += 1;
        site
    }
}

impl SnapshotSource<CallSite> for CallSiteTable {
    fn sample(&mut self, ranking_size: usize) -> RankedList<CallSite> {
        self.snapshot(ranking_size)
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_should_track_call_site() {
        let mut table = CallSiteTable::new(&["leakanalyzer"]);
        let site = make_instance(&mut table);
        assert!(site.name().contains("callsite::test::make_instance"));

        let again = make_instance(&mut table);
        assert_eq!(site, again);
        assert_eq!(table.live(&site), 2);

        table.release(&site);
        assert_eq!(table.live(&site), 1);
    }

    #[test]
    fn test_should_track_unknown_call_site() {
        let mut table = CallSiteTable::new(&["surely_not_a_crate_in_this_stack"]);
        let site = table.track();
        assert_eq!(site.name(), "<unknown>");
        assert_eq!(table.live(&site), 1);
    }

    #[test]
    fn test_should_not_release_below_zero() {
        let mut table = CallSiteTable::new(&["leakanalyzer"]);
        let site = CallSite::new("app::cache");
        table.release(&site);
        table.track_at(&site);
        table.release(&site);
        table.release(&site);
        assert_eq!(table.live(&site), 0);
    }

    #[test]
    fn test_should_rank_call_sites() {
        let mut table = CallSiteTable::new(&["leakanalyzer"]);
        let cache = CallSite::new("app::cache");
        let queue = CallSite::new("app::queue");
        let idle = CallSite::new("app::idle");
        for _ in 0..3 {
            table.track_at(&queue);
        }
        table.track_at(&cache);
        table.track_at(&idle);
        table.release(&idle);

        let snapshot = table.sample(1);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.first().map(|entry| entry.count), Some(3));

        let snapshot = table.snapshot(4);
        let ranked: Vec<_> = snapshot
            .iter()
            .map(|entry| (entry.value.name(), entry.count))
            .collect();
        assert_eq!(ranked, vec![("app::queue", 3), ("app::cache", 1)]);
        assert_eq!(table.iter().count(), 3);
    }

    fn make_instance(table: &mut CallSiteTable) -> CallSite {
        table.track()
    }
}
