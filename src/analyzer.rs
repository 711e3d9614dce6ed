mod cliff;
mod suspicion;

use std::collections::BTreeSet;

use self::suspicion::SuspicionTable;
use crate::report::Report;
use crate::{AnalyzerConfig, ConfigError, RankedList, SnapshotSource, ValueType};

/// Tells persistent, growing allocation patterns apart from transient spikes.
///
/// The [`LeakAnalyzer`] is fed once per cycle with a ranked snapshot of the live instance count of each class.
/// Each cycle, the growth of each class since the previous snapshot is ranked, and the classes at the top of the ranking,
/// before the first drop of more than 50%, are suspected.
///
/// A class suspected for `score_threshold` consecutive cycles is reported by [`LeakAnalyzer::suspects`];
/// a single cycle without suspicion resets its score.
///
/// ```rust
/// use leakanalyzer::{LeakAnalyzer, RankedList, SizeClass};
///
/// let mut analyzer = LeakAnalyzer::new(4, 2).expect("valid config");
///
/// for cycle in 1..=3 {
///     let mut snapshot = RankedList::new(4);
///     snapshot.add(SizeClass::of(64), cycle * 1000);
///     snapshot.add(SizeClass::of(16), 10);
///     analyzer.submit(snapshot);
/// }
///
/// assert_eq!(analyzer.suspects(), &[SizeClass::of(64)]);
/// ```
#[derive(Debug, Clone)]
pub struct LeakAnalyzer<V: ValueType> {
    config: AnalyzerConfig,
    previous: RankedList<V>,
    current: RankedList<V>,
    suspicion: SuspicionTable<V>,
    suspects: Vec<V>,
    cycles: u64,
}

impl<V: ValueType> LeakAnalyzer<V> {
    /// Creates a new [`LeakAnalyzer`] ranking `ranking_size` classes,
    /// which reports classes suspected for `score_threshold` cycles in a row.
    pub fn new(ranking_size: usize, score_threshold: u32) -> Result<Self, ConfigError> {
        Self::with_config(AnalyzerConfig::new(ranking_size, score_threshold))
    }

    /// Creates a new [`LeakAnalyzer`] with the given [`AnalyzerConfig`].
    pub fn with_config(config: AnalyzerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            config,
            previous: RankedList::new(config.ranking_size),
            current: RankedList::new(config.ranking_size),
            suspicion: SuspicionTable::new(config.ranking_size),
            suspects: Vec::new(),
            cycles: 0,
        })
    }

    /// Analyzes a new snapshot, advancing by one cycle.
    ///
    /// Snapshots larger than the ranking size are capped.
    pub fn submit(&mut self, snapshot: RankedList<V>) {
        let ranking_size = self.config.ranking_size;
        if snapshot.len() > ranking_size {
            tracing::warn!(
                "snapshot holds {} entries, more than the ranking size {ranking_size}; capping it",
                snapshot.len()
            );
        }

        self.previous = std::mem::replace(&mut self.current, snapshot.capped(ranking_size));
        self.cycles += 1;

        let deltas = self.deltas();
        tracing::trace!(cycle = self.cycles, ?deltas, "ranked deltas");

        let current_suspects = cliff::current_suspects(&deltas);
        tracing::trace!(cycle = self.cycles, ?current_suspects, "current suspects");

        self.update_scores(&current_suspects);
    }

    /// Takes a snapshot from `source` and submits it.
    pub fn sample<S>(&mut self, source: &mut S)
    where
        S: SnapshotSource<V>,
    {
        let snapshot = source.sample(self.config.ranking_size);
        self.submit(snapshot);
    }

    /// The classes currently reported as leak suspects, in the order of the values.
    ///
    /// Empty until a class has been suspected for long enough.
    pub fn suspects(&self) -> &[V] {
        &self.suspects
    }

    /// The last submitted snapshot.
    pub fn latest_snapshot(&self) -> &RankedList<V> {
        &self.current
    }

    /// The count of `value` in the snapshot submitted before the last one, if it was ranked there.
    pub fn previous_count(&self, value: &V) -> Option<usize> {
        self.previous.find(value).map(|entry| entry.count)
    }

    /// The suspicion score of `value`, if it is being tracked.
    pub fn score(&self, value: &V) -> Option<u32> {
        self.suspicion.score(value)
    }

    /// Amount of classes with a suspicion score.
    pub fn tracked(&self) -> usize {
        self.suspicion.len()
    }

    /// Amount of snapshots submitted so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Renders the top entries of the latest snapshot and the suspects, keeping at most `buffer_size - 1` bytes.
    pub fn dump(&self, buffer_size: usize) -> String {
        Report::new(self).render(buffer_size)
    }

    /// Ranks the growth of each class of the current snapshot.
    ///
    /// Classes missing from the previous snapshot count as if they had no instances.
    fn deltas(&self) -> RankedList<V, i64> {
        let mut deltas = RankedList::new(self.config.ranking_size);
        for entry in &self.current {
            let previous = self.previous_count(&entry.value).unwrap_or_default();
            deltas.add(entry.value.clone(), delta(entry.count, previous));
        }

        deltas
    }

    fn update_scores(&mut self, current_suspects: &BTreeSet<V>) {
        self.suspicion.reset(current_suspects);
        tracing::debug!(
            cycle = self.cycles,
            scores = ?self.suspicion.iter().collect::<Vec<_>>(),
            "scores after reset"
        );

        self.suspicion.reinforce(current_suspects);
        tracing::debug!(
            cycle = self.cycles,
            scores = ?self.suspicion.iter().collect::<Vec<_>>(),
            "scores after reinforcement"
        );

        let confirmed = self.suspicion.confirmed(self.config.score_threshold);
        for value in confirmed.iter().filter(|value| !self.suspects.contains(value)) {
            tracing::warn!(
                "{} {value} is a leak suspect (score {})",
                value.type_name(),
                self.suspicion.score(value).unwrap_or_default()
            );
        }
        self.suspects = confirmed;
    }
}

/// Computes `current - previous`, saturating at the bounds of an [`i64`].
fn delta(current: usize, previous: usize) -> i64 {
    let delta = current as i128 - previous as i128;
    delta.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}
