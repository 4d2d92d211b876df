//! Information-set table for CFR regrets and strategy sums.
//!
//! This module holds the persistent memory of training: one
//! [`InfoSetEntry`] per information key ever visited, each carrying the
//! cumulative regret and cumulative strategy weight of its actions.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cfr::game::Action;
use crate::cfr::solver::SolverError;

/// Accumulated regret and strategy weight for one decision point.
///
/// `regret_sum[i]` and `strategy_sum[i]` belong to `actions[i]`. The action
/// list is fixed when the entry is first created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoSetEntry<A> {
    actions: Vec<A>,
    regret_sum: Vec<f64>,
    strategy_sum: Vec<f64>,
}

impl<A: Action> InfoSetEntry<A> {
    /// Create an entry with zero regret and zero strategy weight.
    pub fn new(actions: Vec<A>) -> Self {
        let num_actions = actions.len();
        Self {
            actions,
            regret_sum: vec![0.0; num_actions],
            strategy_sum: vec![0.0; num_actions],
        }
    }

    /// Actions of this information set, in the order of every vector here.
    pub fn actions(&self) -> &[A] {
        &self.actions
    }

    /// Cumulative counterfactual regret per action.
    pub fn regret_sum(&self) -> &[f64] {
        &self.regret_sum
    }

    /// Cumulative reach-weighted strategy per action.
    pub fn strategy_sum(&self) -> &[f64] {
        &self.strategy_sum
    }

    /// Current strategy by regret matching.
    ///
    /// The strategy is proportional to positive regrets. If no action has
    /// positive regret (including a fresh entry), returns a uniform strategy.
    pub fn current_strategy(&self) -> Vec<f64> {
        let num_actions = self.regret_sum.len();
        let positive_sum: f64 = self.regret_sum.iter().map(|&r| r.max(0.0)).sum();

        if positive_sum > 0.0 {
            self.regret_sum
                .iter()
                .map(|&r| r.max(0.0) / positive_sum)
                .collect()
        } else {
            vec![1.0 / num_actions as f64; num_actions]
        }
    }

    /// Time-averaged strategy (Nash equilibrium approximation).
    ///
    /// Falls back to uniform if the entry never accumulated any weight.
    pub fn average_strategy(&self) -> Vec<f64> {
        let num_actions = self.strategy_sum.len();
        let total: f64 = self.strategy_sum.iter().sum();

        if total > 0.0 {
            self.strategy_sum.iter().map(|&s| s / total).collect()
        } else {
            vec![1.0 / num_actions as f64; num_actions]
        }
    }

    /// Whether the strategy sum has any weight on it.
    pub fn is_reached(&self) -> bool {
        self.strategy_sum.iter().sum::<f64>() > 0.0
    }

    /// Add regret deltas, one per action.
    ///
    /// With `use_cfr_plus`, cumulative regrets are floored at zero after the
    /// update.
    pub fn add_regrets(&mut self, deltas: &[f64], use_cfr_plus: bool) {
        debug_assert_eq!(deltas.len(), self.regret_sum.len());

        for (sum, &delta) in self.regret_sum.iter_mut().zip(deltas) {
            *sum += delta;
            if use_cfr_plus && *sum < 0.0 {
                *sum = 0.0;
            }
        }
    }

    /// Add `weight * strategy[i]` to each action's strategy sum.
    pub fn add_strategy(&mut self, strategy: &[f64], weight: f64) {
        debug_assert_eq!(strategy.len(), self.strategy_sum.len());

        for (sum, &prob) in self.strategy_sum.iter_mut().zip(strategy) {
            *sum += prob * weight;
        }
    }

    fn add_difference(&mut self, worker: &Self, base: Option<&Self>, use_cfr_plus: bool) {
        for i in 0..self.regret_sum.len() {
            let base_regret = base.map_or(0.0, |b| b.regret_sum[i]);
            let base_strategy = base.map_or(0.0, |b| b.strategy_sum[i]);
            self.regret_sum[i] += worker.regret_sum[i] - base_regret;
            if use_cfr_plus && self.regret_sum[i] < 0.0 {
                self.regret_sum[i] = 0.0;
            }
            self.strategy_sum[i] += worker.strategy_sum[i] - base_strategy;
        }
    }
}

/// Mapping from information key to [`InfoSetEntry`].
///
/// Entries are created lazily on first visit and never removed. The table
/// owns every entry exclusively; callers only ever borrow them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoSetTable<A> {
    entries: FxHashMap<String, InfoSetEntry<A>>,
}

impl<A: Action> Default for InfoSetTable<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> InfoSetTable<A> {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// Look up an entry.
    pub fn get(&self, key: &str) -> Option<&InfoSetEntry<A>> {
        self.entries.get(key)
    }

    /// Look up an entry for mutation.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut InfoSetEntry<A>> {
        self.entries.get_mut(key)
    }

    /// Look up an entry, creating it from `actions` on first visit.
    ///
    /// `actions` is only called when the key is new.
    pub fn get_or_insert_with<F>(&mut self, key: &str, actions: F) -> &mut InfoSetEntry<A>
    where
        F: FnOnce() -> Vec<A>,
    {
        self.entries
            .entry(key.to_string())
            .or_insert_with(|| InfoSetEntry::new(actions()))
    }

    /// Number of information sets stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no information set has been visited yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if an info set exists in the table.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over `(key, entry)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &InfoSetEntry<A>)> {
        self.entries.iter()
    }

    /// Add what `worker` accumulated on top of `base` into this table.
    ///
    /// `worker` must have started as a clone of `base`. Both regret and
    /// strategy sums are linear, so merging the deltas of several workers in
    /// any order equals running their iterations on one table, up to
    /// floating-point rounding. With `use_cfr_plus` the merged regrets are
    /// floored at zero again.
    ///
    /// # Errors
    /// [`SolverError::InconsistentActions`] if `worker` created a key with a
    /// different action list than this table holds for it. Entries merged
    /// before the conflicting one stay merged.
    pub fn merge_delta(&mut self, base: &Self, worker: &Self, use_cfr_plus: bool) -> Result<(), SolverError> {
        for (key, worker_entry) in worker.iter() {
            let base_entry = base.get(key);
            let target = self.get_or_insert_with(key, || worker_entry.actions.clone());
            if target.actions != worker_entry.actions {
                return Err(SolverError::InconsistentActions {
                    key: key.clone(),
                    expected: target.actions.iter().map(Action::label).collect(),
                    found: worker_entry.actions.iter().map(Action::label).collect(),
                });
            }
            target.add_difference(worker_entry, base_entry, use_cfr_plus);
        }
        Ok(())
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
