//! Counterfactual Regret Minimization solver.
//!
//! This module implements the recursive CFR walk and the iteration driver
//! around it. Chance is resolved outside the engine: every iteration asks a
//! caller-supplied sampler for a fresh root state and walks the full tree
//! below it, updating every player's regrets in one pass.
//!
//! The solver is generic over any state type implementing [`GameState`].

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cfr::config::{CFRConfig, CFRStats, ConfigError};
use crate::cfr::game::{Action, GameError, GameState};
use crate::cfr::profile::StrategyProfile;
use crate::cfr::storage::InfoSetTable;

/// Errors that abort a training run.
///
/// None of these are retried; the run stops at the first one.
#[derive(Debug, Error)]
pub enum SolverError {
    /// A non-terminal state offered no actions.
    #[error("non-terminal state at information set {key:?} has no legal actions")]
    EmptyActions {
        /// Information key of the offending state.
        key: String,
    },
    /// The walk went deeper than the configured cap.
    #[error("game tree deeper than max_depth {max_depth}")]
    DepthExceeded {
        /// The configured cap.
        max_depth: usize,
    },
    /// An information key was reached with a different action list.
    #[error("information set {key:?} seen with actions {found:?}, expected {expected:?}")]
    InconsistentActions {
        /// The key.
        key: String,
        /// Action labels recorded on first visit.
        expected: Vec<String>,
        /// Action labels offered now.
        found: Vec<String>,
    },
    /// A terminal payoff vector had the wrong length.
    #[error("terminal state returned {found} payoffs for {expected} players")]
    PayoffLength {
        /// Number of players.
        expected: usize,
        /// Number of payoffs returned.
        found: usize,
    },
    /// A state named an acting player that does not exist.
    #[error("player {player} acts in a {players}-player game")]
    PlayerOutOfRange {
        /// Index returned by the state.
        player: usize,
        /// Number of players.
        players: usize,
    },
    /// Training was asked to run zero iterations.
    #[error("iteration count must be positive")]
    InvalidIterations,
    /// Solver created for zero players.
    #[error("player count must be at least 1")]
    InvalidPlayerCount,
    /// A checkpoint belongs to a game with another player count.
    #[error("checkpoint is for {found} players, solver has {expected}")]
    CheckpointMismatch {
        /// Solver's player count.
        expected: usize,
        /// Checkpoint's player count.
        found: usize,
    },
    /// The game rejected a transition.
    #[error(transparent)]
    Game(#[from] GameError),
    /// The configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The worker pool could not be started.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// A checkpoint could not be read or written.
    #[error("checkpoint I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// A checkpoint could not be encoded or decoded.
    #[error("checkpoint format error: {0}")]
    Checkpoint(#[from] serde_json::Error),
}

/// A worker's private table and its root value sums.
type WorkerResult<A> = Result<(InfoSetTable<A>, Vec<f64>), SolverError>;

/// One traversal's view of the table and the update rules.
struct Walker<'a, A> {
    table: &'a mut InfoSetTable<A>,
    num_players: usize,
    max_depth: usize,
    use_cfr_plus: bool,
    strategy_weight: f64,
}

impl<'a, A: Action> Walker<'a, A> {
    fn new(table: &'a mut InfoSetTable<A>, config: &CFRConfig, num_players: usize, iteration: u64) -> Self {
        let strategy_weight = if config.use_linear_cfr {
            iteration as f64
        } else {
            1.0
        };

        Self {
            table,
            num_players,
            max_depth: config.max_depth,
            use_cfr_plus: config.use_cfr_plus,
            strategy_weight,
        }
    }

    /// Walk one sampled tree from its root with every reach probability at 1.
    fn walk_root<S>(&mut self, root: &S) -> Result<Vec<f64>, SolverError>
    where
        S: GameState<Action = A>,
    {
        let reach = vec![1.0; self.num_players];
        self.walk(root, &reach, 0)
    }

    /// Counterfactual value of `state` for every player.
    ///
    /// Updates regret and strategy sums of the acting player's information
    /// set on the way back up.
    fn walk<S>(&mut self, state: &S, reach: &[f64], depth: usize) -> Result<Vec<f64>, SolverError>
    where
        S: GameState<Action = A>,
    {
        if let Some(values) = state.terminal_values() {
            if values.len() != self.num_players {
                return Err(SolverError::PayoffLength {
                    expected: self.num_players,
                    found: values.len(),
                });
            }
            return Ok(values);
        }

        if depth >= self.max_depth {
            return Err(SolverError::DepthExceeded {
                max_depth: self.max_depth,
            });
        }

        let player = state.current_player();
        if player >= self.num_players {
            return Err(SolverError::PlayerOutOfRange {
                player,
                players: self.num_players,
            });
        }

        let key = state.info_key();
        let actions = state.legal_actions();
        if actions.is_empty() {
            return Err(SolverError::EmptyActions { key });
        }

        let strategy = {
            let entry = self.table.get_or_insert_with(&key, || actions.clone());
            if entry.actions() != actions.as_slice() {
                return Err(SolverError::InconsistentActions {
                    expected: entry.actions().iter().map(Action::label).collect(),
                    found: actions.iter().map(Action::label).collect(),
                    key,
                });
            }
            entry.current_strategy()
        };

        // Value of each action for the acting player, and the node value for everyone
        let mut action_values = Vec::with_capacity(actions.len());
        let mut node_value = vec![0.0; self.num_players];

        for (action, &prob) in actions.iter().zip(&strategy) {
            let child = state.add_action(action)?;

            let mut child_reach = reach.to_vec();
            child_reach[player] *= prob;

            let child_value = self.walk(&child, &child_reach, depth + 1)?;
            for (node, &value) in node_value.iter_mut().zip(&child_value) {
                *node += prob * value;
            }
            action_values.push(child_value[player]);
        }

        let opponent_reach: f64 = reach
            .iter()
            .enumerate()
            .filter(|&(p, _)| p != player)
            .map(|(_, &r)| r)
            .product();

        let regrets: Vec<f64> = action_values
            .iter()
            .map(|&v| opponent_reach * (v - node_value[player]))
            .collect();

        let entry = self.table.get_or_insert_with(&key, || actions);
        entry.add_regrets(&regrets, self.use_cfr_plus);
        entry.add_strategy(&strategy, reach[player] * self.strategy_weight);

        Ok(node_value)
    }
}

/// The main CFR solver.
///
/// Owns the information-set table and drives training over states produced
/// by a sampler.
///
/// # Example
/// ```ignore
/// use cfr_engine::cfr::{CFRConfig, CFRSolver};
///
/// let mut dealer = MyDealer::new(42);
/// let mut solver = CFRSolver::new(2, CFRConfig::default())?;
///
/// solver.train(10_000, || dealer.deal())?;
///
/// let values = solver.expected_values();
/// let profile = solver.profile();
/// ```
pub struct CFRSolver<S: GameState> {
    /// Configuration for the solver.
    config: CFRConfig,

    /// Number of players in the game.
    num_players: usize,

    /// Regret and strategy sums per information set.
    table: InfoSetTable<S::Action>,

    /// Iterations completed.
    iteration: u64,

    /// Sum of root values per player across all iterations.
    value_sums: Vec<f64>,

    /// Statistics tracking.
    stats: CFRStats,
}

impl<S: GameState> CFRSolver<S> {
    /// Create a new solver for a game with `num_players` players.
    ///
    /// # Errors
    /// [`SolverError::InvalidPlayerCount`] for zero players, or
    /// [`SolverError::Config`] if `config` does not validate.
    pub fn new(num_players: usize, config: CFRConfig) -> Result<Self, SolverError> {
        if num_players == 0 {
            return Err(SolverError::InvalidPlayerCount);
        }
        config.validate()?;

        Ok(Self {
            config,
            num_players,
            table: InfoSetTable::new(),
            iteration: 0,
            value_sums: vec![0.0; num_players],
            stats: CFRStats::new(),
        })
    }

    /// Run a single iteration on `root` and return its root values.
    pub fn run_iteration(&mut self, root: &S) -> Result<Vec<f64>, SolverError> {
        let iteration = self.iteration + 1;
        let values = Walker::new(&mut self.table, &self.config, self.num_players, iteration)
            .walk_root(root)?;

        self.iteration = iteration;
        for (sum, &v) in self.value_sums.iter_mut().zip(&values) {
            *sum += v;
        }

        Ok(values)
    }

    /// Train the solver for a specified number of iterations.
    ///
    /// `sample` is called exactly once per iteration for a fresh root.
    ///
    /// # Returns
    /// Statistics from the training run.
    pub fn train<F>(&mut self, iterations: u64, sample: F) -> Result<&CFRStats, SolverError>
    where
        F: FnMut() -> S,
    {
        self.train_with_callback(iterations, sample, 0, |_| {})
    }

    /// Train with a callback for progress tracking.
    ///
    /// # Arguments
    /// * `iterations` - Number of iterations to run
    /// * `sample` - Produces a freshly sampled root state per iteration
    /// * `callback_interval` - How often to call the callback (0 never calls it)
    /// * `callback` - Function called every `callback_interval` iterations
    ///
    /// With more than one thread, iterations run in batches and the callback
    /// fires after the batch that crosses each interval.
    pub fn train_with_callback<F, C>(
        &mut self,
        iterations: u64,
        mut sample: F,
        callback_interval: u64,
        mut callback: C,
    ) -> Result<&CFRStats, SolverError>
    where
        F: FnMut() -> S,
        C: FnMut(&CFRStats),
    {
        if iterations == 0 {
            return Err(SolverError::InvalidIterations);
        }

        let threads = self.config.threads();
        let start_time = Instant::now();
        let target = self.iteration + iterations;

        log::info!(
            "training {} iterations for {} players on {} thread(s)",
            iterations,
            self.num_players,
            threads
        );

        let pool = if threads > 1 {
            Some(rayon::ThreadPoolBuilder::new().num_threads(threads).build()?)
        } else {
            None
        };

        while self.iteration < target {
            let before = self.iteration;

            match &pool {
                Some(pool) => {
                    let batch = (target - self.iteration).min(self.config.batch_size as u64);
                    let roots: Vec<S> = (0..batch).map(|_| sample()).collect();
                    pool.install(|| self.run_batch(&roots, threads))?;
                }
                None => {
                    let root = sample();
                    self.run_iteration(&root)?;
                }
            }

            self.refresh_stats(start_time);

            if crossed(before, self.iteration, self.config.progress_interval) {
                log::info!(
                    "iteration {}: {} info sets, values {:?}, {:.0} it/s",
                    self.iteration,
                    self.stats.info_sets,
                    self.stats.expected_values,
                    self.stats.iterations_per_second
                );
            }
            if crossed(before, self.iteration, callback_interval) {
                callback(&self.stats);
            }
        }

        log::info!(
            "finished {} iterations in {:.2}s ({} info sets)",
            self.iteration,
            self.stats.elapsed_seconds,
            self.stats.info_sets
        );

        Ok(&self.stats)
    }

    /// Walk a batch of roots on the current rayon pool.
    ///
    /// Each worker walks its contiguous chunk of roots on a private clone of
    /// the table. Deltas are merged back in chunk order so a fixed root
    /// sequence always yields the same table. On error the solver is left
    /// exactly as it was before the batch.
    fn run_batch(&mut self, roots: &[S], threads: usize) -> Result<(), SolverError> {
        let chunk_size = roots.len().div_ceil(threads).max(1);
        let base = &self.table;
        let config = &self.config;
        let num_players = self.num_players;
        let first_iteration = self.iteration + 1;

        let results: Vec<(InfoSetTable<S::Action>, Vec<f64>)> = roots
            .par_chunks(chunk_size)
            .enumerate()
            .map(|(chunk, chunk_roots)| -> WorkerResult<S::Action> {
                let mut table = base.clone();
                let mut value_sums = vec![0.0; num_players];
                let offset = first_iteration + (chunk * chunk_size) as u64;

                for (i, root) in chunk_roots.iter().enumerate() {
                    let values = Walker::new(&mut table, config, num_players, offset + i as u64)
                        .walk_root(root)?;
                    for (sum, &v) in value_sums.iter_mut().zip(&values) {
                        *sum += v;
                    }
                }
                Ok((table, value_sums))
            })
            .collect::<Result<_, _>>()?;

        let mut merged = self.table.clone();
        let mut merged_values = self.value_sums.clone();
        for (worker, value_sums) in &results {
            merged.merge_delta(&self.table, worker, self.config.use_cfr_plus)?;
            for (sum, v) in merged_values.iter_mut().zip(value_sums) {
                *sum += v;
            }
        }

        self.table = merged;
        self.value_sums = merged_values;
        self.iteration += roots.len() as u64;
        Ok(())
    }

    fn refresh_stats(&mut self, start_time: Instant) {
        self.stats.iterations = self.iteration;
        self.stats.info_sets = self.table.len();
        self.stats.elapsed_seconds = start_time.elapsed().as_secs_f64();
        self.stats.expected_values = self.expected_values();
        self.stats.update_rate();
    }

    /// Mean root value per player over every iteration run so far.
    ///
    /// All zeros before the first iteration.
    pub fn expected_values(&self) -> Vec<f64> {
        if self.iteration == 0 {
            return vec![0.0; self.num_players];
        }
        self.value_sums
            .iter()
            .map(|&sum| sum / self.iteration as f64)
            .collect()
    }

    /// Build the average-strategy profile from the current table.
    pub fn profile(&self) -> StrategyProfile {
        StrategyProfile::from_table(&self.table)
    }

    /// Get the current (regret-matched) strategy for an information set.
    pub fn current_strategy(&self, info_key: &str) -> Option<Vec<f64>> {
        self.table.get(info_key).map(|e| e.current_strategy())
    }

    /// Get the average strategy for an information set.
    pub fn average_strategy(&self, info_key: &str) -> Option<Vec<f64>> {
        self.table.get(info_key).map(|e| e.average_strategy())
    }

    /// Get the current iteration count.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Number of players in the game.
    pub fn num_players(&self) -> usize {
        self.num_players
    }

    /// Get the number of information sets discovered.
    pub fn num_info_sets(&self) -> usize {
        self.table.len()
    }

    /// Get current statistics.
    pub fn stats(&self) -> &CFRStats {
        &self.stats
    }

    /// Get reference to the information-set table.
    pub fn table(&self) -> &InfoSetTable<S::Action> {
        &self.table
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &CFRConfig {
        &self.config
    }

    /// Export solver state for checkpointing.
    pub fn export_state(&self) -> SolverState<S::Action> {
        SolverState {
            iteration: self.iteration,
            num_players: self.num_players,
            table: self.table.clone(),
            value_sums: self.value_sums.clone(),
            stats: self.stats.clone(),
        }
    }

    /// Import solver state from checkpoint.
    pub fn import_state(&mut self, state: SolverState<S::Action>) -> Result<(), SolverError> {
        if state.num_players != self.num_players || state.value_sums.len() != self.num_players {
            return Err(SolverError::CheckpointMismatch {
                expected: self.num_players,
                found: state.num_players,
            });
        }

        self.iteration = state.iteration;
        self.table = state.table;
        self.value_sums = state.value_sums;
        self.stats = state.stats;
        Ok(())
    }

    /// Reset the solver to initial state.
    pub fn reset(&mut self) {
        self.table.clear();
        self.iteration = 0;
        self.value_sums = vec![0.0; self.num_players];
        self.stats = CFRStats::new();
    }
}

impl<S> CFRSolver<S>
where
    S: GameState,
    S::Action: Serialize + DeserializeOwned,
{
    /// Write a JSON checkpoint of the full training state.
    pub fn save_checkpoint(&self, path: impl AsRef<Path>) -> Result<(), SolverError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, &self.export_state())?;
        writer.flush()?;
        log::debug!("checkpoint at iteration {} written to {}", self.iteration, path.display());
        Ok(())
    }

    /// Resume from a checkpoint written by [`save_checkpoint`](Self::save_checkpoint).
    pub fn load_checkpoint(&mut self, path: impl AsRef<Path>) -> Result<(), SolverError> {
        let path = path.as_ref();
        let state: SolverState<S::Action> = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        self.import_state(state)?;
        log::debug!("resumed from {} at iteration {}", path.display(), self.iteration);
        Ok(())
    }
}

/// Serializable solver state for checkpointing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverState<A> {
    /// Current iteration.
    pub iteration: u64,
    /// Number of players.
    pub num_players: usize,
    /// Information-set table.
    pub table: InfoSetTable<A>,
    /// Sum of root values per player.
    pub value_sums: Vec<f64>,
    /// Statistics.
    pub stats: CFRStats,
}

/// Solve a game with vanilla CFR.
///
/// Runs `iteration_count` iterations, each on a fresh root from
/// `sample_initial_state`, and returns the mean root value per player
/// together with the average-strategy profile.
///
/// # Example
/// ```
/// use cfr_engine::cfr::minimize;
/// use cfr_engine::games::kuhn::KuhnDealer;
///
/// let mut dealer = KuhnDealer::new(2, 7);
/// let (values, profile) = minimize(1_000, 2, || dealer.deal()).unwrap();
///
/// assert_eq!(values.len(), 2);
/// assert_eq!(profile.lookup("K").unwrap().len(), 2);
/// ```
pub fn minimize<S, F>(
    iteration_count: u64,
    player_count: usize,
    sample_initial_state: F,
) -> Result<(Vec<f64>, StrategyProfile), SolverError>
where
    S: GameState,
    F: FnMut() -> S,
{
    minimize_with_config(iteration_count, player_count, sample_initial_state, CFRConfig::default())
}

/// [`minimize`] with an explicit configuration.
pub fn minimize_with_config<S, F>(
    iteration_count: u64,
    player_count: usize,
    sample_initial_state: F,
    config: CFRConfig,
) -> Result<(Vec<f64>, StrategyProfile), SolverError>
where
    S: GameState,
    F: FnMut() -> S,
{
    let mut solver = CFRSolver::new(player_count, config)?;
    solver.train(iteration_count, sample_initial_state)?;
    Ok((solver.expected_values(), solver.profile()))
}

/// Whether going from `before` to `after` iterations passed a multiple of `interval`.
fn crossed(before: u64, after: u64, interval: u64) -> bool {
    interval > 0 && after / interval > before / interval
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    enum Side {
        Left,
        Right,
        Only,
    }

    crate::impl_action!(Side);

    /// Small hand-built games exercising the walk's edge cases.
    #[derive(Debug, Clone, PartialEq)]
    enum Toy {
        /// Player 0 picks Left (+1 for them) or Right (-1), zero-sum.
        Pick { done: Option<Side> },
        /// One-player game: Left pays 1, Right pays 0.
        Solo { done: Option<Side> },
        /// A forced move, then a terminal.
        Forced { done: bool },
        /// Non-terminal with nothing to do.
        Stuck,
        /// Never ends.
        Endless(u32),
        /// Rejects every action.
        Broken,
        /// Pays one player in a two-player game.
        ShortPayoff { done: bool },
        /// Names player 5 in a two-player game.
        Stranger,
        /// Same key as `Pick`'s root but different actions.
        Impostor,
        /// Left pays +1 or -1 depending on the deal, Right pays nothing.
        Rigged { bad: bool, done: Option<Side> },
    }

    impl GameState for Toy {
        type Action = Side;

        fn current_player(&self) -> usize {
            match self {
                Toy::Stranger => 5,
                _ => 0,
            }
        }

        fn legal_actions(&self) -> Vec<Side> {
            match self {
                Toy::Stuck => vec![],
                Toy::Forced { .. } | Toy::ShortPayoff { .. } | Toy::Endless(_) | Toy::Broken => {
                    vec![Side::Only]
                }
                Toy::Impostor => vec![Side::Only],
                _ => vec![Side::Left, Side::Right],
            }
        }

        fn info_key(&self) -> String {
            match self {
                Toy::Pick { .. } | Toy::Impostor => "pick".to_string(),
                Toy::Endless(n) => format!("endless{}", n),
                Toy::Rigged { .. } => "rigged".to_string(),
                other => format!("{:?}", other),
            }
        }

        fn terminal_values(&self) -> Option<Vec<f64>> {
            match self {
                Toy::Pick { done: Some(Side::Left) } => Some(vec![1.0, -1.0]),
                Toy::Pick { done: Some(_) } => Some(vec![-1.0, 1.0]),
                Toy::Solo { done: Some(Side::Left) } => Some(vec![1.0]),
                Toy::Solo { done: Some(_) } => Some(vec![0.0]),
                Toy::Forced { done: true } => Some(vec![0.5, -0.5]),
                Toy::ShortPayoff { done: true } => Some(vec![1.0]),
                Toy::Rigged { bad: true, done: Some(Side::Left) } => Some(vec![-1.0, 1.0]),
                Toy::Rigged { done: Some(Side::Left), .. } => Some(vec![1.0, -1.0]),
                Toy::Rigged { done: Some(_), .. } => Some(vec![0.0, 0.0]),
                _ => None,
            }
        }

        fn add_action(&self, action: &Side) -> Result<Self, GameError> {
            if !self.legal_actions().contains(action) || matches!(self, Toy::Broken) {
                return Err(GameError::InvalidAction {
                    action: action.label(),
                    key: self.info_key(),
                });
            }
            Ok(match self {
                Toy::Pick { .. } => Toy::Pick { done: Some(*action) },
                Toy::Solo { .. } => Toy::Solo { done: Some(*action) },
                Toy::Forced { .. } => Toy::Forced { done: true },
                Toy::ShortPayoff { .. } => Toy::ShortPayoff { done: true },
                Toy::Endless(n) => Toy::Endless(n + 1),
                Toy::Rigged { bad, .. } => Toy::Rigged { bad: *bad, done: Some(*action) },
                Toy::Impostor => Toy::Forced { done: true },
                other => other.clone(),
            })
        }
    }

    fn assert_distribution(probs: &[f64]) {
        assert!(probs.iter().all(|&p| p >= 0.0), "negative probability in {:?}", probs);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9, "{:?} does not sum to 1", probs);
    }

    #[test]
    fn test_first_iteration_updates_match_hand_computation() {
        let mut solver = CFRSolver::new(2, CFRConfig::default()).unwrap();
        let values = solver.run_iteration(&Toy::Pick { done: None }).unwrap();

        // Uniform strategy: node value 0, Left regrets +1, Right regrets -1
        assert_eq!(values, vec![0.0, 0.0]);
        let entry = solver.table().get("pick").unwrap();
        assert_eq!(entry.regret_sum(), &[1.0, -1.0]);
        assert_eq!(entry.strategy_sum(), &[0.5, 0.5]);
        assert_eq!(solver.current_strategy("pick").unwrap(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_dominant_action_wins_average_strategy() {
        let (values, profile) = minimize(1_000, 2, || Toy::Pick { done: None }).unwrap();

        let pick = profile.lookup("pick").unwrap();
        assert_distribution(pick);
        assert!(pick[0] > 0.99);
        assert!(values[0] > 0.99);
        assert!((values[0] + values[1]).abs() < 1e-12);
    }

    #[test]
    fn test_single_player_game() {
        let (values, profile) = minimize(500, 1, || Toy::Solo { done: None }).unwrap();

        assert_eq!(values.len(), 1);
        assert!(profile.lookup("Solo { done: None }").unwrap()[0] > 0.99);
    }

    #[test]
    fn test_forced_move_has_zero_regret() {
        let mut solver = CFRSolver::new(2, CFRConfig::default()).unwrap();
        solver.train(10, || Toy::Forced { done: false }).unwrap();

        let entry = solver.table().get("Forced { done: false }").unwrap();
        assert_eq!(entry.regret_sum(), &[0.0]);
        assert_eq!(entry.average_strategy(), vec![1.0]);
        assert_eq!(solver.expected_values(), vec![0.5, -0.5]);
    }

    #[test]
    fn test_empty_actions_is_fatal() {
        let err = minimize(5, 2, || Toy::Stuck).unwrap_err();
        assert!(matches!(err, SolverError::EmptyActions { .. }));
    }

    #[test]
    fn test_depth_cap_stops_endless_games() {
        let config = CFRConfig::default().with_max_depth(64);
        let err = minimize_with_config(1, 2, || Toy::Endless(0), config).unwrap_err();
        assert!(matches!(err, SolverError::DepthExceeded { max_depth: 64 }));
    }

    #[test]
    fn test_default_depth_cap_reports_instead_of_overflowing() {
        let err = minimize(1, 2, || Toy::Endless(0)).unwrap_err();
        assert!(matches!(
            err,
            SolverError::DepthExceeded { max_depth } if max_depth == CFRConfig::default().max_depth
        ));
    }

    #[test]
    fn test_default_depth_cap_on_parallel_workers() {
        let config = CFRConfig::default().with_threads(2).with_batch_size(2);
        let err = minimize_with_config(2, 2, || Toy::Endless(0), config).unwrap_err();
        assert!(matches!(err, SolverError::DepthExceeded { .. }));
    }

    #[test]
    fn test_invalid_transition_propagates() {
        let err = minimize(1, 2, || Toy::Broken).unwrap_err();
        assert!(matches!(err, SolverError::Game(GameError::InvalidAction { .. })));
    }

    #[test]
    fn test_payoff_length_is_checked() {
        let err = minimize(1, 2, || Toy::ShortPayoff { done: false }).unwrap_err();
        assert!(matches!(err, SolverError::PayoffLength { expected: 2, found: 1 }));
    }

    #[test]
    fn test_unknown_player_is_rejected() {
        let err = minimize(1, 2, || Toy::Stranger).unwrap_err();
        assert!(matches!(err, SolverError::PlayerOutOfRange { player: 5, players: 2 }));
    }

    #[test]
    fn test_inconsistent_actions_for_a_key() {
        let mut flip = false;
        let err = minimize(2, 2, || {
            flip = !flip;
            if flip {
                Toy::Pick { done: None }
            } else {
                Toy::Impostor
            }
        })
        .unwrap_err();

        match err {
            SolverError::InconsistentActions { key, expected, found } => {
                assert_eq!(key, "pick");
                assert_eq!(expected, vec!["Left", "Right"]);
                assert_eq!(found, vec!["Only"]);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_inconsistent_actions_across_parallel_workers() {
        let config = CFRConfig::default().with_threads(2).with_batch_size(2);
        let mut solver = CFRSolver::new(2, config).unwrap();
        let mut flip = false;
        let err = solver
            .train(2, || {
                flip = !flip;
                if flip {
                    Toy::Pick { done: None }
                } else {
                    Toy::Impostor
                }
            })
            .unwrap_err();

        assert!(matches!(err, SolverError::InconsistentActions { ref key, .. } if key == "pick"));
        assert_eq!(solver.iteration(), 0);
        assert!(solver.table().is_empty());
    }

    #[test]
    fn test_failed_batch_leaves_solver_untouched() {
        let config = CFRConfig::default()
            .with_threads(2)
            .with_batch_size(2)
            .with_max_depth(8);
        let mut solver = CFRSolver::new(2, config).unwrap();
        let mut flip = false;
        let err = solver
            .train(2, || {
                flip = !flip;
                if flip {
                    Toy::Pick { done: None }
                } else {
                    Toy::Endless(0)
                }
            })
            .unwrap_err();

        assert!(matches!(err, SolverError::DepthExceeded { max_depth: 8 }));
        assert_eq!(solver.iteration(), 0);
        assert_eq!(solver.value_sums, vec![0.0, 0.0]);
        assert!(solver.table().is_empty());
        assert_eq!(solver.expected_values(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_cfr_plus_regrets_stay_non_negative_in_parallel() {
        let config = CFRConfig::fast().with_threads(4).with_batch_size(16);
        let mut solver = CFRSolver::new(2, config).unwrap();
        let mut round = 0u32;
        solver
            .train(64, || {
                round += 1;
                Toy::Rigged { bad: round % 3 == 0, done: None }
            })
            .unwrap();

        for (key, entry) in solver.table().iter() {
            assert!(
                entry.regret_sum().iter().all(|&r| r >= 0.0),
                "negative regret at {}: {:?}",
                key,
                entry.regret_sum()
            );
        }
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert!(matches!(
            minimize(0, 2, || Toy::Stuck),
            Err(SolverError::InvalidIterations)
        ));
        assert!(matches!(
            CFRSolver::<Toy>::new(0, CFRConfig::default()),
            Err(SolverError::InvalidPlayerCount)
        ));
        assert!(matches!(
            CFRSolver::<Toy>::new(2, CFRConfig::default().with_threads(0)),
            Err(SolverError::Config(ConfigError::InvalidThreads))
        ));
    }

    #[test]
    fn test_callback_fires_on_interval() {
        let mut solver = CFRSolver::new(2, CFRConfig::default()).unwrap();
        let mut seen = Vec::new();
        solver
            .train_with_callback(10, || Toy::Pick { done: None }, 4, |s| seen.push(s.iterations))
            .unwrap();

        assert_eq!(seen, vec![4, 8]);
        assert_eq!(solver.stats().iterations, 10);
        assert_eq!(solver.stats().info_sets, 1);
    }

    #[test]
    fn test_parallel_batches_are_deterministic() {
        let config = CFRConfig::default().with_threads(3).with_batch_size(7);
        let run = || {
            let mut solver = CFRSolver::new(2, config.clone()).unwrap();
            solver.train(50, || Toy::Pick { done: None }).unwrap();
            (solver.iteration(), solver.expected_values(), solver.profile())
        };

        let (iterations, values, profile) = run();
        assert_eq!(iterations, 50);
        assert_eq!(run(), (iterations, values.clone(), profile.clone()));
        assert!(profile.lookup("pick").unwrap()[0] > 0.9);
        assert!(values[0] > 0.5);
    }

    #[test]
    fn test_resume_from_state_matches_uninterrupted_run() {
        let mut straight = CFRSolver::new(2, CFRConfig::default()).unwrap();
        straight.train(20, || Toy::Pick { done: None }).unwrap();

        let mut first = CFRSolver::new(2, CFRConfig::default()).unwrap();
        first.train(10, || Toy::Pick { done: None }).unwrap();
        let mut resumed = CFRSolver::new(2, CFRConfig::default()).unwrap();
        resumed.import_state(first.export_state()).unwrap();
        resumed.train(10, || Toy::Pick { done: None }).unwrap();

        assert_eq!(resumed.iteration(), 20);
        assert_eq!(resumed.table(), straight.table());
        assert_eq!(resumed.expected_values(), straight.expected_values());
    }

    #[test]
    fn test_checkpoint_file_round_trip() {
        let path = std::env::temp_dir().join(format!("cfr_engine_checkpoint_{}.json", std::process::id()));
        let mut solver = CFRSolver::new(2, CFRConfig::default()).unwrap();
        solver.train(5, || Toy::Pick { done: None }).unwrap();
        solver.save_checkpoint(&path).unwrap();

        let mut restored = CFRSolver::<Toy>::new(2, CFRConfig::default()).unwrap();
        restored.load_checkpoint(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(restored.export_state(), solver.export_state());
    }

    #[test]
    fn test_checkpoint_player_mismatch() {
        let solver = CFRSolver::<Toy>::new(2, CFRConfig::default()).unwrap();
        let mut other = CFRSolver::<Toy>::new(3, CFRConfig::default()).unwrap();
        assert!(matches!(
            other.import_state(solver.export_state()),
            Err(SolverError::CheckpointMismatch { expected: 3, found: 2 })
        ));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut solver = CFRSolver::new(2, CFRConfig::default()).unwrap();
        solver.train(3, || Toy::Pick { done: None }).unwrap();
        solver.reset();

        assert_eq!(solver.iteration(), 0);
        assert_eq!(solver.num_info_sets(), 0);
        assert_eq!(solver.expected_values(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_crossed() {
        assert!(crossed(9, 10, 10));
        assert!(crossed(5, 25, 10));
        assert!(!crossed(10, 19, 10));
        assert!(!crossed(0, 100, 0));
    }
}
