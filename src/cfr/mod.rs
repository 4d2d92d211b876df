//! CFR (Counterfactual Regret Minimization) Solver Module.
//!
//! This module provides a generic implementation of vanilla CFR for
//! computing approximate Nash equilibrium strategies in finite
//! imperfect-information games with any number of players.
//!
//! # Overview
//!
//! CFR is an iterative algorithm that converges to Nash equilibrium by:
//! 1. Computing counterfactual regret for each action at each decision point
//! 2. Updating strategies to minimize regret over time
//! 3. Averaging strategies across iterations to converge to equilibrium
//!
//! Chance is not modelled inside the tree. The caller supplies a sampler
//! that resolves chance (a deal, a dice roll) once per iteration and returns
//! the root of the resulting deterministic tree; the engine then walks that
//! whole tree.
//!
//! # Usage
//!
//! 1. Implement the `GameState` trait for your game's node type
//! 2. Call `minimize` with an iteration count, the player count and a sampler
//! 3. Query or save the returned `StrategyProfile`
//!
//! # Example
//!
//! ```ignore
//! use cfr_engine::cfr::minimize;
//!
//! let mut dealer = MyDealer::new(42);
//! let (values, profile) = minimize(100_000, 2, || dealer.deal())?;
//!
//! println!("Player 0 expects {:.4}", values[0]);
//! println!("Strategy at K: {:?}", profile.lookup("K")?);
//! profile.save("kuhn.jsonl")?;
//! ```
//!
//! # Theory
//!
//! **Regret**: The difference between the value of an action and the value of the current strategy,
//! weighted by the probability that everyone else plays to this node.
//! ```text
//! Regret(a) += OpponentReach * (Value(a) - Value(current_strategy))
//! ```
//!
//! **Regret Matching**: Set strategy proportional to positive regrets.
//! ```text
//! Strategy(a) = max(0, Regret(a)) / sum(max(0, Regret(a')))
//! ```
//!
//! **Convergence**: The reach-weighted average of the strategies played converges to
//! an equilibrium in two-player zero-sum games.
//!
//! # References
//!
//! - Zinkevich, M., et al. "Regret Minimization in Games with Incomplete Information" (2007)
//! - Tammelin, O. "Solving Large Imperfect Information Games Using CFR+" (2014)

pub mod config;
pub mod game;
pub mod profile;
pub mod solver;
pub mod storage;

// Re-export main types for convenient access
pub use config::{CFRConfig, CFRStats, ConfigError};
pub use game::{Action, GameError, GameState};
pub use profile::{load_strategy_profile, ProfileError, StrategyProfile};
pub use solver::{minimize, minimize_with_config, CFRSolver, SolverError, SolverState};
pub use storage::{InfoSetEntry, InfoSetTable};
