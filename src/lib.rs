//! # CFR Engine
//!
//! A generic Counterfactual Regret Minimization (CFR) engine for computing
//! approximate Nash equilibrium strategies in finite extensive-form games
//! with imperfect information.
//!
//! ## Features
//!
//! - **Generic CFR Engine**: Works with any game state implementing the `GameState` trait
//! - **N-player**: Counterfactual values are tracked per player in a single walk
//! - **External chance sampling**: Chance is resolved once per iteration by the caller
//! - **Parallel batches**: Optional rayon workers with additive table merging
//! - **Persistence**: Strategy profiles as JSON Lines, full checkpoints as JSON
//!
//! ## Quick Start
//!
//! ```
//! use cfr_engine::cfr::minimize;
//! use cfr_engine::games::kuhn::KuhnDealer;
//!
//! let mut dealer = KuhnDealer::new(2, 42);
//! let (values, profile) = minimize(2_000, 2, || dealer.deal()).unwrap();
//!
//! assert_eq!(values.len(), 2);
//! assert!(profile.lookup("Qcb").is_ok());
//! ```
//!
//! ## Modules
//!
//! - [`cfr`]: Core CFR algorithm, information-set table and strategy profiles
//! - [`games`]: Example game implementations (Kuhn Poker)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      CFR Solver (Generic)                       │
//! │  - Iteration driver        - Recursive tree walk                │
//! │  - Information-set table   - Strategy profile persistence       │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ implements GameState trait
//!                               ▼
//!                        ┌─────────────┐
//!                        │ N-player    │
//!                        │ Kuhn Poker  │
//!                        └─────────────┘
//! ```

#![warn(missing_docs)]

/// CFR (Counterfactual Regret Minimization) solver module.
///
/// This is the core module containing the generic CFR algorithm.
pub mod cfr;

/// Game implementations module.
///
/// Contains example games like Kuhn Poker for testing and validation.
pub mod games;

// Re-export commonly used types at crate root for convenience
pub use cfr::{
    load_strategy_profile, minimize, Action, CFRConfig, CFRSolver, CFRStats, GameState,
    ProfileError, SolverError, StrategyProfile,
};
