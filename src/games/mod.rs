//! Game implementations for the CFR solver.
//!
//! This module contains implementations of games that can be solved with
//! the generic CFR engine. These serve as:
//!
//! 1. **Validation**: Games with known Nash equilibria (like Kuhn Poker) verify
//!    that the CFR implementation is correct.
//!
//! 2. **Examples**: Demonstrate how to implement the `GameState` trait and a
//!    chance sampler for new games.
//!
//! 3. **Benchmarks**: Provide standardized games for performance testing.
//!
//! ## Available Games
//!
//! - [`kuhn`]: N-player Kuhn Poker, the classic 3-card game for two players
//!
//! ## Adding New Games
//!
//! To add a new game:
//!
//! 1. Create a new module under `src/games/`
//! 2. Define state and action types
//! 3. Implement the `GameState` trait
//! 4. Provide a sampler that resolves chance into a fresh root state
//! 5. Add tests that verify expected behavior
//!
//! See the [`kuhn`] module for a complete example.

pub mod kuhn;
