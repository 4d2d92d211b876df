//! Game-state contract for the CFR engine.
//!
//! Any game can be solved by implementing the [`GameState`] trait for its
//! node type. The engine only ever calls the five members of that trait; it
//! never looks at cards, bets or any other concrete payload.

use std::fmt::Debug;

use thiserror::Error;

/// Trait for actions in a game.
///
/// Actions represent the choices a player can make at a decision point.
/// They must be cloneable and comparable so the engine can check that an
/// information set keeps seeing the same action universe.
pub trait Action: Clone + Debug + PartialEq + Send + Sync {
    /// Short label for the action, used in logs and profile inspection.
    fn label(&self) -> String;
}

/// Errors raised by a game definition while transitioning between states.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    /// `add_action` was called with an action outside `legal_actions`.
    #[error("action {action} is not legal at information set {key:?}")]
    InvalidAction {
        /// Label of the rejected action.
        action: String,
        /// Information key of the state that rejected it.
        key: String,
    },
}

/// A node in the game tree.
///
/// States are immutable values: [`add_action`](GameState::add_action)
/// returns a new state and leaves the receiver untouched. No parent or child
/// links are kept, the engine only holds the current path on its call stack.
///
/// # Contract
///
/// - `terminal_values` is `Some` exactly at terminal nodes, with one payoff
///   per player.
/// - At every non-terminal node `legal_actions` is non-empty.
/// - `info_key` identifies everything the acting player knows: nodes that
///   differ only in hidden information must share a key, nodes with any
///   difference in visible information must not.
/// - The tree below any sampled root is finite.
///
/// # Example
/// ```ignore
/// #[derive(Clone, Debug)]
/// struct CoinState { /* ... */ }
///
/// impl GameState for CoinState {
///     type Action = CoinAction;
///     // ... implement required methods
/// }
/// ```
pub trait GameState: Clone + Debug + Send + Sync {
    /// The type representing an action a player can take.
    type Action: Action;

    /// Index of the player who acts at this node.
    ///
    /// Only meaningful at non-terminal nodes.
    fn current_player(&self) -> usize;

    /// Actions available at this node, in a fixed order.
    fn legal_actions(&self) -> Vec<Self::Action>;

    /// Key identifying the acting player's information set.
    fn info_key(&self) -> String;

    /// Payoff for every player if this node ends the game, `None` otherwise.
    fn terminal_values(&self) -> Option<Vec<f64>>;

    /// Apply an action and return the resulting state.
    ///
    /// # Errors
    /// [`GameError::InvalidAction`] if `action` is not in `legal_actions`.
    fn add_action(&self, action: &Self::Action) -> Result<Self, GameError>;

    /// Whether this node ends the game.
    fn is_terminal(&self) -> bool {
        self.terminal_values().is_some()
    }
}

/// Macro to simplify implementing the Action trait for simple enums.
///
/// The label is the `Debug` rendering of the value.
#[macro_export]
macro_rules! impl_action {
    ($type:ty) => {
        impl $crate::cfr::game::Action for $type {
            fn label(&self) -> String {
                format!("{:?}", self)
            }
        }
    };
}
