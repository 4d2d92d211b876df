//! Kuhn Poker implementation for CFR validation.
//!
//! Kuhn Poker is a simplified poker game used to validate CFR implementations
//! because the two-player game has a known, mathematically proven Nash
//! equilibrium. This module implements the n-player generalization; with two
//! players it is exactly the classic game.
//!
//! ## Game Rules
//!
//! - n players, a deck of n+1 ranked cards, one card each
//! - Every player antes 1 chip
//! - Players act in turn order: Check or Bet (1 chip)
//! - Once someone has bet, every other player answers once: Bet (call) or
//!   Check (fold)
//! - Highest card among the players still in wins the pot
//!
//! ## Game Tree (two players)
//!
//! ```text
//! P0 (first to act)
//! ├── Check
//! │   └── P1
//! │       ├── Check → Showdown (pot = 2)
//! │       └── Bet
//! │           └── P0
//! │               ├── Check (fold) → P1 wins (pot = 3)
//! │               └── Bet (call) → Showdown (pot = 4)
//! └── Bet
//!     └── P1
//!         ├── Check (fold) → P0 wins (pot = 3)
//!         └── Bet (call) → Showdown (pot = 4)
//! ```
//!
//! ## Known Nash Equilibrium (two players)
//!
//! - **P0 with Jack**: Bet with probability α ∈ [0, 1/3]
//! - **P0 with Queen**: Always Check; after check-bet, call with α + 1/3
//! - **P0 with King**: Bet with probability 3α
//!
//! **Expected Value**: P0 EV = -1/18 ≈ -0.0556
//!
//! Chance lives outside the tree: [`KuhnDealer`] shuffles and deals a fresh
//! root state for every CFR iteration.

use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::cfr::game::{Action, GameError, GameState};

/// Fewest players a Kuhn table can seat.
pub const MIN_PLAYERS: usize = 2;

/// Most players a Kuhn table can seat (one rank label per card).
pub const MAX_PLAYERS: usize = 12;

const RANK_LABELS: &[u8; 13] = b"23456789TJQKA";

/// Actions in Kuhn Poker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KuhnAction {
    /// Check if nobody has bet, fold if facing a bet
    Check,
    /// Bet if nobody has bet, call if facing a bet
    Bet,
}

impl Action for KuhnAction {
    fn label(&self) -> String {
        match self {
            KuhnAction::Check => "c".to_string(),
            KuhnAction::Bet => "b".to_string(),
        }
    }
}

impl fmt::Display for KuhnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KuhnAction::Check => write!(f, "Check"),
            KuhnAction::Bet => write!(f, "Bet"),
        }
    }
}

/// Label of `card` in an n-player deck.
///
/// The deck uses the top n+1 ranks, so two players play with J, Q, K.
pub fn rank_label(card: u8, num_players: usize) -> char {
    let lowest = RANK_LABELS.len() - (num_players + 1);
    RANK_LABELS[lowest + card as usize] as char
}

/// Complete game state in Kuhn Poker.
///
/// `cards[p]` is player p's card, 0 being the lowest rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KuhnState {
    cards: Vec<u8>,
    history: Vec<KuhnAction>,
}

impl KuhnState {
    /// Create the root state for a deal.
    ///
    /// # Panics
    /// If the player count is outside [`MIN_PLAYERS`]..=[`MAX_PLAYERS`] or the
    /// cards are not distinct ranks of an n+1 card deck.
    pub fn new(cards: Vec<u8>) -> Self {
        let n = cards.len();
        assert!(
            (MIN_PLAYERS..=MAX_PLAYERS).contains(&n),
            "Kuhn poker needs {}..={} players, got {}",
            MIN_PLAYERS,
            MAX_PLAYERS,
            n
        );
        assert!(
            cards.iter().all(|&c| (c as usize) <= n),
            "card out of range in {:?}",
            cards
        );
        let mut sorted = cards.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), n, "duplicate cards in {:?}", cards);

        Self {
            cards,
            history: Vec::new(),
        }
    }

    /// Number of players at the table.
    pub fn num_players(&self) -> usize {
        self.cards.len()
    }

    /// Cards dealt to each player.
    pub fn cards(&self) -> &[u8] {
        &self.cards
    }

    /// Actions taken so far.
    pub fn history(&self) -> &[KuhnAction] {
        &self.history
    }

    /// Action history as a string of labels (e.g., "cb" = check then bet).
    pub fn history_string(&self) -> String {
        self.history.iter().map(Action::label).collect()
    }

    fn first_bet(&self) -> Option<usize> {
        self.history.iter().position(|&a| a == KuhnAction::Bet)
    }

    /// Payoffs once betting is over, `None` while someone still has to act.
    fn showdown(&self) -> Option<Vec<f64>> {
        let n = self.num_players();

        // Players still in, and whether each put a second chip in
        let (done, in_pot): (bool, Vec<bool>) = match self.first_bet() {
            None => (self.history.len() == n, vec![false; n]),
            Some(bet) => {
                let mut in_pot = vec![false; n];
                for (i, &action) in self.history.iter().enumerate().skip(bet) {
                    if action == KuhnAction::Bet {
                        in_pot[i % n] = true;
                    }
                }
                (self.history.len() == bet + n, in_pot)
            }
        };

        if !done {
            return None;
        }

        let contested = in_pot.iter().any(|&b| b);
        let contributions: Vec<f64> = in_pot
            .iter()
            .map(|&b| if b { 2.0 } else { 1.0 })
            .collect();
        let pot: f64 = contributions.iter().sum();

        let winner = (0..n)
            .filter(|&p| !contested || in_pot[p])
            .max_by_key(|&p| self.cards[p])?;

        Some(
            contributions
                .iter()
                .enumerate()
                .map(|(p, &paid)| if p == winner { pot - paid } else { -paid })
                .collect(),
        )
    }
}

impl fmt::Display for KuhnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.num_players();
        let cards: String = self.cards.iter().map(|&c| rank_label(c, n)).collect();
        write!(f, "Cards:{} History:{}", cards, self.history_string())
    }
}

impl GameState for KuhnState {
    type Action = KuhnAction;

    fn current_player(&self) -> usize {
        self.history.len() % self.num_players()
    }

    fn legal_actions(&self) -> Vec<KuhnAction> {
        if self.is_terminal() {
            return vec![];
        }
        vec![KuhnAction::Check, KuhnAction::Bet]
    }

    fn info_key(&self) -> String {
        let card = rank_label(self.cards[self.current_player()], self.num_players());
        format!("{}{}", card, self.history_string())
    }

    fn terminal_values(&self) -> Option<Vec<f64>> {
        self.showdown()
    }

    fn add_action(&self, action: &KuhnAction) -> Result<Self, GameError> {
        if self.is_terminal() {
            return Err(GameError::InvalidAction {
                action: action.label(),
                key: self.info_key(),
            });
        }

        let mut next = self.clone();
        next.history.push(*action);
        Ok(next)
    }
}

/// Deals fresh Kuhn root states from a seeded random generator.
#[derive(Debug, Clone)]
pub struct KuhnDealer {
    num_players: usize,
    rng: StdRng,
}

impl KuhnDealer {
    /// Create a dealer for `num_players` players.
    ///
    /// # Panics
    /// If `num_players` is outside [`MIN_PLAYERS`]..=[`MAX_PLAYERS`].
    pub fn new(num_players: usize, seed: u64) -> Self {
        assert!(
            (MIN_PLAYERS..=MAX_PLAYERS).contains(&num_players),
            "Kuhn poker needs {}..={} players, got {}",
            MIN_PLAYERS,
            MAX_PLAYERS,
            num_players
        );

        Self {
            num_players,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Number of players dealt in.
    pub fn num_players(&self) -> usize {
        self.num_players
    }

    /// Shuffle the deck and deal one card to each player.
    pub fn deal(&mut self) -> KuhnState {
        let mut deck: Vec<u8> = (0..=self.num_players as u8).collect();
        deck.shuffle(&mut self.rng);
        deck.truncate(self.num_players);
        KuhnState::new(deck)
    }
}
