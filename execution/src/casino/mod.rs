//! Casino game execution module.
//!
//! Every engine here is pure game logic over a [GameRng]. Staking, payouts and
//! session bookkeeping are done by the layer, so nothing in this module touches
//! the ledger:
//! - Wheel (single step)
//! - Reels (single step)
//! - Card duel against the house (interactive)
//! - Climb (staked once, presented over time)
//! - Pick (one decision)

pub mod blackjack;
pub mod climb;
pub mod pick;
pub mod reels;
pub mod sessions;
pub mod wheel;

use arcade_types::{casino::Card, Amount};
use rand::{seq::SliceRandom, Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Random source for games. Seedable so tests can replay a table.
pub struct GameRng {
    inner: ChaCha20Rng,
}

impl GameRng {
    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha20Rng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Independent generator derived from this one's stream.
    pub fn fork(&mut self) -> Self {
        Self::seeded(self.inner.next_u64())
    }

    pub fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    /// Get a random value in range [0, max).
    pub fn next_bounded(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        self.inner.gen_range(0..max)
    }

    /// Uniform integer in `[low, high]`.
    pub fn range_inclusive(&mut self, low: u64, high: u64) -> u64 {
        if low >= high {
            return low;
        }
        self.inner.gen_range(low..=high)
    }

    /// Uniform float in `[low, high]`.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if low >= high {
            return low;
        }
        self.inner.gen_range(low..=high)
    }

    /// True with the given probability in percent.
    pub fn chance_percent(&mut self, percent: u32) -> bool {
        self.next_bounded(100) < percent
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }

    /// Create a shuffled deck of 52 cards.
    pub fn create_deck(&mut self) -> Vec<Card> {
        let mut deck = Card::deck();
        self.shuffle(&mut deck);
        deck
    }

    /// Draw the top card of a shuffled deck.
    pub fn draw_card(&mut self, deck: &mut Vec<Card>) -> Option<Card> {
        deck.pop()
    }

    /// Pick one element with probability proportional to its weight.
    pub fn choose_weighted<'a, T>(
        &mut self,
        items: &'a [T],
        weight: impl Fn(&T) -> u32,
    ) -> Option<&'a T> {
        items.choose_weighted(&mut self.inner, weight).ok()
    }
}

/// Error during game execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Invalid move for current game state.
    InvalidMove,
    /// Game session has already completed.
    GameAlreadyComplete,
    /// Deck is exhausted (no more cards to draw).
    DeckExhausted,
}

/// `amount * numerator / denominator`, rounded down.
pub fn scale(amount: Amount, numerator: u64, denominator: u64) -> Amount {
    if denominator == 0 {
        return 0;
    }
    let scaled = amount as u128 * numerator as u128 / denominator as u128;
    scaled.min(Amount::MAX as u128) as Amount
}

/// Apply the payout boost to a winning payout.
///
/// Only payouts above the stake are boosted; pushes and losses pass through.
pub fn apply_boost(payout: Amount, stake: Amount, boosted: bool) -> Amount {
    use arcade_types::casino::{BOOST_DENOMINATOR, BOOST_NUMERATOR};
    if boosted && payout > stake {
        scale(payout, BOOST_NUMERATOR, BOOST_DENOMINATOR)
    } else {
        payout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_rng_deterministic() {
        let mut a = GameRng::seeded(7);
        let mut b = GameRng::seeded(7);
        for _ in 0..32 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_game_rng_bounded() {
        let mut rng = GameRng::seeded(1);
        for _ in 0..1000 {
            assert!(rng.next_bounded(37) < 37);
            let v = rng.range_inclusive(4_000, 9_999);
            assert!((4_000..=9_999).contains(&v));
        }
        assert_eq!(rng.next_bounded(0), 0);
        assert_eq!(rng.range_inclusive(5, 5), 5);
    }

    #[test]
    fn test_game_rng_deck() {
        let mut rng = GameRng::seeded(3);
        let deck = rng.create_deck();
        assert_eq!(deck.len(), 52);

        let mut ids: Vec<u8> = deck.iter().map(|c| c.id()).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..52).collect::<Vec<u8>>());
    }

    #[test]
    fn test_game_rng_fork_diverges() {
        let mut parent = GameRng::seeded(9);
        let mut first = parent.fork();
        let mut second = parent.fork();
        assert_ne!(first.next_u32(), second.next_u32());
    }

    #[test]
    fn test_apply_boost() {
        assert_eq!(apply_boost(200, 100, true), 250);
        assert_eq!(apply_boost(200, 100, false), 200);
        // Pushes and losses are untouched.
        assert_eq!(apply_boost(100, 100, true), 100);
        assert_eq!(apply_boost(0, 100, true), 0);
    }

    #[test]
    fn test_scale_rounds_down() {
        assert_eq!(scale(15, 5, 2), 37);
        assert_eq!(scale(37, 70, 100), 25);
        assert_eq!(scale(10, 1, 0), 0);
    }
}
