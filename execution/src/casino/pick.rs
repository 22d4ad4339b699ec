//! Pick: the prize hides under one of N positions; one guess settles it.

use super::{GameError, GameRng};
use arcade_types::{casino::PICK_MULTIPLIER, Amount};

pub struct Pick {
    stake: Amount,
    positions: u8,
    winning: u8,
}

impl Pick {
    /// Hide the prize under a uniformly random position in `1..=positions`.
    pub fn hide(stake: Amount, positions: u8, rng: &mut GameRng) -> Self {
        let winning = rng.next_bounded(positions.max(1) as u32) as u8 + 1;
        Self::with_winning(stake, positions, winning)
    }

    pub fn with_winning(stake: Amount, positions: u8, winning: u8) -> Self {
        Self {
            stake,
            positions,
            winning,
        }
    }

    pub fn stake(&self) -> Amount {
        self.stake
    }

    pub fn positions(&self) -> u8 {
        self.positions
    }

    pub fn winning(&self) -> u8 {
        self.winning
    }

    /// Gross payout for a guess. Positions outside `1..=positions` are invalid.
    pub fn choose(&self, position: u8) -> Result<Amount, GameError> {
        if position == 0 || position > self.positions {
            return Err(GameError::InvalidMove);
        }
        if position == self.winning {
            Ok(self.stake.saturating_mul(PICK_MULTIPLIER))
        } else {
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose() {
        let pick = Pick::with_winning(25, 5, 3);
        assert_eq!(pick.choose(3), Ok(50));
        assert_eq!(pick.choose(1), Ok(0));
        assert_eq!(pick.choose(0), Err(GameError::InvalidMove));
        assert_eq!(pick.choose(6), Err(GameError::InvalidMove));
    }

    #[test]
    fn test_hide_covers_every_position() {
        let mut rng = GameRng::seeded(8);
        let mut seen = [false; 5];
        for _ in 0..500 {
            let pick = Pick::hide(10, 5, &mut rng);
            assert!((1..=5).contains(&pick.winning()));
            seen[pick.winning() as usize - 1] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
