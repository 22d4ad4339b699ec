use serde::{Deserialize, Serialize};
use std::fmt;

pub const DECK_SIZE: u8 = 52;

const RANKS: [&str; 13] = [
    "A", "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K",
];
const SUITS: [&str; 4] = ["♠", "♥", "♦", "♣"];

/// A playing card encoded as 0-51: `rank = id % 13` (0 = ace), `suit = id / 13`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Card(u8);

impl Card {
    pub fn new(id: u8) -> Option<Self> {
        (id < DECK_SIZE).then_some(Self(id))
    }

    /// Builds a card from a 0-based rank (0 = ace, 12 = king) and suit (0-3).
    pub fn from_parts(rank: u8, suit: u8) -> Option<Self> {
        if rank >= 13 || suit >= 4 {
            return None;
        }
        Some(Self(suit * 13 + rank))
    }

    pub fn id(self) -> u8 {
        self.0
    }

    /// 0-based rank (0 = ace, 12 = king).
    pub fn rank(self) -> u8 {
        self.0 % 13
    }

    pub fn suit(self) -> u8 {
        self.0 / 13
    }

    pub fn is_ace(self) -> bool {
        self.rank() == 0
    }

    /// Hard value of the card: aces count 11, faces 10.
    pub fn points(self) -> u8 {
        match self.rank() + 1 {
            1 => 11,
            r if r >= 10 => 10,
            r => r,
        }
    }

    /// Every card of a standard deck, in order.
    pub fn deck() -> Vec<Card> {
        (0..DECK_SIZE).map(Card).collect()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            RANKS[self.rank() as usize],
            SUITS[self.suit() as usize]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_parts() {
        let king_of_clubs = Card::from_parts(12, 3).unwrap();
        assert_eq!(king_of_clubs.id(), 51);
        assert_eq!(king_of_clubs.points(), 10);
        assert_eq!(king_of_clubs.to_string(), "K♣");

        let ace = Card::new(13).unwrap();
        assert!(ace.is_ace());
        assert_eq!(ace.points(), 11);
        assert_eq!(ace.to_string(), "A♥");

        assert!(Card::new(52).is_none());
        assert!(Card::from_parts(13, 0).is_none());
        assert_eq!(Card::deck().len(), 52);
    }
}
