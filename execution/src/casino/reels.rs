//! Three independent reels over a fixed icon set.

use super::{scale, GameRng};
use arcade_types::{
    casino::{Icon, REELS_PAIR_DENOMINATOR, REELS_PAIR_NUMERATOR, REELS_TRIPLE_MULTIPLIER},
    Amount,
};

/// Gross payout: three of a kind 5x, exactly two matching 1.5x (rounded down).
pub fn payout(icons: [Icon; 3], stake: Amount) -> Amount {
    let [a, b, c] = icons;
    if a == b && b == c {
        stake.saturating_mul(REELS_TRIPLE_MULTIPLIER)
    } else if a == b || b == c || a == c {
        scale(stake, REELS_PAIR_NUMERATOR, REELS_PAIR_DENOMINATOR)
    } else {
        0
    }
}

pub fn pull(stake: Amount, rng: &mut GameRng) -> ([Icon; 3], Amount) {
    let mut draw = || Icon::ALL[rng.next_bounded(Icon::ALL.len() as u32) as usize];
    let icons = [draw(), draw(), draw()];
    (icons, payout(icons, stake))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payout_table() {
        use Icon::*;
        assert_eq!(payout([Seven, Seven, Seven], 100), 500);
        assert_eq!(payout([Bell, Cherry, Bell], 100), 150);
        assert_eq!(payout([Bell, Bell, Cherry], 15), 22);
        assert_eq!(payout([Bell, Lemon, Cherry], 100), 0);
    }

    #[test]
    fn test_pull_is_consistent() {
        let mut rng = GameRng::seeded(5);
        for _ in 0..200 {
            let (icons, paid) = pull(40, &mut rng);
            assert_eq!(paid, payout(icons, 40));
        }
    }
}
