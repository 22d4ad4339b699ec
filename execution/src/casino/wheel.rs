//! Wheel of chance: 37 pockets, zero is green, odd pockets red, even black.
//!
//! Payouts are gross (stake included):
//! - Red / Black: 2x
//! - Green: 35x
//! - Exact number: 36x

use super::GameRng;
use arcade_types::{
    casino::{
        Color, WheelBet, WHEEL_COLOR_MULTIPLIER, WHEEL_GREEN_MULTIPLIER, WHEEL_NUMBER_MULTIPLIER,
        WHEEL_POCKETS,
    },
    Amount,
};

/// Result of one spin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Spin {
    pub number: u8,
    pub color: Color,
    pub payout: Amount,
}

/// Check if a bet wins for a given pocket.
pub fn bet_wins(bet: WheelBet, number: u8) -> bool {
    match bet {
        WheelBet::Number(chosen) => chosen == number,
        WheelBet::Color(color) => Color::of(number) == color,
    }
}

/// Gross payout multiplier of a winning bet.
pub fn payout_multiplier(bet: WheelBet) -> u64 {
    match bet {
        WheelBet::Number(_) => WHEEL_NUMBER_MULTIPLIER,
        WheelBet::Color(Color::Green) => WHEEL_GREEN_MULTIPLIER,
        WheelBet::Color(Color::Red | Color::Black) => WHEEL_COLOR_MULTIPLIER,
    }
}

/// Settle a bet against a known pocket.
pub fn settle(bet: WheelBet, stake: Amount, number: u8) -> Spin {
    let payout = if bet_wins(bet, number) {
        stake.saturating_mul(payout_multiplier(bet))
    } else {
        0
    };
    Spin {
        number,
        color: Color::of(number),
        payout,
    }
}

pub fn spin(bet: WheelBet, stake: Amount, rng: &mut GameRng) -> Spin {
    let number = rng.next_bounded(WHEEL_POCKETS as u32) as u8;
    settle(bet, stake, number)
}
