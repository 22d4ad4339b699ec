//! Climb: a multiplier rises from 1.00x until it crashes.
//!
//! The crash point is drawn privately when the stake is taken, and the round
//! is settled right away: a target at or below the crash point pays
//! `stake * target`, anything else is forfeit. What follows is presentation
//! only. [Climb::advance] moves the displayed multiplier by a random step per
//! tick until it reaches the target (cash out) or the crash point, and
//! stopping the presentation early never changes the settled outcome.

use super::GameRng;
use arcade_types::{
    casino::{
        ClimbPhase, Multiplier, CLIMB_HOUSE_EDGE_BPS, CLIMB_MAX_MULTIPLIER, CLIMB_STEP_MAX,
        CLIMB_STEP_MIN,
    },
    Amount,
};

const BPS: u64 = 10_000;
/// Share of the draw range used, in basis points. Bounds the crash point.
const RANGE_BPS: u64 = 9_900;

/// Map a uniform 32-bit draw to a crash point, skewed toward low values.
///
/// `crash = (1 - edge) / (1 - u)` with `u` in `[0, 0.99]`, clamped to
/// `[1.00x, 100.00x]`.
pub fn crash_point(raw: u32, edge_bps: u32) -> Multiplier {
    let normalized = raw as u64 * RANGE_BPS / u32::MAX as u64;
    let denominator = BPS - normalized;
    let edge = BPS.saturating_sub(edge_bps as u64);
    let hundredths = edge * 100 / denominator;
    let clamped = hundredths.clamp(
        Multiplier::ONE.hundredths() as u64,
        CLIMB_MAX_MULTIPLIER as u64,
    );
    Multiplier::from_hundredths(clamped as u32)
}

pub fn draw_crash_point(rng: &mut GameRng) -> Multiplier {
    crash_point(rng.next_u32(), CLIMB_HOUSE_EDGE_BPS)
}

/// A settled round and its presentation state.
pub struct Climb {
    stake: Amount,
    target: Multiplier,
    crash: Multiplier,
    shown: Multiplier,
    phase: ClimbPhase,
    rng: GameRng,
}

impl Climb {
    pub fn launch(stake: Amount, target: Multiplier, mut rng: GameRng) -> Self {
        let crash = draw_crash_point(&mut rng);
        Self::with_crash_point(stake, target, crash, rng)
    }

    pub fn with_crash_point(
        stake: Amount,
        target: Multiplier,
        crash: Multiplier,
        rng: GameRng,
    ) -> Self {
        Self {
            stake,
            target,
            crash,
            shown: Multiplier::ONE,
            phase: ClimbPhase::Climbing,
            rng,
        }
    }

    pub fn stake(&self) -> Amount {
        self.stake
    }

    pub fn won(&self) -> bool {
        self.target <= self.crash
    }

    /// Gross payout, fixed at launch.
    pub fn payout(&self) -> Amount {
        if self.won() {
            self.target.apply(self.stake)
        } else {
            0
        }
    }

    pub fn crash(&self) -> Multiplier {
        self.crash
    }

    pub fn phase(&self) -> ClimbPhase {
        self.phase
    }

    /// Move the displayed multiplier one tick forward.
    pub fn advance(&mut self) -> (Multiplier, ClimbPhase) {
        if self.phase != ClimbPhase::Climbing {
            return (self.shown, self.phase);
        }
        let step = self
            .rng
            .range_inclusive(CLIMB_STEP_MIN as u64, CLIMB_STEP_MAX as u64) as u32;
        let next = Multiplier::from_hundredths(self.shown.hundredths().saturating_add(step));

        // The round ends at whichever of target and crash point comes first.
        let stop = if self.won() { self.target } else { self.crash };
        if next >= stop {
            self.shown = stop;
            self.phase = if self.won() {
                ClimbPhase::CashedOut
            } else {
                ClimbPhase::Crashed
            };
        } else {
            self.shown = next;
        }
        (self.shown, self.phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x(hundredths: u32) -> Multiplier {
        Multiplier::from_hundredths(hundredths)
    }

    #[test]
    fn test_crash_point_bounds() {
        assert_eq!(crash_point(0, CLIMB_HOUSE_EDGE_BPS), Multiplier::ONE);
        assert_eq!(crash_point(u32::MAX, CLIMB_HOUSE_EDGE_BPS), x(9_900));
        assert_eq!(crash_point(u32::MAX, 0), x(10_000));

        let mut rng = GameRng::seeded(4);
        let mut low = 0;
        for _ in 0..1_000 {
            let crash = draw_crash_point(&mut rng);
            assert!(crash >= Multiplier::ONE && crash <= x(CLIMB_MAX_MULTIPLIER));
            if crash < x(200) {
                low += 1;
            }
        }
        // Roughly half of all rounds crash before 2x.
        assert!(low > 400, "low crashes {low}");
    }

    #[test]
    fn test_target_below_crash_pays() {
        let climb = Climb::with_crash_point(100, x(150), x(230), GameRng::seeded(0));
        assert!(climb.won());
        assert_eq!(climb.payout(), 150);

        let exact = Climb::with_crash_point(100, x(230), x(230), GameRng::seeded(0));
        assert_eq!(exact.payout(), 230);
    }

    #[test]
    fn test_target_above_crash_forfeits() {
        let climb = Climb::with_crash_point(100, x(300), x(230), GameRng::seeded(0));
        assert!(!climb.won());
        assert_eq!(climb.payout(), 0);
    }

    #[test]
    fn test_presentation_stops_at_target_or_crash() {
        let mut win = Climb::with_crash_point(10, x(200), x(500), GameRng::seeded(1));
        let mut last = Multiplier::ONE;
        loop {
            let (shown, phase) = win.advance();
            assert!(shown > last);
            last = shown;
            if phase != ClimbPhase::Climbing {
                assert_eq!(phase, ClimbPhase::CashedOut);
                assert_eq!(shown, x(200));
                break;
            }
        }

        let mut loss = Climb::with_crash_point(10, x(900), x(180), GameRng::seeded(2));
        while loss.phase() == ClimbPhase::Climbing {
            loss.advance();
        }
        assert_eq!(loss.phase(), ClimbPhase::Crashed);
        assert_eq!(loss.advance(), (x(180), ClimbPhase::Crashed));
    }
}
