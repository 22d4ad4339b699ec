use super::super::*;
use crate::casino::{blackjack, reels, sessions::Next, wheel};
use arcade_types::casino::{
    BuffKind, ClimbFrame, ClimbPhase, DuelMove, DuelSnapshot, Multiplier, Verdict, Wager,
    WheelBet, CLIMB_MAX_MULTIPLIER, CLIMB_MIN_TARGET, WHEEL_POCKETS,
};
use tokio::sync::mpsc;
use uuid::Uuid;

/// A finished duel before the payout is credited.
struct DuelOutcome {
    table: DuelSnapshot,
    verdict: Verdict,
    payout: Amount,
    lucky: bool,
}

enum DuelStep {
    Continue(DuelSnapshot),
    Finished(DuelOutcome),
}

impl Layer {
    // === Casino Handler Methods ===

    pub(in crate::layer) async fn handle_wheel(
        &self,
        caller: &AccountId,
        wager: Wager,
        bet: WheelBet,
    ) -> Result<Settled, Rejection> {
        if !bet.is_on_wheel() {
            return Err(Rejection::invalid(format!(
                "wheel numbers run from 0 to {}",
                WHEEL_POCKETS - 1
            )));
        }
        let stake = self.ledger.stake(caller, wager, self.config.min_wager).await?;
        let spin = wheel::spin(bet, stake, &mut self.fork_rng());
        let payout = self.pay_out(caller, stake, spin.payout).await;
        info!(%caller, stake, number = spin.number, payout, "wheel spun");
        Ok(Settled::new(
            Event::WheelSpun {
                bet,
                number: spin.number,
                color: spin.color,
                payout,
            },
            signed(payout) - signed(stake),
        ))
    }

    pub(in crate::layer) async fn handle_reels(
        &self,
        caller: &AccountId,
        wager: Wager,
    ) -> Result<Settled, Rejection> {
        let stake = self.ledger.stake(caller, wager, self.config.min_wager).await?;
        let (icons, payout) = reels::pull(stake, &mut self.fork_rng());
        let payout = self.pay_out(caller, stake, payout).await;
        info!(%caller, stake, payout, "reels pulled");
        Ok(Settled::new(
            Event::ReelsPulled { icons, payout },
            signed(payout) - signed(stake),
        ))
    }

    /// Settle a finished hand, applying dealer luck if the caller has it.
    fn resolve_duel(&self, caller: &AccountId, session: Uuid, duel: &mut Duel) -> DuelOutcome {
        // Only called on a final stage.
        let verdict = duel.verdict().unwrap_or(Verdict::Loss);
        let stake = duel.stake();
        let base = blackjack::base_payout(verdict, stake);
        let (payout, lucky) = if self.buffs.is_active(caller, BuffKind::DealerLuck) {
            blackjack::apply_luck(verdict, base, stake, duel.rng())
        } else {
            (base, false)
        };
        DuelOutcome {
            table: duel.snapshot(session),
            verdict,
            payout,
            lucky,
        }
    }

    async fn settle_duel(
        &self,
        caller: &AccountId,
        stake: Amount,
        outcome: DuelOutcome,
    ) -> (Event, Amount) {
        let payout = self.pay_out(caller, stake, outcome.payout).await;
        info!(
            %caller,
            stake,
            verdict = ?outcome.verdict,
            payout,
            lucky = outcome.lucky,
            "duel resolved"
        );
        let event = Event::DuelResolved {
            table: outcome.table,
            verdict: outcome.verdict,
            payout,
            lucky: outcome.lucky,
        };
        (event, payout)
    }

    pub(in crate::layer) async fn handle_duel_start(
        &self,
        caller: &AccountId,
        wager: Wager,
    ) -> Result<Settled, Rejection> {
        let reservation = self.duels.reserve(caller)?;
        let stake = self.ledger.stake(caller, wager, self.config.min_wager).await?;
        let mut duel = match Duel::deal(stake, self.fork_rng()) {
            Ok(duel) => duel,
            Err(e) => {
                self.ledger.credit(caller, stake).await?;
                return Err(game_rejection(GameType::Duel, e));
            }
        };

        // A natural settles on the deal and never occupies the slot.
        if duel.stage().is_final() {
            let outcome = self.resolve_duel(caller, reservation.id(), &mut duel);
            drop(reservation);
            let (event, payout) = self.settle_duel(caller, stake, outcome).await;
            return Ok(Settled::new(event, signed(payout) - signed(stake)));
        }

        let table = duel.snapshot(reservation.id());
        let session = reservation.open(duel);
        debug!(%caller, %session, stake, "duel dealt");
        Ok(Settled::debit(Event::DuelDealt(table), stake))
    }

    pub(in crate::layer) async fn handle_duel_act(
        &self,
        caller: &AccountId,
        action: DuelMove,
    ) -> Result<Settled, Rejection> {
        let (stake, step) = self.duels.with(caller, |session, duel| {
            let stage = match action {
                DuelMove::Hit => duel.hit(),
                DuelMove::Stand => duel.stand(),
            }
            .map_err(|e| game_rejection(GameType::Duel, e))?;
            if stage.is_final() {
                let outcome = self.resolve_duel(caller, session, duel);
                Ok(((duel.stake(), DuelStep::Finished(outcome)), Next::Close))
            } else {
                Ok(((duel.stake(), DuelStep::Continue(duel.snapshot(session))), Next::Keep))
            }
        })?;

        match step {
            DuelStep::Continue(table) => Ok(Settled::neutral(Event::DuelAdvanced(table))),
            DuelStep::Finished(outcome) => {
                let (event, payout) = self.settle_duel(caller, stake, outcome).await;
                Ok(Settled::credit(event, payout))
            }
        }
    }

    /// Stake and settle a climb round. The payout is credited immediately;
    /// the session only carries the presentation.
    pub(in crate::layer) async fn handle_climb_start(
        &self,
        caller: &AccountId,
        wager: Wager,
        target: Multiplier,
    ) -> Result<Settled, Rejection> {
        if !(CLIMB_MIN_TARGET..=CLIMB_MAX_MULTIPLIER).contains(&target.hundredths()) {
            return Err(Rejection::invalid(format!(
                "target must be between {} and {}",
                Multiplier::from_hundredths(CLIMB_MIN_TARGET),
                Multiplier::from_hundredths(CLIMB_MAX_MULTIPLIER)
            )));
        }
        let reservation = self.climbs.reserve(caller)?;
        let stake = self.ledger.stake(caller, wager, self.config.min_wager).await?;
        let climb = Climb::launch(stake, target, self.fork_rng());
        let payout = self.pay_out(caller, stake, climb.payout()).await;
        let session = reservation.open(climb);
        info!(%caller, %session, stake, %target, payout, "climb launched");
        Ok(Settled::new(
            Event::ClimbLaunched {
                session,
                stake,
                target,
                payout,
            },
            signed(payout) - signed(stake),
        ))
    }

    /// Move the caller's climb presentation one frame forward.
    pub fn advance_climb(&self, caller: &AccountId) -> Result<ClimbFrame, Rejection> {
        self.climbs.with(caller, |session, climb| {
            let (multiplier, phase) = climb.advance();
            let frame = ClimbFrame {
                session,
                multiplier,
                phase,
                crash_point: (phase != ClimbPhase::Climbing).then(|| climb.crash()),
            };
            let next = if frame.is_final() {
                Next::Close
            } else {
                Next::Keep
            };
            Ok((frame, next))
        })
    }

    /// Drop the caller's climb presentation. The round itself stays settled.
    pub fn cancel_climb(&self, caller: &AccountId) -> bool {
        self.climbs
            .with(caller, |_, _| Ok(((), Next::Close)))
            .is_ok()
    }

    /// Stream climb frames every `tick` until the round ends.
    ///
    /// If the receiver goes away the presentation is cancelled.
    pub async fn drive_climb(
        &self,
        caller: &AccountId,
        tick: Duration,
        frames: mpsc::Sender<ClimbFrame>,
    ) -> Result<(), Rejection> {
        loop {
            let frame = self.advance_climb(caller)?;
            let last = frame.is_final();
            if frames.send(frame).await.is_err() {
                debug!(%caller, "climb viewer left");
                self.cancel_climb(caller);
                return Ok(());
            }
            if last {
                return Ok(());
            }
            tokio::time::sleep(tick).await;
        }
    }

    pub(in crate::layer) fn handle_climb_tick(
        &self,
        caller: &AccountId,
    ) -> Result<Settled, Rejection> {
        self.advance_climb(caller)
            .map(|frame| Settled::neutral(Event::ClimbAdvanced(frame)))
    }

    pub(in crate::layer) async fn handle_pick_start(
        &self,
        caller: &AccountId,
        wager: Wager,
    ) -> Result<Settled, Rejection> {
        let reservation = self.picks.reserve(caller)?;
        let stake = self.ledger.stake(caller, wager, self.config.min_wager).await?;
        let positions = self.config.pick_positions;
        let pick = Pick::hide(stake, positions, &mut self.fork_rng());
        let session = reservation.open(pick);
        debug!(%caller, %session, stake, "pick opened");
        Ok(Settled::debit(Event::PickOpened { session, positions }, stake))
    }

    pub(in crate::layer) async fn handle_pick_choose(
        &self,
        caller: &AccountId,
        position: u8,
    ) -> Result<Settled, Rejection> {
        let (stake, winning, payout) = self.picks.with(caller, |_, pick| {
            let payout = pick.choose(position).map_err(|_| {
                Rejection::invalid(format!(
                    "choose a position between 1 and {}",
                    pick.positions()
                ))
            })?;
            Ok(((pick.stake(), pick.winning(), payout), Next::Close))
        })?;
        let payout = self.pay_out(caller, stake, payout).await;
        info!(%caller, stake, position, winning, payout, "pick revealed");
        Ok(Settled::credit(
            Event::PickRevealed {
                chosen: position,
                winning,
                payout,
            },
            payout,
        ))
    }
}
