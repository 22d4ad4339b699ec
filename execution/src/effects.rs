//! Timed buffs and mystery box rewards.
//!
//! Engines only read buffs. Buffs are written by reward flows (box opening)
//! and by administrators.

use crate::{
    casino::{apply_boost, GameRng},
    clock::Clock,
    state::{Domain, Store},
    timers::Timers,
};
use arcade_types::{
    casino::{BoxTier, BuffKind, Reward},
    execution::ActiveBuff,
    AccountId, Amount,
};
use std::sync::Arc;
use tracing::info;

/// Buff registry backed by a persistent [Timers].
pub struct Buffs {
    timers: Timers,
}

impl Buffs {
    pub fn load(clock: Arc<dyn Clock>, store: Arc<dyn Store>) -> Self {
        Self {
            timers: Timers::persistent(clock, store, Domain::Buffs),
        }
    }

    /// Arm (or extend to) `duration_secs` from now. Returns the expiry instant.
    pub fn grant(&self, account: &AccountId, kind: BuffKind, duration_secs: u64) -> u64 {
        let expires_at = self.timers.arm(account, kind.key(), duration_secs);
        info!(%account, buff = kind.key(), expires_at, "buff granted");
        expires_at
    }

    pub fn is_active(&self, account: &AccountId, kind: BuffKind) -> bool {
        self.timers.is_active(account, kind.key())
    }

    pub fn remaining_secs(&self, account: &AccountId, kind: BuffKind) -> u64 {
        self.timers.remaining_secs(account, kind.key())
    }

    /// Running buffs of an account. Unknown keys in the registry are skipped.
    pub fn active(&self, account: &AccountId) -> Vec<ActiveBuff> {
        self.timers
            .active(account)
            .into_iter()
            .filter_map(|(key, remaining_secs)| {
                BuffKind::from_key(&key).map(|kind| ActiveBuff {
                    kind,
                    remaining_secs,
                })
            })
            .collect()
    }

    /// Apply the payout boost if it is running for `account`.
    pub fn boost(&self, account: &AccountId, payout: Amount, stake: Amount) -> Amount {
        let boosted = payout > stake && self.is_active(account, BuffKind::PayoutBoost);
        apply_boost(payout, stake, boosted)
    }
}

/// Weighted draw from a box tier's reward table.
pub fn draw_reward(tier: BoxTier, rng: &mut GameRng) -> Reward {
    let rewards = tier.rewards();
    // Tables are static and non-empty with positive weights.
    rng.choose_weighted(rewards, |reward| reward.weight)
        .copied()
        .unwrap_or(rewards[0])
}
