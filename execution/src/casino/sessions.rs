//! Per-account game sessions with deadlines.
//!
//! A table holds at most one session per account. Opening happens in two
//! steps: [SessionTable::reserve] claims the slot before the stake is taken,
//! and [Reservation::open] stores the game state afterwards. Dropping an
//! unopened reservation frees the slot again, so a failed stake leaves nothing
//! behind.

use crate::clock::Clock;
use arcade_types::{casino::GameType, execution::Rejection, AccountId};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::info;
use uuid::Uuid;

/// How a session's deadline moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expiry {
    /// Deadline is pushed back on every interaction.
    Inactivity,
    /// Deadline is set once when the session opens.
    Fixed,
}

/// What to do with a session after an interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Next {
    Keep,
    Close,
}

struct Slot<S> {
    id: Uuid,
    deadline: u64,
    // None while the stake is being taken.
    state: Option<S>,
}

pub struct SessionTable<S> {
    game: GameType,
    window_secs: u64,
    expiry: Expiry,
    clock: Arc<dyn Clock>,
    slots: Mutex<HashMap<AccountId, Slot<S>>>,
}

/// Claim on a session slot that has not been opened yet.
pub struct Reservation<'a, S> {
    table: &'a SessionTable<S>,
    account: AccountId,
    id: Uuid,
    opened: bool,
}

impl<S> Reservation<'_, S> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Store the game state; the session is live from here on.
    pub fn open(mut self, state: S) -> Uuid {
        let now = self.table.clock.now();
        let mut slots = self.table.lock();
        if let Some(slot) = slots.get_mut(&self.account).filter(|s| s.id == self.id) {
            slot.state = Some(state);
            slot.deadline = now.saturating_add(self.table.window_secs);
        }
        self.opened = true;
        self.id
    }
}

impl<S> Drop for Reservation<'_, S> {
    fn drop(&mut self) {
        if self.opened {
            return;
        }
        let mut slots = self.table.lock();
        if slots.get(&self.account).is_some_and(|s| s.id == self.id) {
            slots.remove(&self.account);
        }
    }
}

impl<S> SessionTable<S> {
    pub fn new(game: GameType, window_secs: u64, expiry: Expiry, clock: Arc<dyn Clock>) -> Self {
        Self {
            game,
            window_secs,
            expiry,
            clock,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn game(&self) -> GameType {
        self.game
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<AccountId, Slot<S>>> {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn expired(slot: &Slot<S>, now: u64) -> bool {
        slot.state.is_some() && slot.deadline <= now
    }

    /// Claim the account's slot, failing with `SessionOpen` if a live session exists.
    pub fn reserve(&self, account: &AccountId) -> Result<Reservation<'_, S>, Rejection> {
        let now = self.clock.now();
        let mut slots = self.lock();
        if let Some(slot) = slots.get(account) {
            if !Self::expired(slot, now) {
                return Err(Rejection::SessionOpen(self.game));
            }
            info!(game = %self.game, %account, session = %slot.id, "discarded expired session");
        }
        let id = Uuid::new_v4();
        slots.insert(
            account.clone(),
            Slot {
                id,
                deadline: now.saturating_add(self.window_secs),
                state: None,
            },
        );
        Ok(Reservation {
            table: self,
            account: account.clone(),
            id,
            opened: false,
        })
    }

    /// Run `op` against the account's live session.
    ///
    /// Expired sessions are discarded and reported as `NoSession`. An error
    /// from `op` leaves the session in place.
    pub fn with<R>(
        &self,
        account: &AccountId,
        op: impl FnOnce(Uuid, &mut S) -> Result<(R, Next), Rejection>,
    ) -> Result<R, Rejection> {
        let now = self.clock.now();
        let mut slots = self.lock();
        let Some(slot) = slots.get_mut(account) else {
            return Err(Rejection::NoSession(self.game));
        };
        if Self::expired(slot, now) {
            info!(game = %self.game, %account, session = %slot.id, "discarded expired session");
            slots.remove(account);
            return Err(Rejection::NoSession(self.game));
        }
        let id = slot.id;
        let Some(state) = slot.state.as_mut() else {
            return Err(Rejection::NoSession(self.game));
        };
        let (result, next) = op(id, state)?;
        match next {
            Next::Close => {
                slots.remove(account);
            }
            Next::Keep => {
                if self.expiry == Expiry::Inactivity {
                    slot.deadline = now.saturating_add(self.window_secs);
                }
            }
        }
        Ok(result)
    }

    pub fn is_open(&self, account: &AccountId) -> bool {
        let now = self.clock.now();
        self.lock()
            .get(account)
            .is_some_and(|slot| !Self::expired(slot, now))
    }

    /// Discard every expired session. Returns how many were dropped.
    pub fn reap(&self) -> usize {
        let now = self.clock.now();
        let mut slots = self.lock();
        let before = slots.len();
        slots.retain(|account, slot| {
            let keep = !Self::expired(slot, now);
            if !keep {
                info!(game = %self.game, %account, session = %slot.id, "session timed out");
            }
            keep
        });
        before - slots.len()
    }
}
