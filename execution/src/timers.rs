use crate::{
    clock::Clock,
    state::{self, Domain, Store},
};
use arcade_types::AccountId;
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::debug;

type Entries = BTreeMap<AccountId, BTreeMap<String, u64>>;

/// Expiring (subject, key) markers used for cooldowns and buffs.
///
/// Expired entries are never swept; they are dropped the next time they are
/// looked at.
pub struct Timers {
    entries: Mutex<Entries>,
    clock: Arc<dyn Clock>,
    persistence: Option<(Arc<dyn Store>, Domain)>,
}

impl Timers {
    /// Registry that lives only in memory.
    pub fn volatile(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(Entries::new()),
            clock,
            persistence: None,
        }
    }

    /// Registry mirrored to `domain` on every change.
    pub fn persistent(clock: Arc<dyn Clock>, store: Arc<dyn Store>, domain: Domain) -> Self {
        let entries: Entries = state::load(store.as_ref(), domain);
        Self {
            entries: Mutex::new(entries),
            clock,
            persistence: Some((store, domain)),
        }
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, entries: &Entries) {
        if let Some((store, domain)) = &self.persistence {
            state::save(store.as_ref(), *domain, entries);
        }
    }

    fn insert(&self, entries: &mut Entries, subject: &AccountId, key: &str, expiry: u64) {
        entries
            .entry(subject.clone())
            .or_default()
            .insert(key.to_string(), expiry);
        self.persist(entries);
    }

    /// Drop the entry if it has expired. Returns the live expiry, if any.
    fn live_expiry(&self, entries: &mut Entries, subject: &AccountId, key: &str) -> Option<u64> {
        let now = self.clock.now();
        let keys = entries.get_mut(subject)?;
        let expiry = *keys.get(key)?;
        if now < expiry {
            return Some(expiry);
        }
        keys.remove(key);
        if keys.is_empty() {
            entries.remove(subject);
        }
        debug!(%subject, key, "timer expired");
        self.persist(entries);
        None
    }

    /// Start (or restart) a timer. Returns its expiry instant.
    pub fn arm(&self, subject: &AccountId, key: &str, duration_secs: u64) -> u64 {
        let expiry = self.clock.now().saturating_add(duration_secs);
        let mut entries = self.lock();
        self.insert(&mut entries, subject, key, expiry);
        expiry
    }

    /// Arm the timer unless it is still running, in one step.
    ///
    /// Returns the new expiry, or the seconds left on the running timer.
    pub fn try_arm(&self, subject: &AccountId, key: &str, duration_secs: u64) -> Result<u64, u64> {
        let mut entries = self.lock();
        let now = self.clock.now();
        if let Some(expiry) = self.live_expiry(&mut entries, subject, key) {
            return Err(expiry - now);
        }
        let expiry = now.saturating_add(duration_secs);
        self.insert(&mut entries, subject, key, expiry);
        Ok(expiry)
    }

    pub fn is_active(&self, subject: &AccountId, key: &str) -> bool {
        let mut entries = self.lock();
        self.live_expiry(&mut entries, subject, key).is_some()
    }

    /// Seconds until expiry, zero when absent or expired.
    pub fn remaining_secs(&self, subject: &AccountId, key: &str) -> u64 {
        let now = self.clock.now();
        let entries = self.lock();
        entries
            .get(subject)
            .and_then(|keys| keys.get(key))
            .map(|expiry| expiry.saturating_sub(now))
            .unwrap_or_default()
    }

    /// Every running timer of a subject with its remaining seconds.
    pub fn active(&self, subject: &AccountId) -> Vec<(String, u64)> {
        let now = self.clock.now();
        let entries = self.lock();
        entries
            .get(subject)
            .map(|keys| {
                keys.iter()
                    .filter(|(_, expiry)| now < **expiry)
                    .map(|(key, expiry)| (key.clone(), expiry - now))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mocks::ManualClock, state::Memory};

    #[test]
    fn test_arm_and_lazy_expiry() {
        let clock = Arc::new(ManualClock::new(1_000));
        let timers = Timers::volatile(clock.clone());
        let alice = AccountId::from("alice");

        assert_eq!(timers.arm(&alice, "crime", 600), 1_600);
        clock.advance(599);
        assert!(timers.is_active(&alice, "crime"));
        assert_eq!(timers.remaining_secs(&alice, "crime"), 1);

        clock.advance(1);
        assert!(!timers.is_active(&alice, "crime"));
        assert_eq!(timers.remaining_secs(&alice, "crime"), 0);
        assert!(timers.active(&alice).is_empty());
    }

    #[test]
    fn test_try_arm_gates_reuse() {
        let clock = Arc::new(ManualClock::new(0));
        let timers = Timers::volatile(clock.clone());
        let alice = AccountId::from("alice");

        assert_eq!(timers.try_arm(&alice, "daily", 86_400), Ok(86_400));
        clock.advance(400);
        assert_eq!(timers.try_arm(&alice, "daily", 86_400), Err(86_000));
        // Other subjects and keys are independent.
        assert!(timers.try_arm(&AccountId::from("bob"), "daily", 86_400).is_ok());
        assert!(timers.try_arm(&alice, "work", 420).is_ok());

        clock.advance(86_000);
        assert_eq!(timers.try_arm(&alice, "daily", 86_400), Ok(172_800));
    }

    #[test]
    fn test_persistent_timers_reload() {
        let clock = Arc::new(ManualClock::new(10));
        let store = Arc::new(Memory::default());
        let alice = AccountId::from("alice");
        {
            let timers = Timers::persistent(clock.clone(), store.clone(), Domain::Buffs);
            timers.arm(&alice, "payout_boost", 600);
        }

        let timers = Timers::persistent(clock.clone(), store, Domain::Buffs);
        assert!(timers.is_active(&alice, "payout_boost"));
        assert_eq!(timers.active(&alice), vec![("payout_boost".to_string(), 600)]);
    }
}
