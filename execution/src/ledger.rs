//! Account balances.
//!
//! The ledger lock is the only serialisation point for balance changes. It is
//! held for "read, validate, mutate, persist" and nothing else, so game logic
//! always runs outside of it.

use crate::state::{self, Domain, Store};
use arcade_types::{
    casino::{Leaderboard, Wager},
    execution::Rejection,
    AccountId, Amount,
};
use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::Mutex;
use tracing::{debug, info};

type Balances = BTreeMap<AccountId, Amount>;

pub struct Ledger {
    balances: Mutex<Balances>,
    store: Arc<dyn Store>,
}

fn ensure_positive(amount: Amount) -> Result<(), Rejection> {
    if amount == 0 {
        return Err(Rejection::invalid("amount must be positive"));
    }
    Ok(())
}

fn insufficient(balance: Amount, required: Amount) -> Rejection {
    Rejection::InsufficientFunds { balance, required }
}

impl Ledger {
    /// Restore balances from the store (empty when nothing was saved).
    pub fn load(store: Arc<dyn Store>) -> Self {
        let balances: Balances = state::load(store.as_ref(), Domain::Balances);
        info!(accounts = balances.len(), "loaded balances");
        Self {
            balances: Mutex::new(balances),
            store,
        }
    }

    /// Run `op` under the lock and persist the snapshot if it succeeded.
    async fn mutate<R>(
        &self,
        op: impl FnOnce(&mut Balances) -> Result<R, Rejection>,
    ) -> Result<R, Rejection> {
        let mut balances = self.balances.lock().await;
        let result = op(&mut *balances)?;
        state::save(self.store.as_ref(), Domain::Balances, &*balances);
        Ok(result)
    }

    pub async fn balance(&self, account: &AccountId) -> Amount {
        let balances = self.balances.lock().await;
        balances.get(account).copied().unwrap_or_default()
    }

    /// Add points, returning the new balance.
    pub async fn credit(&self, account: &AccountId, amount: Amount) -> Result<Amount, Rejection> {
        ensure_positive(amount)?;
        self.mutate(|balances| {
            let balance = balances.entry(account.clone()).or_default();
            *balance = balance
                .checked_add(amount)
                .ok_or_else(|| Rejection::invalid("balance would overflow"))?;
            debug!(%account, amount, balance = *balance, "credited");
            Ok(*balance)
        })
        .await
    }

    /// Remove points, returning the new balance or `InsufficientFunds` without mutating.
    pub async fn withdraw(&self, account: &AccountId, amount: Amount) -> Result<Amount, Rejection> {
        ensure_positive(amount)?;
        self.mutate(|balances| {
            let current = balances.get(account).copied().unwrap_or_default();
            if amount > current {
                return Err(insufficient(current, amount));
            }
            let remaining = current - amount;
            balances.insert(account.clone(), remaining);
            debug!(%account, amount, balance = remaining, "debited");
            Ok(remaining)
        })
        .await
    }

    /// Remove points if the balance covers them. Returns `false` and changes nothing otherwise.
    pub async fn debit(&self, account: &AccountId, amount: Amount) -> Result<bool, Rejection> {
        match self.withdraw(account, amount).await {
            Ok(_) => Ok(true),
            Err(Rejection::InsufficientFunds { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Remove up to `amount`, clamping at zero. Returns what was actually taken.
    pub async fn debit_up_to(&self, account: &AccountId, amount: Amount) -> Amount {
        let taken = self
            .mutate(|balances| {
                let balance = balances.entry(account.clone()).or_default();
                let taken = amount.min(*balance);
                *balance -= taken;
                Ok(taken)
            })
            .await;
        taken.unwrap_or_default()
    }

    /// Overwrite a balance, returning the previous one.
    pub async fn set_balance(&self, account: &AccountId, amount: Amount) -> Amount {
        let previous = self
            .mutate(|balances| Ok(balances.insert(account.clone(), amount)))
            .await;
        previous.ok().flatten().unwrap_or_default()
    }

    /// Resolve a wager against the current balance and debit it in one step.
    ///
    /// `Wager::All` stakes the whole balance. Returns the amount staked.
    pub async fn stake(
        &self,
        account: &AccountId,
        wager: Wager,
        minimum: Amount,
    ) -> Result<Amount, Rejection> {
        self.mutate(|balances| {
            let current = balances.get(account).copied().unwrap_or_default();
            let amount = match wager {
                Wager::All => current,
                Wager::Amount(amount) => amount,
            };
            if amount < minimum || amount == 0 {
                return Err(Rejection::BelowMinimum {
                    wager: amount,
                    minimum,
                });
            }
            if amount > current {
                return Err(insufficient(current, amount));
            }
            balances.insert(account.clone(), current - amount);
            debug!(%account, amount, "staked");
            Ok(amount)
        })
        .await
    }

    /// Move points between accounts under a single lock acquisition.
    pub async fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<bool, Rejection> {
        ensure_positive(amount)?;
        if from == to {
            return Err(Rejection::invalid("cannot transfer to the same account"));
        }
        let outcome = self
            .mutate(|balances| {
                let source = balances.get(from).copied().unwrap_or_default();
                if amount > source {
                    return Err(insufficient(source, amount));
                }
                let target = balances.get(to).copied().unwrap_or_default();
                let credited = target
                    .checked_add(amount)
                    .ok_or_else(|| Rejection::invalid("balance would overflow"))?;
                balances.insert(from.clone(), source - amount);
                balances.insert(to.clone(), credited);
                debug!(%from, %to, amount, "transferred");
                Ok(())
            })
            .await;
        match outcome {
            Ok(()) => Ok(true),
            Err(Rejection::InsufficientFunds { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Richest player accounts. Pool accounts are not ranked.
    pub async fn top(&self) -> Leaderboard {
        let balances = self.balances.lock().await;
        let mut leaderboard = Leaderboard::default();
        for (account, balance) in balances.iter().filter(|(a, _)| !a.is_pool()) {
            leaderboard.update(account.clone(), *balance);
        }
        leaderboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Memory;

    fn ledger() -> (Arc<Memory>, Ledger) {
        let store = Arc::new(Memory::default());
        let ledger = Ledger::load(store.clone());
        (store, ledger)
    }

    #[tokio::test]
    async fn test_credit_then_debit_round_trips() {
        let (_, ledger) = ledger();
        let alice = AccountId::from("alice");

        assert_eq!(ledger.credit(&alice, 100).await.unwrap(), 100);
        assert!(ledger.debit(&alice, 100).await.unwrap());
        assert_eq!(ledger.balance(&alice).await, 0);
    }

    #[tokio::test]
    async fn test_debit_never_goes_negative() {
        let (_, ledger) = ledger();
        let alice = AccountId::from("alice");
        ledger.credit(&alice, 50).await.unwrap();

        assert!(!ledger.debit(&alice, 51).await.unwrap());
        assert_eq!(ledger.balance(&alice).await, 50);
        assert_eq!(
            ledger.withdraw(&alice, 80).await,
            Err(Rejection::InsufficientFunds {
                balance: 50,
                required: 80
            })
        );
    }

    #[tokio::test]
    async fn test_zero_amounts_are_invalid() {
        let (_, ledger) = ledger();
        let alice = AccountId::from("alice");
        assert!(matches!(
            ledger.credit(&alice, 0).await,
            Err(Rejection::InvalidArgument(_))
        ));
        assert!(matches!(
            ledger.debit(&alice, 0).await,
            Err(Rejection::InvalidArgument(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_debits_only_one_succeeds() {
        let (_, ledger) = ledger();
        let ledger = Arc::new(ledger);
        let alice = AccountId::from("alice");
        ledger.credit(&alice, 100).await.unwrap();

        let first = {
            let ledger = ledger.clone();
            let alice = alice.clone();
            tokio::spawn(async move { ledger.debit(&alice, 80).await })
        };
        let second = {
            let ledger = ledger.clone();
            let alice = alice.clone();
            tokio::spawn(async move { ledger.debit(&alice, 80).await })
        };

        let results = [
            first.await.unwrap().unwrap(),
            second.await.unwrap().unwrap(),
        ];
        assert_eq!(results.iter().filter(|ok| **ok).count(), 1);
        assert_eq!(ledger.balance(&alice).await, 20);
    }

    #[tokio::test]
    async fn test_stake_resolves_all_and_minimum() {
        let (_, ledger) = ledger();
        let alice = AccountId::from("alice");
        ledger.credit(&alice, 120).await.unwrap();

        assert_eq!(
            ledger.stake(&alice, Wager::Amount(5), 10).await,
            Err(Rejection::BelowMinimum {
                wager: 5,
                minimum: 10
            })
        );
        assert_eq!(
            ledger.stake(&alice, Wager::Amount(500), 10).await,
            Err(Rejection::InsufficientFunds {
                balance: 120,
                required: 500
            })
        );
        assert_eq!(ledger.stake(&alice, Wager::All, 10).await, Ok(120));
        assert_eq!(ledger.balance(&alice).await, 0);

        // An empty balance cannot stake "all".
        assert!(matches!(
            ledger.stake(&alice, Wager::All, 10).await,
            Err(Rejection::BelowMinimum { .. })
        ));
    }

    #[tokio::test]
    async fn test_transfer_and_clamped_debit() {
        let (_, ledger) = ledger();
        let alice = AccountId::from("alice");
        let bob = AccountId::from("bob");
        ledger.credit(&alice, 100).await.unwrap();

        assert!(ledger.transfer(&alice, &bob, 60).await.unwrap());
        assert!(!ledger.transfer(&alice, &bob, 60).await.unwrap());
        assert!(ledger.transfer(&alice, &alice, 10).await.is_err());
        assert_eq!(ledger.balance(&alice).await, 40);
        assert_eq!(ledger.balance(&bob).await, 60);

        assert_eq!(ledger.debit_up_to(&bob, 1_000).await, 60);
        assert_eq!(ledger.balance(&bob).await, 0);
    }

    #[tokio::test]
    async fn test_balances_survive_reload() {
        let (store, ledger) = ledger();
        let alice = AccountId::from("alice");
        ledger.credit(&alice, 75).await.unwrap();
        assert_eq!(ledger.set_balance(&alice, 500).await, 75);

        let reloaded = Ledger::load(store);
        assert_eq!(reloaded.balance(&alice).await, 500);
    }

    #[tokio::test]
    async fn test_leaderboard_skips_pools() {
        let (_, ledger) = ledger();
        ledger.credit(&AccountId::pool("family"), 1_000).await.unwrap();
        ledger.credit(&AccountId::from("alice"), 10).await.unwrap();
        ledger.credit(&AccountId::from("bob"), 20).await.unwrap();

        let top = ledger.top().await;
        let accounts: Vec<_> = top.entries.iter().map(|e| e.account.as_str()).collect();
        assert_eq!(accounts, vec!["bob", "alice"]);
    }
}
