//! Shared pools: named balances several accounts can pay into and draw from.
//!
//! Pool funds live in the [Ledger] under [AccountId::pool]; this module only
//! tracks who may move them.

use crate::{
    ledger::Ledger,
    state::{self, Domain, Store},
};
use arcade_types::{execution::Rejection, AccountId, Amount};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::info;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Pool {
    owner: AccountId,
    #[serde(default)]
    members: BTreeSet<AccountId>,
}

impl Pool {
    fn admits(&self, account: &AccountId) -> bool {
        self.owner == *account || self.members.contains(account)
    }
}

type Pools = BTreeMap<String, Pool>;

pub struct SharedPools {
    pools: Mutex<Pools>,
    ledger: Arc<Ledger>,
    store: Arc<dyn Store>,
}

fn pool_name(name: &str) -> Result<String, Rejection> {
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return Err(Rejection::invalid("pool name cannot be empty"));
    }
    Ok(name)
}

impl SharedPools {
    pub fn load(ledger: Arc<Ledger>, store: Arc<dyn Store>) -> Self {
        let pools: Pools = state::load(store.as_ref(), Domain::SharedAccounts);
        info!(pools = pools.len(), "loaded shared pools");
        Self {
            pools: Mutex::new(pools),
            ledger,
            store,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Pools> {
        self.pools
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Resolve a pool the caller belongs to, returning its ledger account.
    fn member_account(&self, name: &str, caller: &AccountId) -> Result<AccountId, Rejection> {
        let name = pool_name(name)?;
        let pools = self.lock();
        let pool = pools
            .get(&name)
            .ok_or_else(|| Rejection::invalid(format!("no pool named {name}")))?;
        if !pool.admits(caller) {
            return Err(Rejection::NotPermitted(format!("not a member of {name}")));
        }
        Ok(AccountId::pool(&name))
    }

    pub fn create(&self, owner: &AccountId, name: &str) -> Result<String, Rejection> {
        let name = pool_name(name)?;
        let mut pools = self.lock();
        if pools.contains_key(&name) {
            return Err(Rejection::invalid(format!("pool {name} already exists")));
        }
        pools.insert(
            name.clone(),
            Pool {
                owner: owner.clone(),
                members: BTreeSet::new(),
            },
        );
        state::save(self.store.as_ref(), Domain::SharedAccounts, &*pools);
        info!(%owner, pool = %name, "pool created");
        Ok(name)
    }

    /// Only the owner may add members.
    pub fn add_member(
        &self,
        caller: &AccountId,
        name: &str,
        member: &AccountId,
    ) -> Result<String, Rejection> {
        let name = pool_name(name)?;
        let mut pools = self.lock();
        let pool = pools
            .get_mut(&name)
            .ok_or_else(|| Rejection::invalid(format!("no pool named {name}")))?;
        if pool.owner != *caller {
            return Err(Rejection::NotPermitted(format!("only the owner manages {name}")));
        }
        pool.members.insert(member.clone());
        state::save(self.store.as_ref(), Domain::SharedAccounts, &*pools);
        Ok(name)
    }

    async fn move_funds(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), Rejection> {
        if self.ledger.transfer(from, to, amount).await? {
            return Ok(());
        }
        Err(Rejection::InsufficientFunds {
            balance: self.ledger.balance(from).await,
            required: amount,
        })
    }

    /// Move points from the caller into the pool. Returns the pool balance.
    pub async fn deposit(
        &self,
        caller: &AccountId,
        name: &str,
        amount: Amount,
    ) -> Result<Amount, Rejection> {
        let pool = self.member_account(name, caller)?;
        self.move_funds(caller, &pool, amount).await?;
        Ok(self.ledger.balance(&pool).await)
    }

    /// Move points from the pool to the caller. Returns the pool balance.
    pub async fn withdraw(
        &self,
        caller: &AccountId,
        name: &str,
        amount: Amount,
    ) -> Result<Amount, Rejection> {
        let pool = self.member_account(name, caller)?;
        self.move_funds(&pool, caller, amount).await?;
        Ok(self.ledger.balance(&pool).await)
    }

    pub async fn balance(&self, caller: &AccountId, name: &str) -> Result<Amount, Rejection> {
        let pool = self.member_account(name, caller)?;
        Ok(self.ledger.balance(&pool).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Memory;

    #[tokio::test]
    async fn test_pool_lifecycle() {
        let store = Arc::new(Memory::default());
        let ledger = Arc::new(Ledger::load(store.clone()));
        let pools = SharedPools::load(ledger.clone(), store.clone());
        let owner = AccountId::from("owner");
        let friend = AccountId::from("friend");
        let stranger = AccountId::from("stranger");
        ledger.credit(&owner, 500).await.unwrap();
        ledger.credit(&friend, 100).await.unwrap();

        assert_eq!(pools.create(&owner, " Family ").unwrap(), "family");
        assert!(pools.create(&friend, "family").is_err());
        assert!(matches!(
            pools.add_member(&friend, "family", &friend),
            Err(Rejection::NotPermitted(_))
        ));
        pools.add_member(&owner, "family", &friend).unwrap();

        assert_eq!(pools.deposit(&owner, "family", 300).await.unwrap(), 300);
        assert_eq!(pools.withdraw(&friend, "family", 120).await.unwrap(), 180);
        assert_eq!(ledger.balance(&friend).await, 220);
        assert!(matches!(
            pools.withdraw(&friend, "family", 1_000).await,
            Err(Rejection::InsufficientFunds {
                balance: 180,
                required: 1_000
            })
        ));
        assert!(matches!(
            pools.balance(&stranger, "family").await,
            Err(Rejection::NotPermitted(_))
        ));

        // Membership survives a reload.
        let reloaded = SharedPools::load(ledger, store);
        assert_eq!(reloaded.balance(&friend, "FAMILY").await.unwrap(), 180);
    }
}
