use super::super::*;
use crate::effects::draw_reward;
use arcade_types::casino::{BoxTier, RewardEffect};

impl Layer {
    // === Inventory and Pool Handler Methods ===

    pub(in crate::layer) async fn handle_open_box(
        &self,
        caller: &AccountId,
        tier: BoxTier,
    ) -> Result<Settled, Rejection> {
        let price = tier.price();
        self.ledger.withdraw(caller, price).await?;
        let reward = draw_reward(tier, &mut self.fork_rng());

        let buff = match reward.effect {
            RewardEffect::Item => {
                self.inventory.grant(caller, reward.label);
                None
            }
            RewardEffect::Buff(kind) => {
                self.buffs.grant(caller, kind, kind.default_duration_secs());
                Some(kind)
            }
            RewardEffect::ItemWithBuff(kind) => {
                self.inventory.grant(caller, reward.label);
                self.buffs.grant(caller, kind, kind.default_duration_secs());
                Some(kind)
            }
        };
        info!(%caller, %tier, reward = reward.label, "box opened");
        Ok(Settled::debit(
            Event::BoxOpened {
                tier,
                reward: reward.label.to_string(),
                buff,
            },
            price,
        ))
    }

    pub(in crate::layer) fn handle_inventory(
        &self,
        caller: &AccountId,
    ) -> Result<Settled, Rejection> {
        Ok(Settled::neutral(Event::Inventory(self.inventory.items(caller))))
    }

    pub(in crate::layer) fn handle_give_item(
        &self,
        caller: &AccountId,
        to: &AccountId,
        query: &str,
    ) -> Result<Settled, Rejection> {
        if to.is_pool() {
            return Err(Rejection::invalid("pools cannot hold items"));
        }
        let item = self.inventory.transfer(caller, to, query)?;
        Ok(Settled::neutral(Event::ItemGiven {
            to: to.clone(),
            item,
        }))
    }

    pub(in crate::layer) fn handle_pool_create(
        &self,
        caller: &AccountId,
        name: &str,
    ) -> Result<Settled, Rejection> {
        let name = self.pools.create(caller, name)?;
        Ok(Settled::neutral(Event::PoolCreated { name }))
    }

    pub(in crate::layer) fn handle_pool_add_member(
        &self,
        caller: &AccountId,
        name: &str,
        member: &AccountId,
    ) -> Result<Settled, Rejection> {
        if member.is_pool() {
            return Err(Rejection::invalid("a pool cannot join a pool"));
        }
        let name = self.pools.add_member(caller, name, member)?;
        Ok(Settled::neutral(Event::PoolMemberAdded {
            name,
            member: member.clone(),
        }))
    }

    pub(in crate::layer) async fn handle_pool_deposit(
        &self,
        caller: &AccountId,
        name: &str,
        amount: Amount,
    ) -> Result<Settled, Rejection> {
        let balance = self.pools.deposit(caller, name, amount).await?;
        Ok(Settled::debit(
            Event::PoolBalance {
                name: name.trim().to_lowercase(),
                balance,
            },
            amount,
        ))
    }

    pub(in crate::layer) async fn handle_pool_withdraw(
        &self,
        caller: &AccountId,
        name: &str,
        amount: Amount,
    ) -> Result<Settled, Rejection> {
        let balance = self.pools.withdraw(caller, name, amount).await?;
        Ok(Settled::credit(
            Event::PoolBalance {
                name: name.trim().to_lowercase(),
                balance,
            },
            amount,
        ))
    }

    pub(in crate::layer) async fn handle_pool_balance(
        &self,
        caller: &AccountId,
        name: &str,
    ) -> Result<Settled, Rejection> {
        let balance = self.pools.balance(caller, name).await?;
        Ok(Settled::neutral(Event::PoolBalance {
            name: name.trim().to_lowercase(),
            balance,
        }))
    }
}
