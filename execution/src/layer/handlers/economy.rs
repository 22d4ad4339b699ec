use super::super::*;
use arcade_types::casino::{
    CRIME_COOLDOWN_SECS, CRIME_PENALTY, CRIME_REWARD_MAX, CRIME_REWARD_MIN, CRIME_SUCCESS_PERCENT,
    DAILY_COOLDOWN_SECS, DAILY_REWARD, MIN_TRANSFER, WORK_COOLDOWN_SECS, WORK_REWARD_MAX,
    WORK_REWARD_MIN,
};

impl Layer {
    // === Economy Handler Methods ===

    /// Start the action's cooldown, or report how long is left on it.
    fn start_cooldown(
        &self,
        caller: &AccountId,
        action: &str,
        duration_secs: u64,
    ) -> Result<(), Rejection> {
        self.cooldowns
            .try_arm(caller, action, duration_secs)
            .map(|_| ())
            .map_err(|remaining_secs| Rejection::CooldownActive {
                action: action.to_string(),
                remaining_secs,
            })
    }

    pub(in crate::layer) async fn handle_profile(
        &self,
        caller: &AccountId,
        account: Option<AccountId>,
    ) -> Result<Settled, Rejection> {
        let account = account.unwrap_or_else(|| caller.clone());
        if account.is_pool() {
            return Err(Rejection::invalid("pools have no profile"));
        }
        Ok(Settled::neutral(Event::Profile {
            balance: self.ledger.balance(&account).await,
            buffs: self.buffs.active(&account),
            items: self.inventory.count(&account),
            account,
        }))
    }

    pub(in crate::layer) async fn handle_transfer(
        &self,
        caller: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<Settled, Rejection> {
        if amount < MIN_TRANSFER {
            return Err(Rejection::invalid(format!(
                "transfers start at {MIN_TRANSFER} points"
            )));
        }
        if to.is_pool() {
            return Err(Rejection::invalid("use a pool deposit to fund a pool"));
        }
        if !self.ledger.transfer(caller, to, amount).await? {
            return Err(Rejection::InsufficientFunds {
                balance: self.ledger.balance(caller).await,
                required: amount,
            });
        }
        info!(from = %caller, %to, amount, "transfer");
        Ok(Settled::debit(
            Event::Transferred {
                to: to.clone(),
                amount,
            },
            amount,
        ))
    }

    pub(in crate::layer) async fn handle_crime(
        &self,
        caller: &AccountId,
    ) -> Result<Settled, Rejection> {
        self.start_cooldown(caller, "crime", CRIME_COOLDOWN_SECS)?;
        let mut rng = self.fork_rng();
        if rng.chance_percent(CRIME_SUCCESS_PERCENT) {
            let amount = rng.range_inclusive(CRIME_REWARD_MIN, CRIME_REWARD_MAX);
            self.ledger.credit(caller, amount).await?;
            return Ok(Settled::credit(
                Event::CrimeCommitted {
                    success: true,
                    amount,
                },
                amount,
            ));
        }

        // The fine never takes the balance below zero.
        let taken = self.ledger.debit_up_to(caller, CRIME_PENALTY).await;
        Ok(Settled::debit(
            Event::CrimeCommitted {
                success: false,
                amount: taken,
            },
            taken,
        ))
    }

    pub(in crate::layer) async fn handle_daily(
        &self,
        caller: &AccountId,
    ) -> Result<Settled, Rejection> {
        self.start_cooldown(caller, "daily", DAILY_COOLDOWN_SECS)?;
        self.ledger.credit(caller, DAILY_REWARD).await?;
        Ok(Settled::credit(
            Event::DailyClaimed {
                amount: DAILY_REWARD,
            },
            DAILY_REWARD,
        ))
    }

    pub(in crate::layer) async fn handle_work(
        &self,
        caller: &AccountId,
    ) -> Result<Settled, Rejection> {
        self.start_cooldown(caller, "work", WORK_COOLDOWN_SECS)?;
        let amount = self
            .fork_rng()
            .range_inclusive(WORK_REWARD_MIN, WORK_REWARD_MAX);
        self.ledger.credit(caller, amount).await?;
        Ok(Settled::credit(Event::WorkPaid { amount }, amount))
    }

    pub(in crate::layer) async fn handle_leaderboard(&self) -> Result<Settled, Rejection> {
        Ok(Settled::neutral(Event::Leaderboard(self.ledger.top().await)))
    }
}
