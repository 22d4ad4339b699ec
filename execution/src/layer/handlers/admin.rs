use super::super::*;

impl Layer {
    // === Admin Handler Methods ===

    /// Returns the affected account (if any) with the outcome.
    pub(in crate::layer) async fn handle_admin(
        &self,
        command: AdminCommand,
    ) -> (Option<AccountId>, Result<Settled, Rejection>) {
        match command {
            AdminCommand::SetBalance { account, amount } => {
                let previous = self.ledger.set_balance(&account, amount).await;
                let settled = Settled::new(
                    Event::BalanceSet {
                        account: account.clone(),
                        balance: amount,
                    },
                    signed(amount) - signed(previous),
                );
                (Some(account), Ok(settled))
            }
            AdminCommand::AddBalance { account, amount } => {
                let settled = self.ledger.credit(&account, amount).await.map(|balance| {
                    Settled::credit(
                        Event::BalanceSet {
                            account: account.clone(),
                            balance,
                        },
                        amount,
                    )
                });
                (Some(account), settled)
            }
            AdminCommand::RemoveBalance { account, amount } => {
                if amount == 0 {
                    return (Some(account), Err(Rejection::invalid("amount must be positive")));
                }
                let taken = self.ledger.debit_up_to(&account, amount).await;
                let balance = self.ledger.balance(&account).await;
                let settled = Settled::debit(
                    Event::BalanceSet {
                        account: account.clone(),
                        balance,
                    },
                    taken,
                );
                (Some(account), Ok(settled))
            }
            AdminCommand::SetPrice { symbol, price } => {
                let settled = self
                    .market
                    .set_price(&symbol, price)
                    .await
                    .map(|price| Settled::neutral(Event::PriceSet { symbol, price }));
                (None, settled)
            }
            AdminCommand::AdjustHolding {
                account,
                symbol,
                adjustment,
            } => {
                let settled = self
                    .market
                    .adjust_holding(&account, &symbol, adjustment)
                    .await
                    .map(|quantity| {
                        Settled::neutral(Event::HoldingSet {
                            account: account.clone(),
                            symbol,
                            quantity,
                        })
                    });
                (Some(account), settled)
            }
            AdminCommand::GrantItem { account, label } => {
                let label = label.trim().to_string();
                if label.is_empty() {
                    return (Some(account), Err(Rejection::invalid("item label is empty")));
                }
                self.inventory.grant(&account, &label);
                let settled = Settled::neutral(Event::ItemGranted {
                    account: account.clone(),
                    label,
                });
                (Some(account), Ok(settled))
            }
            AdminCommand::GrantBuff {
                account,
                buff,
                duration_secs,
            } => {
                if duration_secs == 0 {
                    return (Some(account), Err(Rejection::invalid("duration must be positive")));
                }
                let expires_at = self.buffs.grant(&account, buff, duration_secs);
                let settled = Settled::neutral(Event::BuffGranted {
                    account: account.clone(),
                    buff,
                    expires_at,
                });
                (Some(account), Ok(settled))
            }
        }
    }
}
