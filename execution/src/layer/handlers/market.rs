use super::super::*;
use arcade_types::market::{Quantity, Symbol};

impl Layer {
    // === Market Handler Methods ===

    pub(in crate::layer) async fn handle_quotes(&self) -> Result<Settled, Rejection> {
        Ok(Settled::neutral(Event::Quotes(self.market.quotes().await)))
    }

    pub(in crate::layer) async fn handle_history(
        &self,
        symbol: &Symbol,
    ) -> Result<Settled, Rejection> {
        let points = self.market.history(symbol).await?;
        Ok(Settled::neutral(Event::History {
            symbol: symbol.clone(),
            points,
        }))
    }

    pub(in crate::layer) async fn handle_buy(
        &self,
        caller: &AccountId,
        symbol: &Symbol,
        quantity: Quantity,
    ) -> Result<Settled, Rejection> {
        let (quantity, cost) = self.market.buy(caller, symbol, quantity).await?;
        Ok(Settled::debit(
            Event::Bought {
                symbol: symbol.clone(),
                quantity,
                cost,
            },
            cost,
        ))
    }

    pub(in crate::layer) async fn handle_sell(
        &self,
        caller: &AccountId,
        symbol: &Symbol,
        quantity: Quantity,
    ) -> Result<Settled, Rejection> {
        let (quantity, proceeds) = self.market.sell(caller, symbol, quantity).await?;
        Ok(Settled::credit(
            Event::Sold {
                symbol: symbol.clone(),
                quantity,
                proceeds,
            },
            proceeds,
        ))
    }

    pub(in crate::layer) async fn handle_portfolio(
        &self,
        caller: &AccountId,
    ) -> Result<Settled, Rejection> {
        Ok(Settled::neutral(Event::Portfolio(
            self.market.portfolio(caller).await,
        )))
    }
}
