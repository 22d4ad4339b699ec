//! Simulated asset market.
//!
//! Prices follow a bounded multiplicative random walk advanced by a background
//! loop. Buying and selling settle against the [Ledger] while the market lock is
//! held; the lock order is always market, then ledger.

use crate::{
    casino::GameRng,
    clock::Clock,
    ledger::Ledger,
    state::{self, Domain, Store},
};
use arcade_types::{
    execution::Rejection,
    fixed::Decimal,
    market::{HoldingAdjustment, Position, Quantity, Quote, Symbol},
    AccountId, Amount,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, VecDeque},
    sync::Arc,
    time::Duration,
};
use tokio::{
    sync::{watch, Mutex},
    time::MissedTickBehavior,
};
use tracing::{debug, info};

const SECONDS_PER_DAY: u64 = 86_400;

/// Assets listed when nothing has been persisted yet.
pub const SEED_ASSETS: [(&str, i64); 3] = [("RSC", 100), ("CTC", 200), ("MMC", 50)];

/// Bounds of the per-tick relative price change.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriftRange {
    pub low: f64,
    pub high: f64,
}

impl DriftRange {
    pub fn symmetric(spread: f64) -> Self {
        Self {
            low: -spread,
            high: spread,
        }
    }
}

/// How the random walk picks its range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftProfile {
    /// Same range every day.
    Constant(DriftRange),
    /// Separate ranges for Monday-Friday and the weekend (UTC).
    Weekly {
        weekday: DriftRange,
        weekend: DriftRange,
    },
}

impl Default for DriftProfile {
    fn default() -> Self {
        DriftProfile::Constant(DriftRange::symmetric(0.08))
    }
}

/// True on Saturday and Sunday, UTC.
pub fn is_weekend(unix_secs: u64) -> bool {
    // 1970-01-01 was a Thursday; Monday is day 0.
    let weekday = (unix_secs / SECONDS_PER_DAY + 3) % 7;
    weekday >= 5
}

impl DriftProfile {
    pub fn range_at(&self, unix_secs: u64) -> DriftRange {
        match self {
            DriftProfile::Constant(range) => *range,
            DriftProfile::Weekly { weekday, weekend } => {
                if is_weekend(unix_secs) {
                    *weekend
                } else {
                    *weekday
                }
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct MarketConfig {
    pub period: Duration,
    pub history_capacity: usize,
    pub floor: Decimal,
    pub drift: DriftProfile,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(300),
            history_capacity: 288,
            floor: Decimal::ONE,
            drift: DriftProfile::default(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Asset {
    price: Decimal,
    #[serde(default)]
    history: VecDeque<Decimal>,
}

/// Persisted layout: one entry per symbol plus a `holders` map.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Book {
    #[serde(default)]
    holders: BTreeMap<AccountId, BTreeMap<Symbol, Decimal>>,
    #[serde(flatten)]
    assets: BTreeMap<Symbol, Asset>,
}

impl Book {
    fn asset_mut(&mut self, symbol: &Symbol) -> Result<&mut Asset, Rejection> {
        self.assets
            .get_mut(symbol)
            .ok_or_else(|| Rejection::UnknownSymbol(symbol.clone()))
    }

    fn asset(&self, symbol: &Symbol) -> Result<&Asset, Rejection> {
        self.assets
            .get(symbol)
            .ok_or_else(|| Rejection::UnknownSymbol(symbol.clone()))
    }

    fn held(&self, account: &AccountId, symbol: &Symbol) -> Decimal {
        self.holders
            .get(account)
            .and_then(|positions| positions.get(symbol))
            .copied()
            .unwrap_or_default()
    }

    fn set_held(&mut self, account: &AccountId, symbol: &Symbol, quantity: Decimal) {
        let positions = self.holders.entry(account.clone()).or_default();
        if quantity.is_positive() {
            positions.insert(symbol.clone(), quantity);
        } else {
            positions.remove(symbol);
        }
        if positions.is_empty() {
            self.holders.remove(account);
        }
    }
}

impl Asset {
    fn record(&mut self, price: Decimal, capacity: usize) {
        self.price = price;
        self.history.push_back(price);
        while self.history.len() > capacity {
            self.history.pop_front();
        }
    }
}

pub struct Market {
    book: Mutex<Book>,
    ledger: Arc<Ledger>,
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    config: MarketConfig,
}

fn positive(quantity: Decimal) -> Result<Decimal, Rejection> {
    if !quantity.is_positive() {
        return Err(Rejection::invalid("quantity must be positive"));
    }
    Ok(quantity)
}

impl Market {
    /// Restore the market, listing the seed assets on first start.
    pub fn load(
        config: MarketConfig,
        ledger: Arc<Ledger>,
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut book: Book = state::load(store.as_ref(), Domain::Market);
        if book.assets.is_empty() {
            for (ticker, price) in SEED_ASSETS {
                book.assets.insert(
                    Symbol::new(ticker),
                    Asset {
                        price: Decimal::from_int(price),
                        history: VecDeque::new(),
                    },
                );
            }
            state::save(store.as_ref(), Domain::Market, &book);
        }
        info!(
            assets = book.assets.len(),
            holders = book.holders.len(),
            "loaded market"
        );
        Self {
            book: Mutex::new(book),
            ledger,
            store,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    fn persist(&self, book: &Book) {
        state::save(self.store.as_ref(), Domain::Market, book);
    }

    /// Advance every price by one step of the random walk.
    pub async fn tick(&self, rng: &mut GameRng) -> Vec<Quote> {
        let range = self.config.drift.range_at(self.clock.now());
        let mut book = self.book.lock().await;
        for (symbol, asset) in book.assets.iter_mut() {
            let change = Decimal::from_f64(rng.uniform(range.low, range.high));
            let moved = asset.price + asset.price * change;
            let price = moved.round_dp(2).max(self.config.floor);
            asset.record(price, self.config.history_capacity);
            debug!(%symbol, %price, "price moved");
        }
        self.persist(&book);
        quotes(&book)
    }

    /// Tick every period until `shutdown` fires. The first tick is immediate.
    pub async fn run(self: Arc<Self>, mut rng: GameRng, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.config.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period = ?self.config.period, "market loop started");
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let quotes = self.tick(&mut rng).await;
                    debug!(assets = quotes.len(), "market ticked");
                }
                _ = shutdown.changed() => {
                    info!("market loop stopped");
                    return;
                }
            }
        }
    }

    pub async fn quotes(&self) -> Vec<Quote> {
        quotes(&*self.book.lock().await)
    }

    pub async fn history(&self, symbol: &Symbol) -> Result<Vec<Decimal>, Rejection> {
        let book = self.book.lock().await;
        Ok(book.asset(symbol)?.history.iter().copied().collect())
    }

    pub async fn holding(&self, account: &AccountId, symbol: &Symbol) -> Decimal {
        self.book.lock().await.held(account, symbol)
    }

    /// Buy at the current price. Cost is rounded up to whole points.
    ///
    /// `Quantity::Max` buys the largest quantity (to 4 decimals) the balance
    /// covers. Returns the quantity bought and its cost.
    pub async fn buy(
        &self,
        account: &AccountId,
        symbol: &Symbol,
        quantity: Quantity,
    ) -> Result<(Decimal, Amount), Rejection> {
        let mut book = self.book.lock().await;
        let price = book.asset(symbol)?.price;
        let quantity = match quantity {
            Quantity::Units(units) => positive(units)?,
            Quantity::Max => {
                let balance = self.ledger.balance(account).await;
                let affordable = (Decimal::from_units(balance) / price).floor_dp(4);
                if !affordable.is_positive() {
                    return Err(Rejection::InsufficientFunds {
                        balance,
                        required: price.ceil_units(),
                    });
                }
                affordable
            }
        };
        let Some(cost) = price.checked_mul(quantity).map(Decimal::ceil_units) else {
            return Err(Rejection::InsufficientFunds {
                balance: self.ledger.balance(account).await,
                required: Amount::MAX,
            });
        };
        self.ledger.withdraw(account, cost).await?;

        let held = book.held(account, symbol);
        book.set_held(account, symbol, held + quantity);
        self.persist(&book);
        info!(%account, %symbol, %quantity, cost, "bought");
        Ok((quantity, cost))
    }

    /// Sell at the current price. Proceeds are rounded down to whole points.
    ///
    /// `Quantity::Max` sells the whole position.
    pub async fn sell(
        &self,
        account: &AccountId,
        symbol: &Symbol,
        quantity: Quantity,
    ) -> Result<(Decimal, Amount), Rejection> {
        let mut book = self.book.lock().await;
        let price = book.asset(symbol)?.price;
        let held = book.held(account, symbol);
        let quantity = match quantity {
            Quantity::Units(units) => positive(units)?,
            Quantity::Max => held,
        };
        if !quantity.is_positive() || quantity > held {
            return Err(Rejection::InsufficientHoldings {
                symbol: symbol.clone(),
                held,
                requested: quantity,
            });
        }

        book.set_held(account, symbol, held - quantity);
        self.persist(&book);
        let proceeds = (price * quantity).floor_units();
        if proceeds > 0 {
            self.ledger.credit(account, proceeds).await?;
        }
        info!(%account, %symbol, %quantity, proceeds, "sold");
        Ok((quantity, proceeds))
    }

    /// Non-empty positions of an account, valued at current prices.
    pub async fn portfolio(&self, account: &AccountId) -> Vec<Position> {
        let book = self.book.lock().await;
        let Some(positions) = book.holders.get(account) else {
            return Vec::new();
        };
        positions
            .iter()
            .filter(|(_, quantity)| quantity.is_positive())
            .filter_map(|(symbol, quantity)| {
                let price = book.assets.get(symbol)?.price;
                Some(Position {
                    symbol: symbol.clone(),
                    quantity: *quantity,
                    price,
                    value: (price * *quantity).round_dp(2),
                })
            })
            .collect()
    }

    /// Administrative price override, recorded in the history like a tick.
    pub async fn set_price(&self, symbol: &Symbol, price: Decimal) -> Result<Decimal, Rejection> {
        let price = price.round_dp(2);
        if !price.is_positive() {
            return Err(Rejection::invalid("price must be positive"));
        }
        let mut book = self.book.lock().await;
        book.asset_mut(symbol)?
            .record(price, self.config.history_capacity);
        self.persist(&book);
        info!(%symbol, %price, "price set");
        Ok(price)
    }

    /// Administrative change to a holder's position. Returns the new quantity.
    pub async fn adjust_holding(
        &self,
        account: &AccountId,
        symbol: &Symbol,
        adjustment: HoldingAdjustment,
    ) -> Result<Decimal, Rejection> {
        let mut book = self.book.lock().await;
        book.asset(symbol)?;
        let held = book.held(account, symbol);
        let updated = match adjustment {
            HoldingAdjustment::Add(quantity) => held + positive(quantity)?,
            HoldingAdjustment::Remove(quantity) => (held - positive(quantity)?).max(Decimal::ZERO),
            HoldingAdjustment::Set(quantity) => {
                if quantity.is_negative() {
                    return Err(Rejection::invalid("quantity cannot be negative"));
                }
                quantity
            }
        };
        book.set_held(account, symbol, updated);
        self.persist(&book);
        info!(%account, %symbol, quantity = %updated, "holding adjusted");
        Ok(updated)
    }
}

fn quotes(book: &Book) -> Vec<Quote> {
    book.assets
        .iter()
        .map(|(symbol, asset)| Quote {
            symbol: symbol.clone(),
            price: asset.price,
            opening: asset.history.front().copied().unwrap_or(asset.price),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mocks::ManualClock, state::Memory};

    fn market(config: MarketConfig) -> (Arc<Ledger>, Arc<Memory>, Market) {
        let store = Arc::new(Memory::default());
        let ledger = Arc::new(Ledger::load(store.clone()));
        let clock = Arc::new(ManualClock::new(0));
        let market = Market::load(config, ledger.clone(), store.clone(), clock);
        (ledger, store, market)
    }

    fn units(text: &str) -> Quantity {
        Quantity::Units(text.parse().unwrap())
    }

    #[tokio::test]
    async fn test_seeded_assets() {
        let (_, _, market) = market(MarketConfig::default());
        let quotes = market.quotes().await;
        let listed: Vec<_> = quotes
            .iter()
            .map(|q| (q.symbol.as_str().to_string(), q.price))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("CTC".to_string(), Decimal::from_int(200)),
                ("MMC".to_string(), Decimal::from_int(50)),
                ("RSC".to_string(), Decimal::from_int(100)),
            ]
        );
    }

    #[tokio::test]
    async fn test_ticks_respect_floor_and_capacity() {
        let config = MarketConfig {
            history_capacity: 5,
            drift: DriftProfile::Constant(DriftRange { low: -0.9, high: 0.0 }),
            ..MarketConfig::default()
        };
        let (_, _, market) = market(config);
        let mut rng = GameRng::seeded(3);
        for _ in 0..50 {
            for quote in market.tick(&mut rng).await {
                assert!(quote.price >= Decimal::ONE);
                // Rounded to cents.
                assert_eq!(quote.price.raw() % 100, 0);
            }
        }
        let history = market.history(&Symbol::new("rsc")).await.unwrap();
        assert_eq!(history.len(), 5);
        assert!(history.iter().all(|p| *p >= Decimal::ONE));
    }

    #[tokio::test]
    async fn test_sub_cent_floor_keeps_prices_positive() {
        let floor: Decimal = "0.001".parse().unwrap();
        let config = MarketConfig {
            floor,
            drift: DriftProfile::Constant(DriftRange { low: -0.9, high: -0.8 }),
            ..MarketConfig::default()
        };
        let (_, _, market) = market(config);
        let rsc = Symbol::new("RSC");
        market
            .set_price(&rsc, "0.01".parse().unwrap())
            .await
            .unwrap();

        let mut rng = GameRng::seeded(5);
        for _ in 0..3 {
            for quote in market.tick(&mut rng).await {
                assert!(quote.price.is_positive());
            }
        }
        let history = market.history(&rsc).await.unwrap();
        assert_eq!(history.last(), Some(&floor));
    }

    #[tokio::test]
    async fn test_buy_and_sell_settle_against_ledger() {
        let (ledger, _, market) = market(MarketConfig::default());
        let alice = AccountId::from("alice");
        let rsc = Symbol::new("RSC");
        ledger.credit(&alice, 1_000).await.unwrap();

        assert_eq!(market.buy(&alice, &rsc, units("2.5")).await.unwrap().1, 250);
        assert_eq!(ledger.balance(&alice).await, 750);

        let sold = market.sell(&alice, &rsc, units("1")).await.unwrap();
        assert_eq!(sold.1, 100);
        assert_eq!(ledger.balance(&alice).await, 850);
        assert_eq!(market.holding(&alice, &rsc).await, "1.5".parse::<Decimal>().unwrap());

        assert!(matches!(
            market.sell(&alice, &rsc, units("2")).await,
            Err(Rejection::InsufficientHoldings { .. })
        ));
        assert!(matches!(
            market.buy(&alice, &rsc, units("100")).await,
            Err(Rejection::InsufficientFunds { .. })
        ));
        assert!(matches!(
            market.buy(&alice, &Symbol::new("DOGE"), units("1")).await,
            Err(Rejection::UnknownSymbol(_))
        ));
        assert_eq!(ledger.balance(&alice).await, 850);
    }

    #[tokio::test]
    async fn test_buy_max_uses_current_balance_and_price() {
        let (ledger, _, market) = market(MarketConfig::default());
        let alice = AccountId::from("alice");
        let ctc = Symbol::new("CTC");
        market.set_price(&ctc, "300".parse().unwrap()).await.unwrap();
        ledger.credit(&alice, 1_000).await.unwrap();

        let (quantity, cost) = market.buy(&alice, &ctc, Quantity::Max).await.unwrap();
        assert_eq!(quantity, "3.3333".parse::<Decimal>().unwrap());
        assert_eq!(cost, 1_000);
        assert_eq!(ledger.balance(&alice).await, 0);

        assert!(matches!(
            market.buy(&alice, &ctc, Quantity::Max).await,
            Err(Rejection::InsufficientFunds { .. })
        ));

        let (sold, _) = market.sell(&alice, &ctc, Quantity::Max).await.unwrap();
        assert_eq!(sold, quantity);
        assert!(market.portfolio(&alice).await.is_empty());
    }

    #[tokio::test]
    async fn test_admin_overrides() {
        let (_, store, market) = market(MarketConfig::default());
        let bob = AccountId::from("bob");
        let mmc = Symbol::new("MMC");

        assert_eq!(
            market.set_price(&mmc, "12.345".parse().unwrap()).await,
            Ok("12.35".parse::<Decimal>().unwrap())
        );
        assert!(market.set_price(&mmc, Decimal::ZERO).await.is_err());
        assert_eq!(
            market.history(&mmc).await.unwrap(),
            vec!["12.35".parse::<Decimal>().unwrap()]
        );

        let add = HoldingAdjustment::Add("4".parse().unwrap());
        assert_eq!(market.adjust_holding(&bob, &mmc, add).await.unwrap(), Decimal::from_int(4));
        let remove = HoldingAdjustment::Remove("10".parse().unwrap());
        assert_eq!(market.adjust_holding(&bob, &mmc, remove).await.unwrap(), Decimal::ZERO);
        let set = HoldingAdjustment::Set("2".parse().unwrap());
        market.adjust_holding(&bob, &mmc, set).await.unwrap();

        let portfolio = market.portfolio(&bob).await;
        assert_eq!(portfolio.len(), 1);
        assert_eq!(portfolio[0].value, "24.70".parse::<Decimal>().unwrap());

        // Prices and holdings survive a reload.
        let ledger = Arc::new(Ledger::load(store.clone()));
        let reloaded = Market::load(
            MarketConfig::default(),
            ledger,
            store,
            Arc::new(ManualClock::new(0)),
        );
        assert_eq!(reloaded.holding(&bob, &mmc).await, Decimal::from_int(2));
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let config = MarketConfig {
            period: Duration::from_millis(5),
            ..MarketConfig::default()
        };
        let (_, _, market) = market(config);
        let market = Arc::new(market);
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(market.clone().run(GameRng::seeded(1), rx));

        tokio::time::sleep(Duration::from_millis(30)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();
        assert!(!market.history(&Symbol::new("RSC")).await.unwrap().is_empty());
    }

    #[test]
    fn test_weekend_detection() {
        // 1970-01-03 was a Saturday, 1970-01-05 a Monday.
        assert!(is_weekend(2 * SECONDS_PER_DAY));
        assert!(is_weekend(3 * SECONDS_PER_DAY + 100));
        assert!(!is_weekend(4 * SECONDS_PER_DAY));
        assert!(!is_weekend(0));

        let profile = DriftProfile::Weekly {
            weekday: DriftRange::symmetric(0.05),
            weekend: DriftRange::symmetric(0.10),
        };
        assert_eq!(profile.range_at(2 * SECONDS_PER_DAY).high, 0.10);
        assert_eq!(profile.range_at(0).high, 0.05);
    }
}
