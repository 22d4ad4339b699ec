//! The service object every command goes through.
//!
//! A [Layer] is built once at start-up and shared by reference. [Layer::execute]
//! matches the closed [Command] set exhaustively and dispatches to a handler in
//! `handlers/`; each handler reports its event and the caller's balance change.

use crate::{
    casino::{blackjack::Duel, climb::Climb, pick::Pick, sessions::{Expiry, SessionTable}, GameError, GameRng},
    clock::Clock,
    effects::Buffs,
    inventory::Inventory,
    ledger::Ledger,
    market::{Market, MarketConfig},
    pools::SharedPools,
    state::Store,
    timers::Timers,
};
use arcade_types::{
    casino::{
        GameType, CLIMB_WINDOW_SECS, DUEL_WINDOW_SECS, MIN_WAGER, PICK_POSITIONS, PICK_WINDOW_SECS,
    },
    execution::{AdminCommand, Command, Event, Outcome, Receipt, Rejection},
    AccountId, Amount,
};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

mod handlers;

/// Tunables of the game engines.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub min_wager: Amount,
    pub duel_window_secs: u64,
    pub pick_window_secs: u64,
    pub pick_positions: u8,
    pub climb_window_secs: u64,
    pub market: MarketConfig,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            min_wager: MIN_WAGER,
            duel_window_secs: DUEL_WINDOW_SECS,
            pick_window_secs: PICK_WINDOW_SECS,
            pick_positions: PICK_POSITIONS,
            climb_window_secs: CLIMB_WINDOW_SECS,
            market: MarketConfig::default(),
        }
    }
}

/// What a handler produced: the event and the signed change of the caller's balance.
pub(crate) struct Settled {
    event: Event,
    delta: i64,
}

impl Settled {
    fn new(event: Event, delta: i64) -> Self {
        Self { event, delta }
    }

    fn neutral(event: Event) -> Self {
        Self::new(event, 0)
    }

    fn credit(event: Event, amount: Amount) -> Self {
        Self::new(event, signed(amount))
    }

    fn debit(event: Event, amount: Amount) -> Self {
        Self::new(event, -signed(amount))
    }
}

fn signed(amount: Amount) -> i64 {
    i64::try_from(amount).unwrap_or(i64::MAX)
}

fn game_rejection(game: GameType, error: GameError) -> Rejection {
    match error {
        GameError::InvalidMove => Rejection::invalid(format!("invalid {game} move")),
        GameError::GameAlreadyComplete => Rejection::NoSession(game),
        GameError::DeckExhausted => Rejection::invalid("deck exhausted"),
    }
}

pub struct Layer {
    config: LayerConfig,
    clock: Arc<dyn Clock>,
    ledger: Arc<Ledger>,
    cooldowns: Timers,
    buffs: Buffs,
    inventory: Inventory,
    market: Arc<Market>,
    pools: SharedPools,
    duels: SessionTable<Duel>,
    climbs: SessionTable<Climb>,
    picks: SessionTable<Pick>,
    rng: Mutex<GameRng>,
}

impl Layer {
    /// Restore every persisted domain from `store` and wire the services together.
    pub fn load(
        config: LayerConfig,
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
        rng: GameRng,
    ) -> Self {
        let ledger = Arc::new(Ledger::load(store.clone()));
        let market = Arc::new(Market::load(
            config.market.clone(),
            ledger.clone(),
            store.clone(),
            clock.clone(),
        ));
        let duels = SessionTable::new(
            GameType::Duel,
            config.duel_window_secs,
            Expiry::Inactivity,
            clock.clone(),
        );
        let climbs = SessionTable::new(
            GameType::Climb,
            config.climb_window_secs,
            Expiry::Inactivity,
            clock.clone(),
        );
        let picks = SessionTable::new(
            GameType::Pick,
            config.pick_window_secs,
            Expiry::Fixed,
            clock.clone(),
        );
        Self {
            cooldowns: Timers::volatile(clock.clone()),
            buffs: Buffs::load(clock.clone(), store.clone()),
            inventory: Inventory::load(store.clone()),
            pools: SharedPools::load(ledger.clone(), store),
            config,
            clock,
            ledger,
            market,
            duels,
            climbs,
            picks,
            rng: Mutex::new(rng),
        }
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    pub fn market(&self) -> &Arc<Market> {
        &self.market
    }

    pub fn buffs(&self) -> &Buffs {
        &self.buffs
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Independent generator for one game or background task.
    pub fn fork_rng(&self) -> GameRng {
        self.rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .fork()
    }

    /// Run a player command on behalf of `caller`.
    pub async fn execute(&self, caller: &AccountId, command: Command) -> Outcome {
        debug!(%caller, ?command, "executing");
        let settled = match command {
            Command::Profile { account } => self.handle_profile(caller, account).await,
            Command::Transfer { to, amount } => self.handle_transfer(caller, &to, amount).await,
            Command::Crime => self.handle_crime(caller).await,
            Command::Daily => self.handle_daily(caller).await,
            Command::Work => self.handle_work(caller).await,
            Command::Leaderboard => self.handle_leaderboard().await,

            Command::Wheel { wager, bet } => self.handle_wheel(caller, wager, bet).await,
            Command::Reels { wager } => self.handle_reels(caller, wager).await,
            Command::DuelStart { wager } => self.handle_duel_start(caller, wager).await,
            Command::DuelAct { action } => self.handle_duel_act(caller, action).await,
            Command::ClimbStart { wager, target } => {
                self.handle_climb_start(caller, wager, target).await
            }
            Command::ClimbTick => self.handle_climb_tick(caller),
            Command::PickStart { wager } => self.handle_pick_start(caller, wager).await,
            Command::PickChoose { position } => self.handle_pick_choose(caller, position).await,

            Command::MarketQuotes => self.handle_quotes().await,
            Command::MarketHistory { symbol } => self.handle_history(&symbol).await,
            Command::MarketBuy { symbol, quantity } => {
                self.handle_buy(caller, &symbol, quantity).await
            }
            Command::MarketSell { symbol, quantity } => {
                self.handle_sell(caller, &symbol, quantity).await
            }
            Command::Portfolio => self.handle_portfolio(caller).await,

            Command::OpenBox { tier } => self.handle_open_box(caller, tier).await,
            Command::Inventory => self.handle_inventory(caller),
            Command::GiveItem { to, query } => self.handle_give_item(caller, &to, &query),

            Command::PoolCreate { name } => self.handle_pool_create(caller, &name),
            Command::PoolAddMember { name, member } => {
                self.handle_pool_add_member(caller, &name, &member)
            }
            Command::PoolDeposit { name, amount } => {
                self.handle_pool_deposit(caller, &name, amount).await
            }
            Command::PoolWithdraw { name, amount } => {
                self.handle_pool_withdraw(caller, &name, amount).await
            }
            Command::PoolBalance { name } => self.handle_pool_balance(caller, &name).await,
        };
        self.receipt(caller, settled).await
    }

    /// Run a privileged command. The receipt reflects the affected account.
    pub async fn administer(&self, command: AdminCommand) -> Outcome {
        info!(?command, "administering");
        let (account, settled) = self.handle_admin(command).await;
        match account {
            Some(account) => self.receipt(&account, settled).await,
            None => settled.map(|settled| Receipt {
                event: settled.event,
                delta: settled.delta,
                balance: 0,
            }),
        }
    }

    async fn receipt(
        &self,
        account: &AccountId,
        settled: Result<Settled, Rejection>,
    ) -> Outcome {
        match settled {
            Ok(Settled { event, delta }) => Ok(Receipt {
                event,
                delta,
                balance: self.ledger.balance(account).await,
            }),
            Err(rejection) => {
                debug!(%account, %rejection, "rejected");
                Err(rejection)
            }
        }
    }

    /// Credit a game payout after applying the payout boost. Returns what was paid.
    async fn pay_out(&self, account: &AccountId, stake: Amount, payout: Amount) -> Amount {
        let payout = self.buffs.boost(account, payout, stake);
        if payout == 0 {
            return 0;
        }
        if let Err(e) = self.ledger.credit(account, payout).await {
            warn!(%account, payout, error = %e, "failed to credit payout");
            return 0;
        }
        payout
    }

    /// Discard expired game sessions. Returns how many were dropped.
    pub fn reap_sessions(&self) -> usize {
        self.duels.reap() + self.climbs.reap() + self.picks.reap()
    }

    /// Reap expired sessions every `interval` until `shutdown` fires.
    pub async fn run_reaper(
        self: Arc<Self>,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(interval);
        info!(?interval, "session reaper started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let reaped = self.reap_sessions();
                    if reaped > 0 {
                        debug!(reaped, "reaped sessions");
                    }
                }
                _ = shutdown.changed() => {
                    info!("session reaper stopped");
                    return;
                }
            }
        }
    }
}
