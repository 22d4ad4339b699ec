use crate::{
    casino::{
        BoxTier, BuffKind, ClimbFrame, Color, DuelMove, DuelSnapshot, GameType, Icon, Leaderboard,
        Multiplier, Verdict, Wager, WheelBet, ERROR_COOLDOWN_ACTIVE, ERROR_INSUFFICIENT_FUNDS,
        ERROR_INSUFFICIENT_HOLDINGS, ERROR_INVALID_ARGUMENT, ERROR_NOT_PERMITTED,
        ERROR_NO_SESSION, ERROR_SESSION_OPEN,
    },
    fixed::Decimal,
    market::{HoldingAdjustment, Position, Quantity, Quote, Symbol},
    AccountId, Amount,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Player commands accepted by the core. The caller is passed alongside.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Show a balance and active buffs; defaults to the caller.
    Profile { account: Option<AccountId> },
    Transfer { to: AccountId, amount: Amount },
    Crime,
    Daily,
    Work,
    Leaderboard,

    /// Single-step spin on a colour or number.
    Wheel { wager: Wager, bet: WheelBet },
    /// Single-step pull of three reels.
    Reels { wager: Wager },
    /// Stake and deal a card duel against the house.
    DuelStart { wager: Wager },
    DuelAct { action: DuelMove },
    /// Stake and launch a climb round with a cash-out target.
    ClimbStart { wager: Wager, target: Multiplier },
    /// Advance the open climb presentation by one tick.
    ClimbTick,
    /// Stake and hide the prize under one of the positions.
    PickStart { wager: Wager },
    PickChoose { position: u8 },

    MarketQuotes,
    MarketHistory { symbol: Symbol },
    MarketBuy { symbol: Symbol, quantity: Quantity },
    MarketSell { symbol: Symbol, quantity: Quantity },
    Portfolio,

    OpenBox { tier: BoxTier },
    Inventory,
    GiveItem { to: AccountId, query: String },

    PoolCreate { name: String },
    PoolAddMember { name: String, member: AccountId },
    PoolDeposit { name: String, amount: Amount },
    PoolWithdraw { name: String, amount: Amount },
    PoolBalance { name: String },
}

/// Privileged commands. Authorisation is the dispatcher's responsibility.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminCommand {
    SetBalance { account: AccountId, amount: Amount },
    AddBalance { account: AccountId, amount: Amount },
    /// Removes up to `amount`, clamping the balance at zero.
    RemoveBalance { account: AccountId, amount: Amount },
    SetPrice { symbol: Symbol, price: Decimal },
    AdjustHolding {
        account: AccountId,
        symbol: Symbol,
        adjustment: HoldingAdjustment,
    },
    GrantItem { account: AccountId, label: String },
    GrantBuff {
        account: AccountId,
        buff: BuffKind,
        duration_secs: u64,
    },
}

/// A buff that is still running.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveBuff {
    pub kind: BuffKind,
    pub remaining_secs: u64,
}

/// Result payload of a successful command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    Profile {
        account: AccountId,
        balance: Amount,
        buffs: Vec<ActiveBuff>,
        items: usize,
    },
    Transferred {
        to: AccountId,
        amount: Amount,
    },
    CrimeCommitted {
        success: bool,
        amount: Amount,
    },
    DailyClaimed {
        amount: Amount,
    },
    WorkPaid {
        amount: Amount,
    },
    Leaderboard(Leaderboard),

    WheelSpun {
        bet: WheelBet,
        number: u8,
        color: Color,
        payout: Amount,
    },
    ReelsPulled {
        icons: [Icon; 3],
        payout: Amount,
    },
    DuelDealt(DuelSnapshot),
    DuelAdvanced(DuelSnapshot),
    DuelResolved {
        table: DuelSnapshot,
        verdict: Verdict,
        payout: Amount,
        lucky: bool,
    },
    /// A climb is settled when it launches and `payout` is final. The frames
    /// that follow only replay the ascent; the crash point stays hidden until
    /// the last one.
    ClimbLaunched {
        session: Uuid,
        stake: Amount,
        target: Multiplier,
        payout: Amount,
    },
    ClimbAdvanced(ClimbFrame),
    PickOpened {
        session: Uuid,
        positions: u8,
    },
    PickRevealed {
        chosen: u8,
        winning: u8,
        payout: Amount,
    },

    Quotes(Vec<Quote>),
    History {
        symbol: Symbol,
        points: Vec<Decimal>,
    },
    Bought {
        symbol: Symbol,
        quantity: Decimal,
        cost: Amount,
    },
    Sold {
        symbol: Symbol,
        quantity: Decimal,
        proceeds: Amount,
    },
    Portfolio(Vec<Position>),

    BoxOpened {
        tier: BoxTier,
        reward: String,
        buff: Option<BuffKind>,
    },
    Inventory(Vec<String>),
    ItemGiven {
        to: AccountId,
        item: String,
    },

    PoolCreated {
        name: String,
    },
    PoolMemberAdded {
        name: String,
        member: AccountId,
    },
    PoolBalance {
        name: String,
        balance: Amount,
    },

    BalanceSet {
        account: AccountId,
        balance: Amount,
    },
    PriceSet {
        symbol: Symbol,
        price: Decimal,
    },
    HoldingSet {
        account: AccountId,
        symbol: Symbol,
        quantity: Decimal,
    },
    ItemGranted {
        account: AccountId,
        label: String,
    },
    BuffGranted {
        account: AccountId,
        buff: BuffKind,
        expires_at: u64,
    },
}

/// Successful outcome: the event plus the caller's balance movement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub event: Event,
    /// Net change of the caller's balance caused by the command.
    pub delta: i64,
    /// Caller's balance after the command.
    pub balance: Amount,
}

/// Why a command was refused. A rejected command leaves all state untouched.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("wager {wager} is below the minimum of {minimum}")]
    BelowMinimum { wager: Amount, minimum: Amount },
    #[error("insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds { balance: Amount, required: Amount },
    #[error("insufficient holdings of {symbol}: held {held}, requested {requested}")]
    InsufficientHoldings {
        symbol: Symbol,
        held: Decimal,
        requested: Decimal,
    },
    #[error("unknown symbol {0}")]
    UnknownSymbol(Symbol),
    #[error("no item matches {0:?}")]
    ItemNotFound(String),
    #[error("{action} is on cooldown for {remaining_secs}s")]
    CooldownActive {
        action: String,
        remaining_secs: u64,
    },
    #[error("a {0} session is already open")]
    SessionOpen(GameType),
    #[error("no open {0} session")]
    NoSession(GameType),
    #[error("not permitted: {0}")]
    NotPermitted(String),
}

/// Coarse classification of an outcome for the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    InsufficientFunds,
    InvalidArgument,
    CooldownActive,
    NoSession,
    SessionOpen,
    InsufficientHoldings,
    NotPermitted,
}

impl Rejection {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Rejection::InvalidArgument(_)
            | Rejection::BelowMinimum { .. }
            | Rejection::UnknownSymbol(_)
            | Rejection::ItemNotFound(_) => OutcomeKind::InvalidArgument,
            Rejection::InsufficientFunds { .. } => OutcomeKind::InsufficientFunds,
            Rejection::InsufficientHoldings { .. } => OutcomeKind::InsufficientHoldings,
            Rejection::CooldownActive { .. } => OutcomeKind::CooldownActive,
            Rejection::SessionOpen(_) => OutcomeKind::SessionOpen,
            Rejection::NoSession(_) => OutcomeKind::NoSession,
            Rejection::NotPermitted(_) => OutcomeKind::NotPermitted,
        }
    }

    /// Numeric code for hosts that render errors by number.
    pub fn code(&self) -> u8 {
        match self.kind() {
            OutcomeKind::Success => 0,
            OutcomeKind::InsufficientFunds => ERROR_INSUFFICIENT_FUNDS,
            OutcomeKind::InvalidArgument => ERROR_INVALID_ARGUMENT,
            OutcomeKind::CooldownActive => ERROR_COOLDOWN_ACTIVE,
            OutcomeKind::NoSession => ERROR_NO_SESSION,
            OutcomeKind::SessionOpen => ERROR_SESSION_OPEN,
            OutcomeKind::InsufficientHoldings => ERROR_INSUFFICIENT_HOLDINGS,
            OutcomeKind::NotPermitted => ERROR_NOT_PERMITTED,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Rejection::InvalidArgument(message.into())
    }
}

/// What every command returns.
pub type Outcome = Result<Receipt, Rejection>;

pub fn outcome_kind(outcome: &Outcome) -> OutcomeKind {
    match outcome {
        Ok(_) => OutcomeKind::Success,
        Err(rejection) => rejection.kind(),
    }
}
