use super::{constants::WHEEL_POCKETS, Card};
use crate::{fixed::Decimal, Amount};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use uuid::Uuid;

/// Mini-games offered by the arcade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    Wheel,
    Reels,
    Duel,
    Climb,
    Pick,
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameType::Wheel => "wheel",
            GameType::Reels => "reels",
            GameType::Duel => "duel",
            GameType::Climb => "climb",
            GameType::Pick => "pick",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse {what} from {input:?}")]
pub struct ParseError {
    pub what: &'static str,
    pub input: String,
}

impl ParseError {
    fn new(what: &'static str, input: &str) -> Self {
        Self {
            what,
            input: input.to_string(),
        }
    }
}

/// Amount put at risk by a game, before it is checked against the balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wager {
    /// Stake the whole balance.
    All,
    Amount(Amount),
}

impl FromStr for Wager {
    type Err = ParseError;

    /// Accepts `a`/`all`, a whole number, or a decimal number which is truncated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.eq_ignore_ascii_case("a") || text.eq_ignore_ascii_case("all") {
            return Ok(Wager::All);
        }
        if let Ok(amount) = text.parse::<u64>() {
            return Ok(Wager::Amount(amount));
        }
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 && value < u64::MAX as f64 => {
                Ok(Wager::Amount(value.trunc() as u64))
            }
            _ => Err(ParseError::new("wager", s)),
        }
    }
}

/// Wheel pocket colours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Green,
    Red,
    Black,
}

impl Color {
    /// Zero is green, odd pockets red, even pockets black.
    pub fn of(number: u8) -> Self {
        match number {
            0 => Color::Green,
            n if n % 2 == 1 => Color::Red,
            _ => Color::Black,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::Green => "green",
            Color::Red => "red",
            Color::Black => "black",
        };
        f.write_str(name)
    }
}

/// What a wheel spin is played on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelBet {
    Color(Color),
    Number(u8),
}

impl WheelBet {
    /// Whether the bet names a pocket on the wheel.
    pub fn is_on_wheel(&self) -> bool {
        match self {
            WheelBet::Color(_) => true,
            WheelBet::Number(n) => *n < WHEEL_POCKETS,
        }
    }
}

impl FromStr for WheelBet {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_lowercase();
        let bet = match text.as_str() {
            "green" | "g" => WheelBet::Color(Color::Green),
            "red" | "r" => WheelBet::Color(Color::Red),
            "black" | "b" => WheelBet::Color(Color::Black),
            other => match other.parse::<u8>() {
                Ok(n) if n < WHEEL_POCKETS => WheelBet::Number(n),
                _ => return Err(ParseError::new("wheel bet", s)),
            },
        };
        Ok(bet)
    }
}

/// Symbols on the reels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Cherry,
    Lemon,
    Grape,
    Bell,
    Diamond,
    Seven,
}

impl Icon {
    pub const ALL: [Icon; 6] = [
        Icon::Cherry,
        Icon::Lemon,
        Icon::Grape,
        Icon::Bell,
        Icon::Diamond,
        Icon::Seven,
    ];
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let glyph = match self {
            Icon::Cherry => "🍒",
            Icon::Lemon => "🍋",
            Icon::Grape => "🍇",
            Icon::Bell => "🔔",
            Icon::Diamond => "💎",
            Icon::Seven => "7️⃣",
        };
        f.write_str(glyph)
    }
}

/// Player decisions during a card duel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelMove {
    Hit,
    Stand,
}

impl FromStr for DuelMove {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hit" | "h" => Ok(DuelMove::Hit),
            "stand" | "s" => Ok(DuelMove::Stand),
            _ => Err(ParseError::new("duel move", s)),
        }
    }
}

/// Card duel lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelStage {
    Dealt,
    PlayerActing,
    DealerActing,
    Busted,
    Resolved,
}

impl DuelStage {
    pub fn is_final(self) -> bool {
        matches!(self, DuelStage::Busted | DuelStage::Resolved)
    }
}

/// How a duel ended, in precedence order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Natural,
    Win,
    Push,
    Loss,
    Bust,
}

/// Table view of a duel. The dealer's hole card is withheld until the dealer acts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelSnapshot {
    pub session: Uuid,
    pub stake: Amount,
    pub stage: DuelStage,
    pub player: Vec<Card>,
    pub player_total: u8,
    pub dealer: Vec<Card>,
    pub dealer_total: u8,
    pub dealer_hidden: bool,
}

/// Climb multiplier in hundredths (`150` is 1.50x).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Multiplier(u32);

impl Multiplier {
    pub const ONE: Multiplier = Multiplier(100);

    pub const fn from_hundredths(hundredths: u32) -> Self {
        Multiplier(hundredths)
    }

    pub const fn hundredths(self) -> u32 {
        self.0
    }

    /// Gross payout for a stake at this multiplier, rounded down.
    pub fn apply(self, stake: Amount) -> Amount {
        (stake as u128 * self.0 as u128 / 100).min(u64::MAX as u128) as u64
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}x", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Multiplier {
    type Err = ParseError;

    /// Accepts `2`, `2.5` or `2.50x`; precision beyond hundredths is dropped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().trim_end_matches(['x', 'X']);
        let value: Decimal = text
            .parse()
            .map_err(|_| ParseError::new("multiplier", s))?;
        if value.is_negative() {
            return Err(ParseError::new("multiplier", s));
        }
        let hundredths = u32::try_from(value.raw() / 100)
            .map_err(|_| ParseError::new("multiplier", s))?;
        Ok(Multiplier(hundredths))
    }
}

/// Climb presentation phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClimbPhase {
    Climbing,
    CashedOut,
    Crashed,
}

/// One presentation update of a climb round. The crash point is only revealed
/// once the round has ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClimbFrame {
    pub session: Uuid,
    pub multiplier: Multiplier,
    pub phase: ClimbPhase,
    pub crash_point: Option<Multiplier>,
}

impl ClimbFrame {
    pub fn is_final(&self) -> bool {
        self.phase != ClimbPhase::Climbing
    }
}
