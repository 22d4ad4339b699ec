use super::{BOOST_DURATION_SECS, LUCK_DURATION_SECS};
use crate::Amount;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Timed modifiers that alter game outcomes while active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuffKind {
    /// Winning payouts are multiplied by 1.25.
    PayoutBoost,
    /// Duel wins are scaled to 70% and losses get a chance at a scaled win.
    DealerLuck,
}

impl BuffKind {
    pub const ALL: [BuffKind; 2] = [BuffKind::PayoutBoost, BuffKind::DealerLuck];

    /// Key under which the buff is stored in the timer registry.
    pub fn key(self) -> &'static str {
        match self {
            BuffKind::PayoutBoost => "payout_boost",
            BuffKind::DealerLuck => "dealer_luck",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    pub fn default_duration_secs(self) -> u64 {
        match self {
            BuffKind::PayoutBoost => BOOST_DURATION_SECS,
            BuffKind::DealerLuck => LUCK_DURATION_SECS,
        }
    }
}

/// Mystery box tiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxTier {
    Normal,
    Rare,
    Crazy,
}

/// What opening a box grants besides the stored label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardEffect {
    /// Stored in the inventory only.
    Item,
    /// Arms the buff instead of storing an item.
    Buff(BuffKind),
    /// Stored in the inventory and arms the buff.
    ItemWithBuff(BuffKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reward {
    pub label: &'static str,
    pub weight: u32,
    pub effect: RewardEffect,
}

const fn item(label: &'static str, weight: u32) -> Reward {
    Reward {
        label,
        weight,
        effect: RewardEffect::Item,
    }
}

const NORMAL_REWARDS: [Reward; 4] = [
    Reward {
        label: "Hen",
        weight: 50,
        effect: RewardEffect::Buff(BuffKind::PayoutBoost),
    },
    item("Stone – 30 CTC", 25),
    item("Lion – 40,000 coins", 15),
    item("Turtle – 40% OFF (buy 40+ levels)", 10),
];

const RARE_REWARDS: [Reward; 4] = [
    item("Toilet – 3 tickets + 15 MMC", 40),
    item("Firefighter – Role coupon + 20,000", 30),
    Reward {
        label: "Lady – x2 duel luck (70% payout)",
        weight: 20,
        effect: RewardEffect::ItemWithBuff(BuffKind::DealerLuck),
    },
    item("Lemon – Create a crypto + 40,000", 10),
];

const CRAZY_REWARDS: [Reward; 4] = [
    item("Mango – 80 levels + 90,000", 30),
    item("Seal – Break 2 rules + 50,000 + 30 CTC", 30),
    item("Violet Circle – Hall of Fame + 60,000", 35),
    item(
        "Gold Bar – 150,000 + x4 Crypto + Role + 1h Timeout + 100 levels",
        5,
    ),
];

impl BoxTier {
    pub const ALL: [BoxTier; 3] = [BoxTier::Normal, BoxTier::Rare, BoxTier::Crazy];

    pub fn price(self) -> Amount {
        match self {
            BoxTier::Normal => 30_000,
            BoxTier::Rare => 60_000,
            BoxTier::Crazy => 100_000,
        }
    }

    pub fn rewards(self) -> &'static [Reward] {
        match self {
            BoxTier::Normal => &NORMAL_REWARDS,
            BoxTier::Rare => &RARE_REWARDS,
            BoxTier::Crazy => &CRAZY_REWARDS,
        }
    }
}

impl fmt::Display for BoxTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoxTier::Normal => "normal",
            BoxTier::Rare => "rare",
            BoxTier::Crazy => "crazy",
        };
        f.write_str(name)
    }
}

impl FromStr for BoxTier {
    type Err = super::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(BoxTier::Normal),
            "rare" | "rara" => Ok(BoxTier::Rare),
            "crazy" => Ok(BoxTier::Crazy),
            _ => Err(super::ParseError {
                what: "box tier",
                input: s.to_string(),
            }),
        }
    }
}
