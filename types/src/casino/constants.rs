/// Smallest accepted wager, in points.
pub const MIN_WAGER: u64 = 10;

/// Smallest accepted balance transfer, in points.
pub const MIN_TRANSFER: u64 = 10;

/// Number of accounts shown on the leaderboard.
pub const LEADERBOARD_SIZE: usize = 10;

// Wheel payouts are gross multiples of the stake.
pub const WHEEL_POCKETS: u8 = 37;
pub const WHEEL_COLOR_MULTIPLIER: u64 = 2;
pub const WHEEL_GREEN_MULTIPLIER: u64 = 35;
pub const WHEEL_NUMBER_MULTIPLIER: u64 = 36;

// Reels pay 5x on three of a kind and 1.5x on a pair.
pub const REELS_TRIPLE_MULTIPLIER: u64 = 5;
pub const REELS_PAIR_NUMERATOR: u64 = 3;
pub const REELS_PAIR_DENOMINATOR: u64 = 2;

/// Dealer keeps drawing while below this total.
pub const DEALER_STANDS_ON: u8 = 17;
/// Natural pays 5/2 of the stake.
pub const NATURAL_NUMERATOR: u64 = 5;
pub const NATURAL_DENOMINATOR: u64 = 2;
pub const DUEL_WIN_MULTIPLIER: u64 = 2;
/// Luck buff scales payouts to 70%.
pub const LUCK_SCALE_PERCENT: u64 = 70;
/// Chance (percent) that the luck buff turns a loss into a scaled win.
pub const LUCK_RESCUE_PERCENT: u32 = 35;
/// Seconds of inactivity before an open duel is discarded.
pub const DUEL_WINDOW_SECS: u64 = 60;

pub const PICK_POSITIONS: u8 = 5;
pub const PICK_WINDOW_SECS: u64 = 20;
pub const PICK_MULTIPLIER: u64 = 2;

/// House edge applied to the climb crash point, in basis points.
pub const CLIMB_HOUSE_EDGE_BPS: u32 = 100;
/// Lowest target a climb accepts, in hundredths (1.01x).
pub const CLIMB_MIN_TARGET: u32 = 101;
/// Highest crash point and target, in hundredths (100.00x).
pub const CLIMB_MAX_MULTIPLIER: u32 = 10_000;
/// Displayed multiplier increments per tick, in hundredths.
pub const CLIMB_STEP_MIN: u32 = 5;
pub const CLIMB_STEP_MAX: u32 = 25;
pub const CLIMB_TICK_MILLIS: u64 = 1_000;
/// Seconds before an unattended climb presentation is dropped.
pub const CLIMB_WINDOW_SECS: u64 = 120;

// Economy actions.
pub const CRIME_SUCCESS_PERCENT: u32 = 40;
pub const CRIME_REWARD_MIN: u64 = 4_000;
pub const CRIME_REWARD_MAX: u64 = 9_999;
pub const CRIME_PENALTY: u64 = 2_000;
pub const CRIME_COOLDOWN_SECS: u64 = 600;
pub const DAILY_REWARD: u64 = 10_000;
pub const DAILY_COOLDOWN_SECS: u64 = 86_400;
pub const WORK_REWARD_MIN: u64 = 1_000;
pub const WORK_REWARD_MAX: u64 = 5_000;
pub const WORK_COOLDOWN_SECS: u64 = 420;

/// Payout boost multiplies qualifying payouts by 5/4.
pub const BOOST_NUMERATOR: u64 = 5;
pub const BOOST_DENOMINATOR: u64 = 4;
pub const BOOST_DURATION_SECS: u64 = 600;
pub const LUCK_DURATION_SECS: u64 = 3_600;

/// Error codes carried by rejections
pub const ERROR_INSUFFICIENT_FUNDS: u8 = 1;
pub const ERROR_INVALID_ARGUMENT: u8 = 2;
pub const ERROR_COOLDOWN_ACTIVE: u8 = 3;
pub const ERROR_NO_SESSION: u8 = 4;
pub const ERROR_SESSION_OPEN: u8 = 5;
pub const ERROR_INSUFFICIENT_HOLDINGS: u8 = 6;
pub const ERROR_NOT_PERMITTED: u8 = 7;
