mod cards;
mod constants;
mod game;
mod leaderboard;
mod rewards;

pub use cards::*;
pub use constants::*;
pub use game::*;
pub use leaderboard::*;
pub use rewards::*;

#[cfg(test)]
mod tests;
