use super::LEADERBOARD_SIZE;
use crate::{AccountId, Amount};
use serde::{Deserialize, Serialize};

/// Leaderboard entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub account: AccountId,
    pub balance: Amount,
    pub rank: u32,
}

/// Richest accounts, sorted by balance descending.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn update(&mut self, account: AccountId, balance: Amount) {
        // Find and remove existing entry for this account
        if let Some(idx) = self.entries.iter().position(|e| e.account == account) {
            self.entries.remove(idx);
        }

        if self.entries.len() >= LEADERBOARD_SIZE {
            if let Some(last) = self.entries.last() {
                if balance <= last.balance {
                    return;
                }
            }
        }

        // Entries are sorted descending, so compare the new balance against each entry.
        // Ties land after existing entries with the same balance.
        let insert_pos = self
            .entries
            .partition_point(|e| e.balance >= balance);

        self.entries.insert(
            insert_pos,
            LeaderboardEntry {
                account,
                balance,
                rank: 0,
            },
        );

        self.entries.truncate(LEADERBOARD_SIZE);
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.rank = (i + 1) as u32;
        }
    }
}
