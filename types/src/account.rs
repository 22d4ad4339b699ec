use serde::{Deserialize, Serialize};
use std::fmt;

/// Whole points held by an account.
pub type Amount = u64;

/// Prefix marking ledger accounts that back a shared pool.
const POOL_PREFIX: &str = "pool:";

/// Opaque account identifier supplied by the host platform.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Ledger account holding the funds of the named pool.
    pub fn pool(name: &str) -> Self {
        Self(format!("{POOL_PREFIX}{name}"))
    }

    pub fn is_pool(&self) -> bool {
        self.0.starts_with(POOL_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AccountId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_accounts_are_prefixed() {
        let pool = AccountId::pool("family");
        assert_eq!(pool.as_str(), "pool:family");
        assert!(pool.is_pool());
        assert!(!AccountId::from("42").is_pool());
    }
}
