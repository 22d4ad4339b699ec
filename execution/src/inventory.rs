//! Owned item records and forgiving label matching.

use crate::state::{self, Domain, Store};
use arcade_types::{execution::Rejection, AccountId};
use edit_distance::edit_distance;
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::info;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

type Items = BTreeMap<AccountId, Vec<String>>;

/// Letters with a stroke have no decomposition.
fn fold(c: char) -> char {
    match c {
        'ø' => 'o',
        'ł' => 'l',
        'đ' => 'd',
        'ħ' => 'h',
        'ı' => 'i',
        other => other,
    }
}

/// Trimmed, lower-cased and accent-free form used for matching.
pub fn normalize(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .map(fold)
        .collect()
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
}

/// Index of the item best matching `query`.
///
/// Tries, in order: exact normalized match, substring either way, any query
/// word contained in the item, then a query word within one edit of an item
/// word (words of four letters or more only).
pub fn find_match(items: &[String], query: &str) -> Option<usize> {
    let query = normalize(query);
    if query.is_empty() {
        return None;
    }
    let labels: Vec<String> = items.iter().map(|item| normalize(item)).collect();

    if let Some(idx) = labels.iter().position(|label| *label == query) {
        return Some(idx);
    }
    if let Some(idx) = labels
        .iter()
        .position(|label| !label.is_empty() && (label.contains(&query) || query.contains(label.as_str())))
    {
        return Some(idx);
    }
    if let Some(idx) = labels
        .iter()
        .position(|label| words(&query).any(|word| label.contains(word)))
    {
        return Some(idx);
    }
    labels.iter().position(|label| {
        words(&query).filter(|word| word.chars().count() >= 4).any(|word| {
            words(label).any(|candidate| edit_distance(word, candidate) <= 1)
        })
    })
}

/// Item lists per account. Items never expire.
pub struct Inventory {
    items: Mutex<Items>,
    store: Arc<dyn Store>,
}

impl Inventory {
    pub fn load(store: Arc<dyn Store>) -> Self {
        let items: Items = state::load(store.as_ref(), Domain::Inventory);
        info!(owners = items.len(), "loaded inventory");
        Self {
            items: Mutex::new(items),
            store,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Items> {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, items: &Items) {
        state::save(self.store.as_ref(), Domain::Inventory, items);
    }

    pub fn grant(&self, account: &AccountId, label: &str) {
        let mut items = self.lock();
        items
            .entry(account.clone())
            .or_default()
            .push(label.to_string());
        self.persist(&items);
    }

    pub fn items(&self, account: &AccountId) -> Vec<String> {
        self.lock().get(account).cloned().unwrap_or_default()
    }

    pub fn count(&self, account: &AccountId) -> usize {
        self.lock().get(account).map(Vec::len).unwrap_or_default()
    }

    /// Remove one instance of the best match for `query`.
    pub fn consume_matching(&self, account: &AccountId, query: &str) -> Option<String> {
        let mut items = self.lock();
        let owned = items.get_mut(account)?;
        let idx = find_match(owned, query)?;
        let label = owned.remove(idx);
        if owned.is_empty() {
            items.remove(account);
        }
        self.persist(&items);
        Some(label)
    }

    /// Move the best match for `query` from one account to another in one step.
    pub fn transfer(&self, from: &AccountId, to: &AccountId, query: &str) -> Result<String, Rejection> {
        if from == to {
            return Err(Rejection::invalid("cannot give an item to yourself"));
        }
        let mut items = self.lock();
        let owned = items
            .get_mut(from)
            .ok_or_else(|| Rejection::ItemNotFound(query.to_string()))?;
        let idx = find_match(owned, query).ok_or_else(|| Rejection::ItemNotFound(query.to_string()))?;
        let label = owned.remove(idx);
        if owned.is_empty() {
            items.remove(from);
        }
        items.entry(to.clone()).or_default().push(label.clone());
        self.persist(&items);
        info!(%from, %to, item = %label, "item transferred");
        Ok(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Memory;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  LEÓN "), "leon");
        assert_eq!(normalize("Piña Colada"), "pina colada");
        assert_eq!(normalize("Søren Şahin"), "soren sahin");
        assert_eq!(normalize("Kōbe"), "kobe");
        // Decomposed input: "e" followed by a combining acute accent.
        assert_eq!(normalize("Cafe\u{301}"), "cafe");
    }

    #[test]
    fn test_match_order() {
        let items = labels(&["Lion – 40,000 coins", "Stone – 30 CTC", "Lion"]);
        // Exact beats substring.
        assert_eq!(find_match(&items, "lion"), Some(2));
        assert_eq!(find_match(&items, "stone"), Some(1));
        // Query word inside a label.
        assert_eq!(find_match(&items, "the stone please"), Some(1));
        assert_eq!(find_match(&items, "dragon"), None);
        assert_eq!(find_match(&items, "   "), None);
    }

    #[test]
    fn test_fuzzy_fallback() {
        let items = labels(&["Lion", "Stone"]);
        assert_eq!(find_match(&items, "leon"), Some(0));
        assert_eq!(find_match(&items, "LEÓN"), Some(0));
        // Short words never match fuzzily.
        assert_eq!(find_match(&labels(&["Cat"]), "cot"), None);
    }

    #[test]
    fn test_transfer_by_query() {
        let inventory = Inventory::load(Arc::new(Memory::default()));
        let alice = AccountId::from("alice");
        let bob = AccountId::from("bob");
        inventory.grant(&alice, "Lion");
        inventory.grant(&alice, "Stone");

        assert_eq!(inventory.transfer(&alice, &bob, "leon").unwrap(), "Lion");
        assert_eq!(inventory.items(&alice), vec!["Stone".to_string()]);
        assert_eq!(inventory.items(&bob), vec!["Lion".to_string()]);

        assert_eq!(
            inventory.transfer(&alice, &bob, "dragon"),
            Err(Rejection::ItemNotFound("dragon".to_string()))
        );
        assert!(inventory.transfer(&alice, &alice, "stone").is_err());
        assert_eq!(inventory.count(&alice), 1);
    }

    #[test]
    fn test_consume_removes_one_instance() {
        let store = Arc::new(Memory::default());
        let inventory = Inventory::load(store.clone());
        let alice = AccountId::from("alice");
        inventory.grant(&alice, "Hen");
        inventory.grant(&alice, "Hen");

        assert_eq!(inventory.consume_matching(&alice, "hen").as_deref(), Some("Hen"));
        assert_eq!(inventory.count(&alice), 1);

        let reloaded = Inventory::load(store);
        assert_eq!(reloaded.items(&alice), vec!["Hen".to_string()]);
    }
}
