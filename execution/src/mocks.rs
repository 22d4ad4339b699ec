use crate::{
    casino::GameRng,
    clock::Clock,
    layer::{Layer, LayerConfig},
    state::Memory,
};
use arcade_types::{AccountId, Amount};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Everything a test needs to drive a [Layer] deterministically.
pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub store: Arc<Memory>,
    pub layer: Layer,
}

/// Creates a layer over an in-memory store, a manual clock and a seeded RNG.
pub fn create_layer(seed: u64) -> Harness {
    create_layer_with(LayerConfig::default(), seed)
}

pub fn create_layer_with(config: LayerConfig, seed: u64) -> Harness {
    let clock = Arc::new(ManualClock::new(1_700_000_000));
    let store = Arc::new(Memory::default());
    let layer = Layer::load(config, store.clone(), clock.clone(), GameRng::seeded(seed));
    Harness {
        clock,
        store,
        layer,
    }
}

/// Creates an account with an opening balance.
pub async fn create_account(layer: &Layer, name: &str, balance: Amount) -> AccountId {
    let account = AccountId::from(name);
    layer.ledger().set_balance(&account, balance).await;
    account
}
