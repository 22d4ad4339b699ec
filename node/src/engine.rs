use crate::ValidatedConfig;
use arcade_execution::{casino::GameRng, Clock, Disk, Layer, Store, StoreError, SystemClock};
use std::{sync::Arc, time::Duration};
use tokio::{sync::watch, task::JoinHandle};
use tracing::info;

/// Owns the [Layer] and its background tasks.
pub struct Engine {
    layer: Arc<Layer>,
    climb_tick: Duration,
    reaper_interval: Duration,
}

impl Engine {
    /// Open the data directory and restore every domain from it.
    pub fn new(config: &ValidatedConfig) -> Result<Self, StoreError> {
        let store = Arc::new(Disk::open(&config.directory)?);
        info!(directory = ?config.directory, "opened data directory");
        Ok(Self::with_store(config, store, Arc::new(SystemClock)))
    }

    pub fn with_store(
        config: &ValidatedConfig,
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => {
                info!(seed, "using fixed rng seed");
                GameRng::seeded(seed)
            }
            None => GameRng::from_entropy(),
        };
        let layer = Layer::load(config.layer.clone(), store, clock, rng);
        Self {
            layer: Arc::new(layer),
            climb_tick: config.climb_tick,
            reaper_interval: config.reaper_interval,
        }
    }

    pub fn layer(&self) -> &Arc<Layer> {
        &self.layer
    }

    pub fn climb_tick(&self) -> Duration {
        self.climb_tick
    }

    /// Spawn the market loop and the session reaper. Both stop when `shutdown` fires.
    pub fn start(&self, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        let market = self
            .layer
            .market()
            .clone()
            .run(self.layer.fork_rng(), shutdown.clone());
        let reaper = self
            .layer
            .clone()
            .run_reaper(self.reaper_interval, shutdown);
        vec![tokio::spawn(market), tokio::spawn(reaper)]
    }
}
