pub mod casino;
pub mod clock;
pub mod effects;
pub mod inventory;
pub mod ledger;
pub mod market;
pub mod pools;
pub mod state;
pub mod timers;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

mod layer;

pub use clock::{Clock, SystemClock};
pub use layer::{Layer, LayerConfig};
pub use market::{DriftProfile, DriftRange, MarketConfig};
pub use state::{Disk, Domain, Memory, Store, StoreError};
