//! Shared data types for the arcade economy.
//!
//! Everything a dispatcher needs to talk to the core lives here: account
//! identifiers, the fixed-point [Decimal], the closed [execution::Command]
//! surface and the [execution::Receipt]/[execution::Rejection] pair it
//! returns.

pub mod account;
pub mod casino;
pub mod execution;
pub mod fixed;
pub mod market;

pub use account::{AccountId, Amount};
pub use fixed::Decimal;
