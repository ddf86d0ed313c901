//! Metrics export.
//!
//! Reports can be pushed to a Prometheus Push Gateway after a run.
//!
//! # Submodules
//!
//! - `prom` - Prometheus metrics integration

pub mod prom;
