//! oradock runner
//!
//! Drives a schema migration from a local Oracle database into a freshly
//! built database container.
//!
//! Architecture:
//! - Adapters: container engine, `sqlplus`, `expdp`, executable lookup
//! - Journal: the persisted run log under `logs/`
//! - Stages: preflight, artifacts, reset, export, provision
//! - Poller: waits for the in-container import to report a result
//!
//! Every external tool sits behind a trait so stages can be exercised
//! without a database or container engine.

pub mod context;
pub mod engine;
pub mod journal;
pub mod oracle;
pub mod pipeline;
pub mod poller;
pub mod process;
pub mod stages;
pub mod tools;

#[cfg(test)]
mod testing;

pub use context::RunContext;
pub use pipeline::{RunOutcome, Stage, run};
pub use poller::{CancelSignal, ImportOutcome};
