//! Pipeline stages
//!
//! Each stage is a function over the run context. Stages run strictly in
//! sequence and any error ends the run; nothing is retried or rolled back.

pub mod artifacts;
pub mod export;
pub mod preflight;
pub mod provision;
pub mod reset;
