//! Core domain types
//!
//! This module contains the domain structures shared between the stages of a
//! migration run: what gets built and launched, what gets exported, how the
//! import is observed, and what gets journaled.

pub mod container;
pub mod export;
pub mod import;
pub mod log;
pub mod manifest;
