//! Oradock Core
//!
//! Core types and abstractions for migrating a local Oracle schema into a
//! freshly provisioned container.
//!
//! This crate contains:
//! - Configuration: the immutable run configuration and its validation
//! - Layout: the workspace directory tree under the output directory
//! - Domain types: container specs, export requests, import progress, journal entries
//! - SQL: client session scripts and query-result parsing
//! - Templates: the generated build file, init script and import script

pub mod config;
pub mod domain;
pub mod error;
pub mod layout;
pub mod sql;
pub mod template;
