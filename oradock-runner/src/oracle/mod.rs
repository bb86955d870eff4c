//! Source database tooling
//!
//! Adapters for the two source-side executables: the database client
//! (`sqlplus`) and the data pump export utility (`expdp`).

mod client;
mod datapump;

pub use client::{SqlClient, SqlPlusClient, SQLPLUS_PROGRAM};
pub use datapump::{DataPump, ExpdpDataPump, EXPDP_PROGRAM};
