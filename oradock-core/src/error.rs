//! Error types for oradock

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while validating a run configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The operator must provision the output directory before the run
    #[error("Output directory does not exist: {}", .0.display())]
    OutputDirMissing(PathBuf),

    /// Port outside the accepted four-digit range
    #[error("Port {port} is outside the allowed range {min}-{max}")]
    PortOutOfRange {
        /// Rejected port
        port: u32,
        /// Lowest accepted port
        min: u16,
        /// Highest accepted port
        max: u16,
    },

    /// No schema left after trimming the schema parameter
    #[error("No schema names given")]
    EmptySchemas,

    /// A name that ends up inside SQL or shell text is not a plain identifier
    #[error("Invalid {what} '{value}': expected a letter followed by letters, digits, '_', '$' or '#'")]
    InvalidIdentifier {
        /// Which setting carried the value
        what: &'static str,
        /// The rejected value
        value: String,
    },

    /// Passwords are embedded in quoted SQL and shell text
    #[error("Invalid password for {0}: must not contain quotes or line breaks")]
    InvalidPassword(&'static str),

    /// The namespace ends up in container labels and the build file
    #[error("Invalid namespace '{0}': use letters, digits, '-', '_' or '.'")]
    InvalidNamespace(String),

    /// A required setting is blank
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    /// Durations such as the poll interval must be positive
    #[error("{0} must be greater than 0")]
    ZeroDuration(&'static str),
}

impl ConfigError {
    /// Whether this failure aborts the run with an error
    ///
    /// An empty schema list only ends the run early: there is nothing to export.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::EmptySchemas)
    }
}

/// Errors raised while reading database client output
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The client reported an ORA-/SP2- error instead of a result
    #[error("Database client reported an error: {0}")]
    ClientError(String),

    /// No number could be found in the output
    #[error("No numeric result in database client output: '{0}'")]
    NoNumber(String),

    /// A digit run was found but does not fit the result type
    #[error("Numeric result out of range: {0}")]
    OutOfRange(String),
}
