//! Crate-wide error type.

use thiserror::Error;

/// Convenience alias used by every fallible operation in the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the profile generators and the schedule engine.
///
/// All variants signal caller misuse and are raised synchronously before any
/// output is produced; none of them is retryable. Statistical spread in the
/// stochastic generators is a model property and never surfaces as an error.
#[derive(Debug, Error)]
pub enum Error {
    /// A date argument failed to parse, or the requested period is reversed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation was invoked on a generator whose calculation method does
    /// not define it (e.g. a COSTIC draw on an RE2020 generator).
    #[error("operation `{operation}` is not defined for method {method}")]
    UnsupportedMethod {
        /// Name of the rejected operation.
        operation: &'static str,
        /// The method the generator was configured with.
        method: &'static str,
    },

    /// A generator or schedule configuration is internally inconsistent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A degenerate combination of flags that selects no work at all.
    #[error("invalid argument combination: {0}")]
    InvalidArgumentCombination(String),
}
