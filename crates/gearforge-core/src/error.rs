//! Error types for Gearforge

use thiserror::Error;

/// Main error type for Gearforge operations
///
/// A search that finds no feasible set is NOT an error; it is reported
/// as `Ok(None)` by the solver. Errors are reserved for non-recoverable
/// precondition violations in the supplied data.
#[derive(Debug, Error)]
pub enum GearforgeError {
    /// Supplied items or options violate a precondition
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A normalizer assumption was broken (would silently mis-score)
    #[error("Model inconsistency: {0}")]
    Inconsistency(String),
}

/// Result type alias for Gearforge operations
pub type Result<T> = std::result::Result<T, GearforgeError>;
