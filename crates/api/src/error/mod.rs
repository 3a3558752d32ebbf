//! Error handling for the MSM ecosystem

use std::borrow::Cow;

pub mod validate;

#[cfg(test)]
mod tests;

/// Primary error type for MSM operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Parameter validation error
    #[error("Invalid parameter '{name}': {reason}")]
    Parameter {
        /// Name of the invalid parameter
        name: Cow<'static, str>,
        /// Reason why the parameter is invalid
        reason: Cow<'static, str>,
    },

    /// Length validation error
    #[error("Invalid length for {context}: expected {expected}, got {actual}")]
    Length {
        /// Context where the length error occurred
        context: &'static str,
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// An arena zone ran out of room
    #[error("Arena zone '{zone}' exhausted: requested {requested}, available {available}")]
    Capacity {
        /// Zone that overflowed
        zone: &'static str,
        /// Number of elements requested
        requested: usize,
        /// Number of elements still free in the zone
        available: usize,
    },

    /// Processing error during an MSM phase
    #[error("Processing error in {operation}: {details}")]
    Processing {
        /// Operation that failed
        operation: &'static str,
        /// Additional details about the failure
        details: &'static str,
    },

    /// Worker pool could not be built or is not running
    #[error("Thread pool error: {details}")]
    ThreadPool {
        /// Detailed error message
        details: String,
    },
}

impl Error {
    /// Shorthand to create a Parameter error
    pub fn param<N: Into<Cow<'static, str>>, R: Into<Cow<'static, str>>>(
        name: N,
        reason: R,
    ) -> Self {
        Error::Parameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for MSM operations
pub type Result<T> = core::result::Result<T, Error>;
