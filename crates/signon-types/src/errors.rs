//! # Shared Error Types
//!
//! Error types used across the workspace crates.

use thiserror::Error;

/// Errors parsing or constructing an [`crate::entities::Account`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountError {
    /// The chain id is not of the form `namespace:reference`.
    #[error("Invalid CAIP-2 chain id: {0}")]
    InvalidChainId(String),

    /// The address part is empty.
    #[error("Account address is empty")]
    EmptyAddress,

    /// The full account string is not `namespace:reference:address`.
    #[error("Invalid account string: {0}")]
    InvalidAccountString(String),
}

/// Errors decoding a wire payload.
#[derive(Debug, Error)]
pub enum WireError {
    /// The bytes are not a valid wire message.
    #[error("Failed to decode wire message: {0}")]
    Decode(#[from] serde_json::Error),
}
