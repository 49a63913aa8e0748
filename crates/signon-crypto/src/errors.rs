//! Errors from signing and verification.

use thiserror::Error;

/// Errors producing a signature.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignerError {
    /// The private key material is not a valid secp256k1 scalar.
    #[error("Invalid private key material")]
    InvalidKey,

    /// The underlying signing operation failed.
    #[error("Signing failed")]
    SigningFailed,
}

/// Errors meaning verification *could not run* (as opposed to running and
/// recovering a non-matching address, which is a plain `false`).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerifierError {
    /// The signature scheme tag is not supported.
    #[error("Unsupported signature scheme: {0}")]
    UnsupportedScheme(String),

    /// The signature is not valid hex.
    #[error("Signature is not valid hex")]
    InvalidHex,

    /// The signature is not 65 bytes (`r || s || v`).
    #[error("Invalid signature length: expected 65 bytes, got {0}")]
    InvalidLength(usize),

    /// The recovery id byte is not 0, 1, 27 or 28.
    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// S is in the upper half of the curve order (EIP-2 malleability).
    #[error("Malleable signature (high S value)")]
    MalleableSignature,

    /// The r/s pair does not parse as a secp256k1 signature.
    #[error("Invalid signature format")]
    InvalidFormat,

    /// Public key recovery failed.
    #[error("Failed to recover public key")]
    RecoveryFailed,
}
