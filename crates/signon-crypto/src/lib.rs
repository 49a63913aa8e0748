//! # Message Signer / Verifier
//!
//! EIP-191 personal-message signing and verification over secp256k1, with
//! Ethereum address recovery.
//!
//! ## Security Notes
//!
//! - **Malleability Prevention (EIP-2)**: S must be strictly below the
//!   secp256k1 half order; the signer normalizes, the verifier rejects.
//! - **Constant-Time Comparison**: The low-S check uses the `subtle` crate.
//! - **"Could not run" vs "ran and failed"**: a malformed signature is an
//!   explicit [`VerifierError`]; a well-formed signature recovering the
//!   wrong address is `Ok(false)`, never an error.

pub mod eip191;
pub mod errors;
mod scalar;
pub mod signer;
pub mod verifier;

pub use eip191::{eip191_hash, keccak256};
pub use errors::{SignerError, VerifierError};
pub use signer::sign_message;
pub use verifier::{recover_address, verify_message};
