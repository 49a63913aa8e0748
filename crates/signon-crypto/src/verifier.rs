//! Requester-side signature verification with address recovery.

use crate::eip191::{eip191_hash, keccak256};
use crate::errors::VerifierError;
use crate::scalar::is_low_s;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use signon_types::{Account, CacaoSignature};
use zeroize::Zeroize;

/// Verify a signature over `message` against the claimed `account`.
///
/// Returns `Ok(true)` when the recovered signer matches the account's
/// address (case-insensitive hex), `Ok(false)` on a clean mismatch; a
/// mismatch is a verification *result*, not an error.
///
/// # Errors
///
/// `VerifierError` when verification could not run at all: unsupported
/// scheme, bad hex, wrong length, invalid recovery id, malleable S, or a
/// failed recovery.
pub fn verify_message(
    message: &str,
    signature: &CacaoSignature,
    account: &Account,
) -> Result<bool, VerifierError> {
    let recovered = recover_address(message, signature)?;
    Ok(account.matches_address(&recovered))
}

/// Recover the signer's Ethereum address (lowercase, `0x`-prefixed) from
/// an EIP-191 signature over `message`.
///
/// # Errors
///
/// See [`verify_message`].
pub fn recover_address(
    message: &str,
    signature: &CacaoSignature,
) -> Result<String, VerifierError> {
    if signature.t != "eip191" {
        return Err(VerifierError::UnsupportedScheme(signature.t.clone()));
    }

    let raw = signature.s.strip_prefix("0x").unwrap_or(&signature.s);
    let bytes = hex::decode(raw).map_err(|_| VerifierError::InvalidHex)?;
    if bytes.len() != 65 {
        return Err(VerifierError::InvalidLength(bytes.len()));
    }

    let mut s = [0u8; 32];
    s.copy_from_slice(&bytes[32..64]);
    if !is_low_s(&s) {
        return Err(VerifierError::MalleableSignature);
    }

    let recovery_id = parse_recovery_id(bytes[64])?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes.copy_from_slice(&bytes[..64]);
    let sig = match Signature::from_slice(&sig_bytes) {
        Ok(sig) => {
            sig_bytes.zeroize();
            sig
        }
        Err(_) => {
            sig_bytes.zeroize();
            return Err(VerifierError::InvalidFormat);
        }
    };

    let hash = eip191_hash(message.as_bytes());
    let recovered_key = VerifyingKey::recover_from_prehash(&hash, &sig, recovery_id)
        .map_err(|_| VerifierError::RecoveryFailed)?;

    Ok(address_from_verifying_key(&recovered_key))
}

/// Derive the lowercase `0x`-prefixed Ethereum address of a public key.
fn address_from_verifying_key(key: &VerifyingKey) -> String {
    let encoded = key.to_encoded_point(false);
    // Skip the 0x04 uncompressed-point prefix
    let digest = keccak256(&encoded.as_bytes()[1..]);
    format!("0x{}", hex::encode(&digest[12..]))
}

/// Parse an Ethereum `v` byte (0, 1, 27 or 28) into a recovery id.
fn parse_recovery_id(v: u8) -> Result<RecoveryId, VerifierError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        other => return Err(VerifierError::InvalidRecoveryId(other)),
    };
    RecoveryId::try_from(id).map_err(|_| VerifierError::InvalidRecoveryId(v))
}
