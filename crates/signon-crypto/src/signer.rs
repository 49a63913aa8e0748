//! Wallet-side message signing.

use crate::eip191::eip191_hash;
use crate::errors::SignerError;
use crate::scalar::{invert_s, is_low_s};
use k256::ecdsa::SigningKey;
use signon_types::CacaoSignature;

/// Sign a canonical sign-in message per EIP-191 with a raw 32-byte
/// secp256k1 private key.
///
/// The resulting signature is low-S normalized with `v` in {27, 28} and
/// encoded as 65 hex bytes `r || s || v`.
///
/// # Errors
///
/// `SignerError::InvalidKey` if the key material is not a valid scalar;
/// `SignerError::SigningFailed` if the ECDSA operation fails.
pub fn sign_message(message: &str, private_key: &[u8]) -> Result<CacaoSignature, SignerError> {
    let signing_key = SigningKey::from_slice(private_key).map_err(|_| SignerError::InvalidKey)?;

    let hash = eip191_hash(message.as_bytes());
    let (signature, recovery_id) = signing_key
        .sign_prehash_recoverable(&hash)
        .map_err(|_| SignerError::SigningFailed)?;

    let sig_bytes = signature.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&sig_bytes[..32]);
    s.copy_from_slice(&sig_bytes[32..]);

    // Normalize S to the lower half (EIP-2), flipping the recovery id
    // when inverted.
    let v = if is_low_s(&s) {
        recovery_id.to_byte() + 27
    } else {
        s = invert_s(&s);
        if recovery_id.to_byte() == 0 {
            28
        } else {
            27
        }
    };

    let mut encoded = [0u8; 65];
    encoded[..32].copy_from_slice(&r);
    encoded[32..64].copy_from_slice(&s);
    encoded[64] = v;

    Ok(CacaoSignature::eip191(hex::encode(encoded)))
}
