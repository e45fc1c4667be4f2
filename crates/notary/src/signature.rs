use bytes::Bytes;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

/// A trait that abstracts over the asymmetric signature algorithm used by the
/// pipeline.
///
/// Keys are generated once per pipeline run and shared read-only by every
/// stage, so both key types must be `Send + Sync`. The scheme itself carries
/// no state; all operations are associated functions.
pub trait SignatureScheme: Send + Sync + 'static {
    type SigningKey: Send + Sync + 'static;
    type VerifyingKey: Send + Sync + 'static;

    /// Generates a fresh key pair.
    fn generate_keypair() -> (Self::SigningKey, Self::VerifyingKey);

    /// Signs `message`.
    fn sign(key: &Self::SigningKey, message: &[u8]) -> Bytes;

    /// Returns `true` if `signature` is a valid signature of `message` under
    /// `key`. Malformed signatures are simply invalid.
    fn verify(key: &Self::VerifyingKey, message: &[u8], signature: &[u8]) -> bool;
}

/// Ed25519 signatures via [`ed25519_dalek`].
pub struct Ed25519;

impl SignatureScheme for Ed25519 {
    type SigningKey = SigningKey;
    type VerifyingKey = VerifyingKey;

    fn generate_keypair() -> (Self::SigningKey, Self::VerifyingKey) {
        let seed: [u8; 32] = rand::random();
        let signing = SigningKey::from_bytes(&seed);
        let verifying = signing.verifying_key();
        (signing, verifying)
    }

    fn sign(key: &Self::SigningKey, message: &[u8]) -> Bytes {
        Bytes::copy_from_slice(&key.sign(message).to_bytes())
    }

    fn verify(key: &Self::VerifyingKey, message: &[u8], signature: &[u8]) -> bool {
        Signature::from_slice(signature)
            .map(|signature| key.verify(message, &signature).is_ok())
            .unwrap_or(false)
    }
}
