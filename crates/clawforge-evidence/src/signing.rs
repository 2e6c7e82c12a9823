//! Runner attestation signature verification. Supports the two algorithms a
//! `RunnerIdentity` may declare: Ed25519 (hex-encoded raw public key) and
//! RSA-SHA256 (PEM-encoded `SubjectPublicKeyInfo`), dispatched on
//! `identity.attestationAlgorithm`.

use base64::Engine;
use ed25519_dalek::{Signature as Ed25519Signature, Verifier, VerifyingKey};
use pkcs8::DecodePublicKey;
use rsa::pkcs1v15::{Signature as RsaSignature, VerifyingKey as RsaVerifyingKey};
use rsa::RsaPublicKey;
use sha2::Sha256;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SigningError {
    #[error("unsupported attestation algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("malformed public key")]
    MalformedKey,
    #[error("malformed signature encoding")]
    MalformedSignature,
    #[error("signature verification failed")]
    VerificationFailed,
}

/// Verifies `signature_b64` (base64) over `message` using `public_key`,
/// dispatched on `algorithm` (case-insensitive `ed25519` or `rsa-sha256`).
pub fn verify_signature(algorithm: &str, public_key: &str, message: &str, signature_b64: &str) -> Result<(), SigningError> {
    match algorithm.to_ascii_lowercase().as_str() {
        "ed25519" => verify_ed25519(public_key, message, signature_b64),
        "rsa-sha256" => verify_rsa_sha256(public_key, message, signature_b64),
        other => Err(SigningError::UnsupportedAlgorithm(other.to_string())),
    }
}

fn verify_ed25519(public_key_hex: &str, message: &str, signature_b64: &str) -> Result<(), SigningError> {
    let key_bytes = hex::decode(public_key_hex.trim()).map_err(|_| SigningError::MalformedKey)?;
    let key_array: [u8; 32] = key_bytes.try_into().map_err(|_| SigningError::MalformedKey)?;
    let verifying_key = VerifyingKey::from_bytes(&key_array).map_err(|_| SigningError::MalformedKey)?;

    let sig_bytes = base64::engine::general_purpose::STANDARD
        .decode(signature_b64)
        .map_err(|_| SigningError::MalformedSignature)?;
    let sig_array: [u8; 64] = sig_bytes.try_into().map_err(|_| SigningError::MalformedSignature)?;
    let signature = Ed25519Signature::from_bytes(&sig_array);

    verifying_key.verify(message.as_bytes(), &signature).map_err(|_| SigningError::VerificationFailed)
}

pub(crate) fn verify_rsa_sha256(public_key_pem: &str, message: &str, signature_b64: &str) -> Result<(), SigningError> {
    let public_key = RsaPublicKey::from_public_key_pem(public_key_pem.trim()).map_err(|_| SigningError::MalformedKey)?;
    let verifying_key = RsaVerifyingKey::<Sha256>::new(public_key);

    let sig_bytes = base64::engine::general_purpose::STANDARD
        .decode(signature_b64)
        .map_err(|_| SigningError::MalformedSignature)?;
    let signature = RsaSignature::try_from(sig_bytes.as_slice()).map_err(|_| SigningError::MalformedSignature)?;

    verifying_key.verify(message.as_bytes(), &signature).map_err(|_| SigningError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};
    use rand::rngs::OsRng;

    #[test]
    fn ed25519_round_trip_verifies() {
        let mut csprng = OsRng;
        let signing_key = SigningKey::generate(&mut csprng);
        let public_key_hex = hex::encode(signing_key.verifying_key().to_bytes());
        let message = "deadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef";
        let signature = signing_key.sign(message.as_bytes());
        let signature_b64 = base64::engine::general_purpose::STANDARD.encode(signature.to_bytes());
        assert!(verify_signature("ed25519", &public_key_hex, message, &signature_b64).is_ok());
    }

    #[test]
    fn ed25519_rejects_tampered_message() {
        let mut csprng = OsRng;
        let signing_key = SigningKey::generate(&mut csprng);
        let public_key_hex = hex::encode(signing_key.verifying_key().to_bytes());
        let message = "a".repeat(64);
        let signature = signing_key.sign(message.as_bytes());
        let signature_b64 = base64::engine::general_purpose::STANDARD.encode(signature.to_bytes());
        assert!(verify_signature("ed25519", &public_key_hex, "b".repeat(64).as_str(), &signature_b64).is_err());
    }

    #[test]
    fn unsupported_algorithm_is_rejected() {
        assert!(matches!(
            verify_signature("dsa", "key", "msg", "sig"),
            Err(SigningError::UnsupportedAlgorithm(_))
        ));
    }
}
