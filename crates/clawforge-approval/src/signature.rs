use base64::Engine;
use rsa::pkcs1v15::{Signature as RsaSignature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::Verifier;
use rsa::RsaPublicKey;
use sha2::Sha256;

use clawforge_canon::sha256_hex_of_value;
use clawforge_model::{ApprovalSignature, ClawforgeError, ClawforgeResult, ErrorCode};

/// Verifies one approval signature: recomputes `payloadHash` over every
/// field except `signature` and `payloadHash`, then RSA-SHA256-verifies
/// `signature` over that hash (as hex text) using `approver_public_key_pem`.
pub fn verify_signature_entry(signature: &ApprovalSignature, approver_public_key_pem: &str) -> ClawforgeResult<()> {
    if signature.algorithm != "RSA-SHA256" {
        return Err(ClawforgeError::field(ErrorCode::ApprovalSignatureInvalid, "algorithm", "only RSA-SHA256 is supported"));
    }

    let computed_payload_hash = sha256_hex_of_value(&signature.identity_payload())
        .map_err(|e| ClawforgeError::new(ErrorCode::ApprovalSignatureInvalid, e.to_string()))?;
    if computed_payload_hash != signature.payload_hash {
        return Err(ClawforgeError::field(
            ErrorCode::ApprovalSignatureInvalid,
            "payloadHash",
            "stored payloadHash does not match the recomputed hash",
        ));
    }

    let public_key = RsaPublicKey::from_public_key_pem(approver_public_key_pem.trim())
        .map_err(|_| ClawforgeError::field(ErrorCode::ApprovalSignatureInvalid, "publicKey", "malformed PEM public key"))?;
    let verifying_key = VerifyingKey::<Sha256>::new(public_key);

    let sig_bytes = base64::engine::general_purpose::STANDARD
        .decode(&signature.signature)
        .map_err(|_| ClawforgeError::field(ErrorCode::ApprovalSignatureInvalid, "signature", "signature is not valid base64"))?;
    let rsa_signature = RsaSignature::try_from(sig_bytes.as_slice())
        .map_err(|_| ClawforgeError::field(ErrorCode::ApprovalSignatureInvalid, "signature", "malformed RSA signature"))?;

    verifying_key
        .verify(computed_payload_hash.as_bytes(), &rsa_signature)
        .map_err(|_| ClawforgeError::field(ErrorCode::ApprovalSignatureInvalid, "signature", "RSA-SHA256 verification failed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs1v15::SigningKey;
    use rsa::pkcs8::EncodePublicKey;
    use rsa::signature::{RandomizedSigner, SignatureEncoding};
    use rsa::RsaPrivateKey;
    use serde_json::Map;
    use uuid::Uuid;

    fn sign_entry() -> (ApprovalSignature, String) {
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, 2048).unwrap();
        let public_key_pem = private_key.to_public_key().to_public_key_pem(Default::default()).unwrap();

        let mut sig = ApprovalSignature {
            signature_id: Uuid::new_v4(),
            approver_id: "alice".into(),
            role: "security_lead".into(),
            algorithm: "RSA-SHA256".into(),
            artifact_type: "decision_lock".into(),
            artifact_hash: "a".repeat(64),
            session_id: Uuid::new_v4(),
            timestamp: "2026-08-01T00:00:00Z".into(),
            nonce: Uuid::new_v4(),
            signature: String::new(),
            payload_hash: String::new(),
            extra: Map::new(),
        };
        sig.payload_hash = sha256_hex_of_value(&sig.identity_payload()).unwrap();

        let signing_key = SigningKey::<Sha256>::new(private_key);
        let signature = signing_key.sign_with_rng(&mut rng, sig.payload_hash.as_bytes());
        sig.signature = base64::engine::general_purpose::STANDARD.encode(signature.to_bytes());

        (sig, public_key_pem)
    }

    #[test]
    fn valid_signature_verifies() {
        let (sig, pubkey) = sign_entry();
        assert!(verify_signature_entry(&sig, &pubkey).is_ok());
    }

    #[test]
    fn tampered_artifact_hash_invalidates_payload() {
        let (mut sig, pubkey) = sign_entry();
        sig.artifact_hash = "f".repeat(64);
        let err = verify_signature_entry(&sig, &pubkey).unwrap_err();
        assert_eq!(err.code, ErrorCode::ApprovalSignatureInvalid);
    }
}
