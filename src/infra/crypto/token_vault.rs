use crate::error::EngineError;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use rand::RngCore;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Auth tags are scoped to this subsystem; payloads produced elsewhere with
/// the same key will not decrypt here.
const AAD: &[u8] = b"scheduling-engine.calendar-tokens.v1";

/// AES-256-GCM over OAuth token strings. Payload layout is
/// base64(nonce || ciphertext || tag).
pub struct TokenVault {
    cipher: Aes256Gcm,
}

impl TokenVault {
    pub fn new(key: &[u8]) -> Result<Self, EngineError> {
        if key.len() != 32 {
            return Err(EngineError::Configuration(
                "Token encryption key must be exactly 32 bytes".into(),
            ));
        }
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|e| EngineError::Configuration(format!("Failed to build cipher: {e}")))?;
        Ok(Self { cipher })
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, EngineError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from(nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(&nonce, Payload { msg: plaintext.as_bytes(), aad: AAD })
            .map_err(|e| EngineError::Crypto(format!("Encryption failed: {e}")))?;

        let mut payload = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        payload.extend_from_slice(&nonce_bytes);
        payload.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(payload))
    }

    /// Fails closed: any tampering with nonce, ciphertext, or tag is rejected.
    pub fn decrypt(&self, encoded: &str) -> Result<String, EngineError> {
        let payload = BASE64
            .decode(encoded)
            .map_err(|e| EngineError::Crypto(format!("Base64 decode failed: {e}")))?;
        if payload.len() < NONCE_LEN + TAG_LEN {
            return Err(EngineError::Crypto("Payload too short".into()));
        }

        let nonce_bytes: [u8; NONCE_LEN] = payload[..NONCE_LEN]
            .try_into()
            .map_err(|_| EngineError::Crypto("Invalid nonce".into()))?;
        let plaintext = self
            .cipher
            .decrypt(
                &Nonce::from(nonce_bytes),
                Payload { msg: &payload[NONCE_LEN..], aad: AAD },
            )
            .map_err(|_| EngineError::Crypto("Decryption failed (tag mismatch)".into()))?;

        String::from_utf8(plaintext)
            .map_err(|_| EngineError::Crypto("Decrypted token is not valid UTF-8".into()))
    }
}
