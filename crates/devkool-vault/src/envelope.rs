// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-field authenticated encryption.
//!
//! A sealed field is `base64url_nopad(version || nonce || ciphertext || tag)`.
//! The version byte is authenticated as associated data, so changing any part
//! of the token makes [`Envelope::open`] fail.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use devkool_core::DevkoolError;
use ring::aead::NONCE_LEN;
use serde::{Deserialize, Serialize};

use crate::crypto::{self, TAG_LEN};
use crate::keys::SecretKey;

/// Current envelope format.
pub const ENVELOPE_VERSION: u8 = 1;

const HEADER_LEN: usize = 1 + NONCE_LEN;

/// A sealed string. Only [`Envelope`] can make sense of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedField(String);

impl EncryptedField {
    /// Wrap an already-encoded token, e.g. one read from disk.
    pub fn from_encoded(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Seals and opens fields under one [`SecretKey`].
pub struct Envelope {
    key: SecretKey,
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope").field("key", &"[REDACTED]").finish()
    }
}

impl Envelope {
    pub fn new(key: SecretKey) -> Self {
        Self { key }
    }

    /// Encrypt a string. Fails only if the system RNG does.
    pub fn seal(&self, plaintext: &str) -> Result<EncryptedField, DevkoolError> {
        let (ciphertext, nonce) =
            crypto::seal(self.key.expose(), plaintext.as_bytes(), &[ENVELOPE_VERSION])?;

        let mut token = Vec::with_capacity(HEADER_LEN + ciphertext.len());
        token.push(ENVELOPE_VERSION);
        token.extend_from_slice(&nonce);
        token.extend_from_slice(&ciphertext);

        Ok(EncryptedField(URL_SAFE_NO_PAD.encode(token)))
    }

    /// Decrypt a field sealed by [`seal`](Self::seal) under the same key.
    pub fn open(&self, field: &EncryptedField) -> Result<String, DevkoolError> {
        let token = URL_SAFE_NO_PAD
            .decode(field.as_str())
            .map_err(|e| DevkoolError::Decryption(format!("malformed field encoding: {e}")))?;

        if token.len() < HEADER_LEN + TAG_LEN {
            return Err(DevkoolError::Decryption(format!(
                "field too short ({} bytes)",
                token.len()
            )));
        }

        let (header, ciphertext) = token.split_at(HEADER_LEN);
        let version = header[0];
        if version != ENVELOPE_VERSION {
            return Err(DevkoolError::Decryption(format!(
                "unsupported envelope version {version}"
            )));
        }
        let nonce: [u8; NONCE_LEN] = header[1..]
            .try_into()
            .map_err(|_| DevkoolError::Decryption("corrupted nonce".to_string()))?;

        let plaintext = crypto::open(self.key.expose(), &nonce, ciphertext, &[version])?;
        String::from_utf8(plaintext)
            .map_err(|e| DevkoolError::Decryption(format!("decrypted value is not UTF-8: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn envelope() -> Envelope {
        Envelope::new(SecretKey::generate().unwrap())
    }

    #[test]
    fn open_seal_roundtrip() {
        let env = envelope();
        let field = env.seal("sk-test-abc").unwrap();
        assert_eq!(env.open(&field).unwrap(), "sk-test-abc");
    }

    #[test]
    fn empty_string_roundtrips() {
        let env = envelope();
        assert_eq!(env.open(&env.seal("").unwrap()).unwrap(), "");
    }

    #[test]
    fn token_is_url_safe() {
        let field = envelope().seal("https://example.com/api?q=1").unwrap();
        assert!(field
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn different_key_fails() {
        let field = envelope().seal("secret").unwrap();
        assert!(envelope().open(&field).unwrap_err().is_decryption());
    }

    #[test]
    fn every_raw_byte_flip_is_detected() {
        let env = envelope();
        let field = env.seal("https://example.com/api").unwrap();
        let raw = URL_SAFE_NO_PAD.decode(field.as_str()).unwrap();

        for i in 0..raw.len() {
            let mut tampered = raw.clone();
            tampered[i] ^= 0x01;
            let forged = EncryptedField::from_encoded(URL_SAFE_NO_PAD.encode(&tampered));
            let err = env.open(&forged).unwrap_err();
            assert!(err.is_decryption(), "byte {i}: {err}");
        }
    }

    #[test]
    fn every_encoded_char_change_is_detected() {
        let env = envelope();
        let field = env.seal("k1").unwrap();
        let encoded: Vec<char> = field.as_str().chars().collect();

        for i in 0..encoded.len() {
            let mut tampered = encoded.clone();
            tampered[i] = if tampered[i] == 'A' { 'B' } else { 'A' };
            let forged = EncryptedField::from_encoded(tampered.into_iter().collect::<String>());
            assert!(env.open(&forged).unwrap_err().is_decryption(), "char {i}");
        }
    }

    #[test]
    fn garbage_is_rejected() {
        let env = envelope();
        for junk in ["", "not base64 at all!", "AAAA"] {
            assert!(env.open(&EncryptedField::from_encoded(junk)).is_err(), "{junk:?}");
        }
    }

    #[test]
    fn unknown_version_is_rejected() {
        let env = envelope();
        let mut raw = URL_SAFE_NO_PAD.decode(env.seal("x").unwrap().as_str()).unwrap();
        raw[0] = 9;
        let err = env
            .open(&EncryptedField::from_encoded(URL_SAFE_NO_PAD.encode(&raw)))
            .unwrap_err();
        assert!(err.to_string().contains("version 9"));
    }

    #[test]
    fn field_serializes_as_bare_string() {
        let field = EncryptedField::from_encoded("abc");
        assert_eq!(serde_json::to_string(&field).unwrap(), "\"abc\"");
    }

    proptest! {
        #[test]
        fn any_string_roundtrips(s in ".*") {
            let env = envelope();
            let field = env.seal(&s).unwrap();
            prop_assert_eq!(env.open(&field).unwrap(), s);
        }
    }
}
