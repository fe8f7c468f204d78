// SPDX-FileCopyrightText: 2026 devkool Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret key lifecycle: create once, then load for every crypto operation.
//!
//! The key lives in a binary file holding exactly [`KEY_LEN`] bytes. It is
//! only ever created when absent and is never overwritten. A base64 key in
//! `DEVKOOL_SECRET_KEY` takes precedence over the file when set.

use std::io::Write;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use devkool_config::StorageConfig;
use devkool_core::{DevkoolError, KeySource};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::crypto::{self, KEY_LEN};

/// Environment variable carrying base64-encoded key material.
pub const SECRET_KEY_ENV_VAR: &str = "DEVKOOL_SECRET_KEY";

/// The vault's symmetric key. Zeroed on drop; never printed.
pub struct SecretKey(Zeroizing<[u8; KEY_LEN]>);

impl SecretKey {
    /// Generate a fresh key from the system CSPRNG.
    pub fn generate() -> Result<Self, DevkoolError> {
        Ok(Self(Zeroizing::new(crypto::generate_random_key()?)))
    }

    /// Wrap raw key bytes, rejecting anything that is not exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DevkoolError> {
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|_| {
            DevkoolError::KeyUnavailable(format!(
                "key must be exactly {KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(Zeroizing::new(key)))
    }

    pub(crate) fn expose(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

/// Owns the location of the key and knows how to create and read it.
#[derive(Debug)]
pub struct KeyManager {
    key_path: PathBuf,
    env_key: Option<SecretString>,
}

impl KeyManager {
    /// Key manager for `key_path`, picking up `DEVKOOL_SECRET_KEY` if set.
    pub fn new(key_path: impl Into<PathBuf>) -> Self {
        let env_key = std::env::var(SECRET_KEY_ENV_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(SecretString::from);
        Self {
            key_path: key_path.into(),
            env_key,
        }
    }

    pub fn from_config(storage: &StorageConfig) -> Self {
        Self::new(storage.key_path())
    }

    /// Replace the environment-supplied key (`None` forces the file).
    pub fn with_env_key(mut self, env_key: Option<String>) -> Self {
        self.env_key = env_key
            .filter(|v| !v.trim().is_empty())
            .map(SecretString::from);
        self
    }

    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// Where [`load_key`](Self::load_key) would read from right now.
    pub fn source(&self) -> KeySource {
        if self.env_key.is_some() {
            KeySource::Environment
        } else if self.key_path.is_file() {
            KeySource::File
        } else {
            KeySource::Missing
        }
    }

    /// Create the key file if it does not exist yet.
    ///
    /// Returns `true` when a new key was written. An existing key file is
    /// never touched, and with an environment key nothing is written. The
    /// file is written to a temporary sibling (mode `0600` on Unix) and
    /// linked into place without replacing anything that appeared meanwhile.
    pub fn ensure_key(&self) -> Result<bool, DevkoolError> {
        if self.env_key.is_some() {
            debug!("key supplied via {SECRET_KEY_ENV_VAR}; not creating key file");
            return Ok(false);
        }
        if self.key_path.exists() {
            return Ok(false);
        }

        let dir = parent_dir(&self.key_path);
        std::fs::create_dir_all(dir).map_err(|source| DevkoolError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let key = SecretKey::generate()?;
        let io_err = |source: std::io::Error| DevkoolError::Io {
            path: self.key_path.clone(),
            source,
        };
        let mut tmp = tempfile::Builder::new()
            .prefix(".secret-key")
            .tempfile_in(dir)
            .map_err(io_err)?;
        tmp.write_all(key.expose()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;

        match tmp.persist_noclobber(&self.key_path) {
            Ok(_) => {
                info!(path = %self.key_path.display(), "generated new secret key");
                Ok(true)
            }
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(io_err(e.error)),
        }
    }

    /// Load the key from the environment or the key file.
    ///
    /// Fails with [`DevkoolError::KeyUnavailable`] when the key is missing,
    /// unreadable, or the wrong length.
    pub fn load_key(&self) -> Result<SecretKey, DevkoolError> {
        if let Some(encoded) = &self.env_key {
            let bytes = Zeroizing::new(STANDARD.decode(encoded.expose_secret().trim()).map_err(|e| {
                DevkoolError::KeyUnavailable(format!("{SECRET_KEY_ENV_VAR} is not valid base64: {e}"))
            })?);
            return SecretKey::from_bytes(&bytes).map_err(|e| {
                DevkoolError::KeyUnavailable(format!("{SECRET_KEY_ENV_VAR}: {e}"))
            });
        }

        let bytes = Zeroizing::new(std::fs::read(&self.key_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DevkoolError::KeyUnavailable(format!(
                    "no key at {}",
                    self.key_path.display()
                ))
            } else {
                DevkoolError::KeyUnavailable(format!(
                    "cannot read {}: {e}",
                    self.key_path.display()
                ))
            }
        })?);
        SecretKey::from_bytes(&bytes)
    }
}

/// Base64 encoding of a key, in the format `DEVKOOL_SECRET_KEY` expects.
pub fn encode_key(key: &SecretKey) -> String {
    STANDARD.encode(key.expose())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    fn file_manager(path: &Path) -> KeyManager {
        KeyManager::new(path).with_env_key(None)
    }

    #[test]
    fn ensure_key_creates_then_is_noop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("secret.key");
        let keys = file_manager(&path);

        assert_eq!(keys.source(), KeySource::Missing);
        assert!(keys.ensure_key().unwrap());
        let first = keys.load_key().unwrap();

        assert!(!keys.ensure_key().unwrap());
        let second = keys.load_key().unwrap();

        assert_eq!(first.expose(), second.expose());
        assert_eq!(keys.source(), KeySource::File);
        assert_eq!(std::fs::read(&path).unwrap().len(), KEY_LEN);
    }

    #[test]
    fn existing_key_is_never_overwritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secret.key");
        std::fs::write(&path, [7u8; KEY_LEN]).unwrap();

        let keys = file_manager(&path);
        assert!(!keys.ensure_key().unwrap());
        assert_eq!(keys.load_key().unwrap().expose(), &[7u8; KEY_LEN]);
    }

    #[test]
    fn load_without_key_is_unavailable() {
        let dir = tempdir().unwrap();
        let err = file_manager(&dir.path().join("secret.key"))
            .load_key()
            .unwrap_err();
        assert!(matches!(err, DevkoolError::KeyUnavailable(_)));
    }

    #[test]
    fn truncated_key_file_is_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secret.key");
        std::fs::write(&path, [1u8; 10]).unwrap();
        let err = file_manager(&path).load_key().unwrap_err();
        assert!(err.to_string().contains("exactly 32 bytes"));
    }

    #[cfg(unix)]
    #[test]
    fn key_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("secret.key");
        file_manager(&path).ensure_key().unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn env_key_wins_over_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secret.key");
        let encoded = STANDARD.encode([9u8; KEY_LEN]);
        let keys = KeyManager::new(&path).with_env_key(Some(encoded));

        assert_eq!(keys.source(), KeySource::Environment);
        assert!(!keys.ensure_key().unwrap());
        assert!(!path.exists(), "env key must not create a key file");
        assert_eq!(keys.load_key().unwrap().expose(), &[9u8; KEY_LEN]);
    }

    #[test]
    fn malformed_env_key_does_not_fall_back_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secret.key");
        std::fs::write(&path, [3u8; KEY_LEN]).unwrap();

        let keys = KeyManager::new(&path).with_env_key(Some("not base64!".to_string()));
        assert!(matches!(keys.load_key(), Err(DevkoolError::KeyUnavailable(_))));

        let short = KeyManager::new(&path).with_env_key(Some(STANDARD.encode([1u8; 16])));
        assert!(matches!(short.load_key(), Err(DevkoolError::KeyUnavailable(_))));
    }

    #[test]
    fn blank_env_key_is_ignored() {
        let keys = KeyManager::new("/nonexistent/secret.key").with_env_key(Some("  ".to_string()));
        assert_eq!(keys.source(), KeySource::Missing);
    }

    #[test]
    fn encode_key_round_trips_through_env() {
        let key = SecretKey::generate().unwrap();
        let keys = KeyManager::new("/unused").with_env_key(Some(encode_key(&key)));
        assert_eq!(keys.load_key().unwrap().expose(), key.expose());
    }

    #[test]
    fn debug_output_is_redacted() {
        let key = SecretKey::from_bytes(&[0xAB; KEY_LEN]).unwrap();
        let rendered = format!("{key:?}");
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains("171"));
    }

    #[test]
    fn manager_debug_hides_env_key() {
        let keys = KeyManager::new("/unused").with_env_key(Some("c2VjcmV0LWtleS1tYXRlcmlhbA==".to_string()));
        assert!(!format!("{keys:?}").contains("c2VjcmV0"));
    }

    #[test]
    #[serial]
    fn new_reads_env_var() {
        let key = SecretKey::generate().unwrap();
        // SAFETY: test-only env mutation, serialized with other env tests.
        unsafe { std::env::set_var(SECRET_KEY_ENV_VAR, encode_key(&key)) };
        let keys = KeyManager::new("/nonexistent/secret.key");
        unsafe { std::env::remove_var(SECRET_KEY_ENV_VAR) };

        assert_eq!(keys.source(), KeySource::Environment);
        assert_eq!(keys.load_key().unwrap().expose(), key.expose());
    }

    #[test]
    #[serial]
    fn new_ignores_empty_env_var() {
        unsafe { std::env::set_var(SECRET_KEY_ENV_VAR, "") };
        let keys = KeyManager::new("/nonexistent/secret.key");
        unsafe { std::env::remove_var(SECRET_KEY_ENV_VAR) };

        assert_eq!(keys.source(), KeySource::Missing);
    }
}
