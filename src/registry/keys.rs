//! Slice key registry.

use crate::error::{Result, SliceError};
use crate::types::{SliceKey, Timestamp, TYPE_SEPARATOR};
use parking_lot::Mutex;
use std::collections::HashSet;

/// Registered keys plus the last tick handed out for a derived key.
#[derive(Debug, Default)]
struct KeyIndex {
    keys: HashSet<String>,
    last_tick: Option<u64>,
}

/// Set of slice keys in use.
///
/// Keys are only ever added; [`KeyRegistry::reset`] exists for tests that
/// want a clean namespace. Checking and inserting happen under one lock, so
/// concurrent construction cannot hand out the same key twice.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    index: Mutex<KeyIndex>,
}

impl KeyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the key for a new slice.
    ///
    /// An explicit non-empty key is used as-is; otherwise one is derived from
    /// the clock.
    pub fn derive_key(&self, explicit: Option<&str>) -> Result<SliceKey> {
        match explicit {
            Some(key) if !key.is_empty() => self.register(key),
            _ => Ok(self.derive()),
        }
    }

    /// Register an explicit key.
    ///
    /// Keys may not contain the type separator: `A` owning `X_MERGE` and
    /// `A_X` owning `MERGE` would both claim `A_X_MERGE`.
    pub fn register(&self, key: &str) -> Result<SliceKey> {
        if key.contains(TYPE_SEPARATOR) {
            return Err(SliceError::InvalidKey {
                key: key.to_string(),
                reason: format!("contains the type separator '{}'", TYPE_SEPARATOR),
            });
        }

        let mut index = self.index.lock();

        if !index.keys.insert(key.to_string()) {
            return Err(SliceError::DuplicateKey(key.to_string()));
        }

        tracing::debug!(key, "registered slice key");
        Ok(SliceKey::new(key))
    }

    /// Derive and register a key from the current time.
    ///
    /// The tick always advances past the previous derived key, so slices
    /// created within the same millisecond still get distinct keys. Ticks
    /// whose encoding is already taken by an explicit key are skipped.
    pub fn derive(&self) -> SliceKey {
        let mut index = self.index.lock();

        let now = Timestamp::now().0;
        let mut tick = match index.last_tick {
            Some(last) => now.max(last + 1),
            None => now,
        };
        let mut key = encode_base36(tick);
        while index.keys.contains(&key) {
            tick += 1;
            key = encode_base36(tick);
        }

        index.last_tick = Some(tick);
        index.keys.insert(key.clone());

        tracing::debug!(key = %key, tick, "derived slice key");
        SliceKey::new(key)
    }

    /// Check whether a key is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.index.lock().keys.contains(key)
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.index.lock().keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.index.lock().keys.iter().cloned().collect();
        keys.sort();
        keys
    }

    /// Forget every key and the derivation clock.
    pub fn reset(&self) {
        let mut index = self.index.lock();
        let cleared = index.keys.len();
        *index = KeyIndex::default();
        tracing::debug!(cleared, "key registry reset");
    }
}

/// Upper-case base-36 rendering of `n`.
pub fn encode_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    if n == 0 {
        return "0".to_string();
    }

    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8_lossy(&buf).into_owned()
}
