//! Single source of truth for the current bearer token.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use adminhub_core::traits::TokenStorage;

use super::claims::Claims;
use super::decoder::decode_claims;
use super::memory::MemoryTokenStorage;

/// Owns the active bearer token and the session generation counter.
///
/// The generation increases on every `set_token` and on every
/// `clear_token` that actually removes a token. Asynchronous writers
/// (the refresh scheduler) capture the generation before they start and
/// apply their result through [`TokenStore::replace_if_generation`], so a
/// result that arrives after a logout or a new login is dropped instead of
/// resurrecting a stale session.
pub struct TokenStore {
    /// Underlying token storage.
    storage: Arc<dyn TokenStorage>,
    /// Session generation. The lock also serializes storage writes.
    generation: Mutex<u64>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("generation", &self.generation())
            .field("has_token", &self.has_token())
            .finish()
    }
}

impl TokenStore {
    /// Creates a store over the given storage backend.
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            storage,
            generation: Mutex::new(0),
        }
    }

    /// Creates a store over fresh in-memory storage.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStorage::new()))
    }

    fn lock(&self) -> MutexGuard<'_, u64> {
        self.generation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrites any existing token. No validation is performed.
    pub fn set_token(&self, token: impl AsRef<str>) {
        let mut generation = self.lock();
        self.storage.save(token.as_ref());
        *generation += 1;
        debug!(generation = *generation, "Session token stored");
    }

    /// Returns the current token, if any.
    pub fn get_token(&self) -> Option<String> {
        let _generation = self.lock();
        self.storage.load()
    }

    /// Returns `true` if a token is stored (well-formed or not).
    pub fn has_token(&self) -> bool {
        self.get_token().is_some()
    }

    /// Removes the token. Clearing an empty store changes nothing.
    pub fn clear_token(&self) {
        let mut generation = self.lock();
        if self.storage.load().is_some() {
            self.storage.remove();
            *generation += 1;
            debug!(generation = *generation, "Session token cleared");
        }
    }

    /// Current session generation.
    pub fn generation(&self) -> u64 {
        *self.lock()
    }

    /// Decodes the current token's claims.
    ///
    /// Returns `None` for a missing token or any structural failure. An
    /// expired but well-formed token still decodes; see
    /// [`TokenStore::active_claims`] for the expiry-aware view.
    pub fn decode(&self) -> Option<Claims> {
        self.decode_with_generation().map(|(_, claims)| claims)
    }

    /// Decodes the current token together with the generation it was read at.
    pub fn decode_with_generation(&self) -> Option<(u64, Claims)> {
        let (generation, token) = {
            let generation = self.lock();
            (*generation, self.storage.load()?)
        };

        match decode_claims(&token) {
            Ok(claims) => Some((generation, claims)),
            Err(e) => {
                debug!(generation, error = %e, "Stored session token is malformed");
                None
            }
        }
    }

    /// Claims of a session that has not yet expired at `now_ms`.
    pub fn active_claims(&self, now_ms: i64) -> Option<Claims> {
        self.decode().filter(|claims| !claims.is_expired_at(now_ms))
    }

    /// Stores `token` only if the generation is still `expected`.
    ///
    /// Returns `true` if the token was applied.
    pub fn replace_if_generation(&self, expected: u64, token: impl AsRef<str>) -> bool {
        let mut generation = self.lock();
        if *generation != expected {
            debug!(
                expected,
                current = *generation,
                "Dropping token write from a superseded session"
            );
            return false;
        }
        self.storage.save(token.as_ref());
        *generation += 1;
        true
    }
}
