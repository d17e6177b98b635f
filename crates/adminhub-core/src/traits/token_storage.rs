//! Raw bearer token persistence.

/// Backing storage for the single active bearer token.
///
/// This is the tab-scoped session storage equivalent: it holds at most
/// one token and never outlives the process. Implementations perform no
/// validation; decoding happens one layer up.
pub trait TokenStorage: Send + Sync + 'static {
    /// Returns the stored token, if any.
    fn load(&self) -> Option<String>;

    /// Overwrites the stored token.
    fn save(&self, token: &str);

    /// Removes the stored token. Removing an absent token is a no-op.
    fn remove(&self);
}
