//! API key storage.

use std::fmt;
use std::sync::{PoisonError, RwLock};

/// Holder for the single API key a client authenticates with.
///
/// The key can be replaced at any time through a shared reference. A request
/// reads the key once, when it builds its headers, so a concurrent [`set`]
/// affects only requests that start afterwards.
///
/// [`set`]: Credentials::set
pub struct Credentials {
    api_key: RwLock<String>,
}

impl Credentials {
    /// Creates a holder with the given key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: RwLock::new(api_key.into()),
        }
    }

    /// Returns a copy of the current key.
    #[must_use]
    pub fn get(&self) -> String {
        self.api_key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the key. The format is not validated.
    pub fn set(&self, api_key: impl Into<String>) {
        *self
            .api_key
            .write()
            .unwrap_or_else(PoisonError::into_inner) = api_key.into();
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}
