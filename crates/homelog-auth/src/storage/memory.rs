use std::sync::{Mutex, PoisonError};

use super::{StoredTokens, TokenStorage};
use crate::Result;

/// Process-local token storage.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    tokens: Mutex<StoredTokens>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage pre-filled with `tokens`.
    pub fn with_tokens(tokens: StoredTokens) -> Self {
        Self {
            tokens: Mutex::new(tokens),
        }
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<StoredTokens> {
        Ok(self.tokens.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, tokens: &StoredTokens) -> Result<()> {
        *self.tokens.lock().unwrap_or_else(PoisonError::into_inner) = tokens.clone();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.tokens.lock().unwrap_or_else(PoisonError::into_inner) = StoredTokens::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_clear() {
        let storage = MemoryTokenStorage::new();
        assert!(storage.load().unwrap().is_empty());

        let tokens = StoredTokens::new("id".into(), "perm".into());
        storage.save(&tokens).unwrap();
        assert_eq!(storage.load().unwrap(), tokens);

        storage.clear().unwrap();
        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_empty());
    }
}
