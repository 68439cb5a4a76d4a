//! Content-addressed fingerprinting (C2).
//!
//! Used only to answer "same bytes?" when the incremental writer decides
//! whether to rewrite a file. No cross-implementation stability is required;
//! SHA-256 is the reference choice for its negligible collision probability.

use sha2::{Digest, Sha256};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn of_str(s: &str) -> Self {
        Self::of_bytes(s.as_bytes())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_bytes_same_hash() {
        assert_eq!(ContentHash::of_str("hello"), ContentHash::of_str("hello"));
    }

    #[test]
    fn different_bytes_different_hash() {
        assert_ne!(ContentHash::of_str("hello"), ContentHash::of_str("world"));
    }

    #[test]
    fn empty_input_is_stable() {
        assert_eq!(ContentHash::of_bytes(&[]), ContentHash::of_bytes(&[]));
    }
}
