use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 digest of arbitrary bytes.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// 32-byte SHA-256 hash of a canonical user id, used as the account key
/// everywhere above the ledger (never the raw user id).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserHash(pub [u8; 32]);

impl UserHash {
    pub fn of_user_id(user_id: &str) -> Self {
        Self(sha256(user_id.as_bytes()))
    }

    pub fn from_bytes(b: [u8; 32]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let mut arr = [0u8; 32];
        if bytes.len() == 32 {
            arr.copy_from_slice(&bytes);
        }
        Ok(Self(arr))
    }
}

impl fmt::Display for UserHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for UserHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserHash({}…)", &self.to_hex()[..8])
    }
}

/// Generate a fresh random token id: 16 random bytes, lowercase hex.
pub fn token_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_hash_is_deterministic() {
        let a = UserHash::of_user_id("alice");
        let b = UserHash::of_user_id("alice");
        assert_eq!(a, b);
        let c = UserHash::of_user_id("bob");
        assert_ne!(a, c);
    }

    #[test]
    fn token_id_is_16_bytes_hex() {
        let id = token_id();
        assert_eq!(id.len(), 32);
        assert!(hex::decode(&id).is_ok());
    }

    #[test]
    fn user_hash_hex_round_trip() {
        let h = UserHash::of_user_id("carol");
        let round = UserHash::from_hex(&h.to_hex()).unwrap();
        assert_eq!(h, round);
    }
}
