pub mod canonical;
pub mod error;
pub mod hash;
pub mod keypair;

pub use canonical::{canonical_bytes, iso8601_millis, lower_hex};
pub use error::CryptoError;
pub use hash::{sha256, token_id, UserHash};
pub use keypair::{verify, KeyPair, PublicKeyBytes, SignatureBytes};
