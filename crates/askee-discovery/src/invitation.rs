use askee_crypto::keypair::{PublicKeyBytes, SignatureBytes};
use askee_crypto::{canonical_bytes, sha256};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::DiscoveryError;

/// The three channels a user may opt in on. Wire strings match §4.C.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "DNS")]
    Dns,
    WellKnown,
    #[serde(rename = "QR")]
    Qr,
}

/// The JSON body carried inside a discovery signal, before base64/hash
/// wrapping.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiscoverySignalPayload {
    pub user_id: String,
    pub channel: Channel,
    pub public_key: PublicKeyBytes,
    pub timestamp: i64,
}

const SIGNAL_PREFIX: &str = "askee-discovery";

/// Encode a payload as `askee-discovery:<base64(json)>:<sha256(json)>`.
pub fn encode_signal(payload: &DiscoverySignalPayload) -> Result<String, DiscoveryError> {
    let json = serde_json::to_vec(payload)
        .map_err(|e| DiscoveryError::MalformedSignal(e.to_string()))?;
    let digest = hex::encode(sha256(&json));
    let encoded = BASE64.encode(&json);
    Ok(format!("{SIGNAL_PREFIX}:{encoded}:{digest}"))
}

/// Decode and verify the integrity of a discovery signal: recomputes the
/// hash over the embedded JSON and checks it against the trailing segment.
pub fn decode_signal(signal: &str) -> Result<DiscoverySignalPayload, DiscoveryError> {
    let mut parts = signal.splitn(3, ':');
    let prefix = parts
        .next()
        .ok_or_else(|| DiscoveryError::MalformedSignal("empty signal".into()))?;
    let encoded = parts
        .next()
        .ok_or_else(|| DiscoveryError::MalformedSignal("missing payload segment".into()))?;
    let claimed_digest = parts
        .next()
        .ok_or_else(|| DiscoveryError::MalformedSignal("missing digest segment".into()))?;

    if prefix != SIGNAL_PREFIX {
        return Err(DiscoveryError::MalformedSignal(format!(
            "unexpected prefix {prefix}"
        )));
    }

    let json = BASE64
        .decode(encoded)
        .map_err(|e| DiscoveryError::MalformedSignal(e.to_string()))?;

    let actual_digest = hex::encode(sha256(&json));
    if actual_digest != claimed_digest {
        return Err(DiscoveryError::HashMismatch);
    }

    serde_json::from_slice(&json).map_err(|e| DiscoveryError::MalformedSignal(e.to_string()))
}

/// The canonical tuple signed by the issuer when recording a verified
/// invitation (§4.C: "signed over the canonical `{user_id, channel,
/// verified_at}` tuple").
#[derive(Serialize)]
struct InvitationSigningPayload<'a> {
    user_id: &'a str,
    channel: Channel,
    verified_at: i64,
}

/// A recorded, signed proof that a user completed the opt-in handshake on
/// a named channel. Unique per `(user_id, channel)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerifiedInvitation {
    pub user_id: String,
    pub channel: Channel,
    pub verified_at: i64,
    pub issuer_signature: SignatureBytes,
}

impl VerifiedInvitation {
    pub fn signing_bytes(user_id: &str, channel: Channel, verified_at: i64) -> Result<Vec<u8>, DiscoveryError> {
        canonical_bytes(&InvitationSigningPayload {
            user_id,
            channel,
            verified_at,
        })
        .map_err(DiscoveryError::Crypto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askee_crypto::KeyPair;

    #[test]
    fn signal_round_trips() {
        let kp = KeyPair::generate();
        let payload = DiscoverySignalPayload {
            user_id: "alice".to_string(),
            channel: Channel::Dns,
            public_key: kp.public_key.clone(),
            timestamp: 1_700_000_000,
        };
        let signal = encode_signal(&payload).unwrap();
        assert!(signal.starts_with("askee-discovery:"));
        let decoded = decode_signal(&signal).unwrap();
        assert_eq!(decoded.user_id, "alice");
        assert_eq!(decoded.timestamp, 1_700_000_000);
    }

    #[test]
    fn tampered_signal_rejected() {
        let kp = KeyPair::generate();
        let payload = DiscoverySignalPayload {
            user_id: "bob".to_string(),
            channel: Channel::Qr,
            public_key: kp.public_key.clone(),
            timestamp: 1,
        };
        let mut signal = encode_signal(&payload).unwrap();
        signal.push('x');
        assert!(decode_signal(&signal).is_err());
    }

    proptest::proptest! {
        #[test]
        fn arbitrary_user_id_round_trips(user_id in "[a-zA-Z0-9_-]{1,64}", timestamp in 0i64..4_000_000_000i64) {
            let kp = KeyPair::generate();
            let payload = DiscoverySignalPayload {
                user_id: user_id.clone(),
                channel: Channel::WellKnown,
                public_key: kp.public_key.clone(),
                timestamp,
            };
            let signal = encode_signal(&payload).unwrap();
            let decoded = decode_signal(&signal).unwrap();
            proptest::prop_assert_eq!(decoded.user_id, user_id);
            proptest::prop_assert_eq!(decoded.timestamp, timestamp);
        }
    }
}
