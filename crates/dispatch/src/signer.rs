//! HMAC-SHA256 signing of outbound order-signal posts.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const TIMESTAMP_HEADER: &str = "X-Timestamp";
pub const SIGNATURE_HEADER: &str = "X-Signature";

/// The two headers accompanying a signed post.
#[derive(Debug, Clone)]
pub struct SignedHeaders {
    pub timestamp: String,
    pub signature: String,
}

/// Signs dispatch bodies with a shared secret.
///
/// The secret is wrapped in `SecretString` so it is zeroized on drop and
/// never shows up in debug output.
pub struct SignalSigner {
    secret: SecretString,
}

impl SignalSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::from(secret.into()),
        }
    }

    /// `HMAC_SHA256(secret, timestamp + "\n" + body)`, lowercase hex.
    pub fn sign(&self, timestamp: &str, body: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(timestamp.as_bytes());
        mac.update(b"\n");
        mac.update(body.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Sign a body against the current wall clock, producing both headers.
    pub fn headers_for(&self, body: &str) -> SignedHeaders {
        let timestamp = chrono::Utc::now().timestamp_millis().to_string();
        let signature = self.sign(&timestamp, body);
        SignedHeaders {
            timestamp,
            signature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_deterministic() {
        let signer = SignalSigner::new("secret");
        let a = signer.sign("1700000000000", r#"{"symbol":"BTCUSDT"}"#);
        let b = signer.sign("1700000000000", r#"{"symbol":"BTCUSDT"}"#);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_timestamp_is_part_of_the_message() {
        let signer = SignalSigner::new("secret");
        let body = r#"{"symbol":"BTCUSDT"}"#;
        assert_ne!(
            signer.sign("1700000000000", body),
            signer.sign("1700000000001", body)
        );
    }

    #[test]
    fn test_newline_separator_prevents_ambiguity() {
        let signer = SignalSigner::new("secret");
        // "1" + "\n" + "23" must not collide with "12" + "\n" + "3".
        assert_ne!(signer.sign("1", "23"), signer.sign("12", "3"));
    }

    #[test]
    fn test_headers_for_verifies() {
        let signer = SignalSigner::new("secret");
        let body = r#"{"x":1}"#;
        let headers = signer.headers_for(body);
        assert_eq!(signer.sign(&headers.timestamp, body), headers.signature);
    }
}
