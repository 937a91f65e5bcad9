//! Signature and freshness checks for inbound Events API requests.
//!
//! Slack signs every request with `v0=hex(HMAC-SHA256(secret, "v0:{ts}:{body}"))`.
//! The check must run against the raw body bytes exactly as received.

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use slackmate_core::{Error, Result};
use subtle::ConstantTimeEq;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_VERSION: &str = "v0";
pub const DEFAULT_TOLERANCE_SECS: u64 = 300;

const TIMESTAMP_HEADERS: &[&str] = &["x-slack-request-timestamp", "x-request-timestamp"];
const SIGNATURE_HEADERS: &[&str] = &["x-slack-signature", "x-request-signature"];

#[derive(Clone)]
pub struct RequestVerifier {
    signing_secret: String,
    tolerance_secs: u64,
}

impl std::fmt::Debug for RequestVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestVerifier")
            .field("tolerance_secs", &self.tolerance_secs)
            .finish_non_exhaustive()
    }
}

impl RequestVerifier {
    pub fn new(signing_secret: impl Into<String>) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    pub fn with_tolerance(mut self, tolerance_secs: u64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    pub fn verify(&self, headers: &HeaderMap, body: &[u8]) -> bool {
        self.verify_at(headers, body, chrono::Utc::now().timestamp())
    }

    pub fn verify_at(&self, headers: &HeaderMap, body: &[u8], now: i64) -> bool {
        self.check_at(headers, body, now).is_ok()
    }

    /// Like [`verify`](Self::verify) but reports why a request was rejected.
    pub fn check(&self, headers: &HeaderMap, body: &[u8]) -> Result<()> {
        self.check_at(headers, body, chrono::Utc::now().timestamp())
    }

    pub fn check_at(&self, headers: &HeaderMap, body: &[u8], now: i64) -> Result<()> {
        let timestamp = header_value(headers, TIMESTAMP_HEADERS)
            .ok_or_else(|| Error::Authentication("missing timestamp header".to_string()))?;
        let signature = header_value(headers, SIGNATURE_HEADERS)
            .ok_or_else(|| Error::Authentication("missing signature header".to_string()))?;

        let ts: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| Error::Authentication("timestamp is not an integer".to_string()))?;

        if now.abs_diff(ts) > self.tolerance_secs {
            debug!(ts, now, "Request timestamp outside replay window");
            return Err(Error::Authentication("timestamp out of range".to_string()));
        }

        let expected = self.sign(timestamp, body)?;
        if !bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            return Err(Error::Authentication("signature mismatch".to_string()));
        }

        Ok(())
    }

    /// Signature Slack would send for `body` at `timestamp`.
    pub fn sign(&self, timestamp: &str, body: &[u8]) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .map_err(|e| Error::Authentication(format!("invalid signing key: {}", e)))?;
        mac.update(SIGNATURE_VERSION.as_bytes());
        mac.update(b":");
        mac.update(timestamp.as_bytes());
        mac.update(b":");
        mac.update(body);
        let digest = mac.finalize().into_bytes();
        Ok(format!("{}={}", SIGNATURE_VERSION, hex::encode(digest)))
    }
}

fn header_value<'a>(headers: &'a HeaderMap, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";
    const NOW: i64 = 1_531_420_618;

    fn signed_headers(verifier: &RequestVerifier, ts: i64, body: &[u8]) -> HeaderMap {
        let ts = ts.to_string();
        let sig = verifier.sign(&ts, body).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("X-Slack-Request-Timestamp", HeaderValue::from_str(&ts).unwrap());
        headers.insert("X-Slack-Signature", HeaderValue::from_str(&sig).unwrap());
        headers
    }

    #[test]
    fn test_accepts_fresh_signed_request() {
        let v = RequestVerifier::new(SECRET);
        let body = br#"{"type":"event_callback"}"#;
        let headers = signed_headers(&v, NOW - 10, body);
        assert!(v.verify_at(&headers, body, NOW));
    }

    #[test]
    fn test_known_signature_vector() {
        // Example request published in Slack's signing documentation.
        let v = RequestVerifier::new(SECRET);
        let body = b"token=xyzz0WbapA4vBCDEFasx0q6G&team_id=T1DC2JH3J&team_domain=testteamnow&channel_id=G8PSS9T3V&channel_name=foobar&user_id=U2CERLKJA&user_name=roadrunner&command=%2Fwebhook-collect&text=&response_url=https%3A%2F%2Fhooks.slack.com%2Fcommands%2FT1DC2JH3J%2F397700885554%2F96rGlfmibIGlgcZRskXaIFfN&trigger_id=398738663015.47445629121.803a0bc887a14d10d2c447fce8b6703c";
        assert_eq!(
            v.sign("1531420618", body).unwrap(),
            "v0=a2114d57b48eac39b9ad189dd8316235a7b4a8d21a10bd27519666489c69b503"
        );
    }

    #[test]
    fn test_stale_timestamp_rejected_even_with_valid_signature() {
        let v = RequestVerifier::new(SECRET);
        let body = b"{}";
        let headers = signed_headers(&v, NOW - 301, body);
        assert!(!v.verify_at(&headers, body, NOW));

        let headers = signed_headers(&v, NOW + 301, body);
        assert!(!v.verify_at(&headers, body, NOW));

        let headers = signed_headers(&v, NOW - 300, body);
        assert!(v.verify_at(&headers, body, NOW));
    }

    #[test]
    fn test_missing_headers_fail_closed() {
        let v = RequestVerifier::new(SECRET);
        let mut headers = HeaderMap::new();
        assert!(!v.verify_at(&headers, b"{}", NOW));
        headers.insert("X-Slack-Request-Timestamp", HeaderValue::from(NOW));
        let err = v.check_at(&headers, b"{}", NOW).unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
    }

    #[test]
    fn test_length_mismatch_is_invalid_not_panic() {
        let v = RequestVerifier::new(SECRET);
        let mut headers = HeaderMap::new();
        headers.insert("X-Slack-Request-Timestamp", HeaderValue::from(NOW));
        headers.insert("X-Slack-Signature", HeaderValue::from_static("v0=abc"));
        assert!(!v.verify_at(&headers, b"{}", NOW));
    }

    #[test]
    fn test_reserialized_body_fails() {
        let v = RequestVerifier::new(SECRET);
        let raw = br#"{"type": "event_callback",  "event": {}}"#;
        let headers = signed_headers(&v, NOW, raw);
        let value: serde_json::Value = serde_json::from_slice(raw).unwrap();
        let reserialized = serde_json::to_vec(&value).unwrap();
        assert!(!v.verify_at(&headers, &reserialized, NOW));
    }

    #[test]
    fn test_generic_header_names_accepted() {
        let v = RequestVerifier::new(SECRET);
        let body = b"{}";
        let sig = v.sign(&NOW.to_string(), body).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("X-Request-Timestamp", HeaderValue::from(NOW));
        headers.insert("X-Request-Signature", HeaderValue::from_str(&sig).unwrap());
        assert!(v.verify_at(&headers, body, NOW));
    }

    #[test]
    fn test_non_integer_timestamp_rejected() {
        let v = RequestVerifier::new(SECRET);
        let mut headers = HeaderMap::new();
        headers.insert("X-Slack-Request-Timestamp", HeaderValue::from_static("soon"));
        headers.insert("X-Slack-Signature", HeaderValue::from_static("v0=00"));
        assert!(!v.verify_at(&headers, b"{}", NOW));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let signer = RequestVerifier::new("other-secret");
        let v = RequestVerifier::new(SECRET);
        let headers = signed_headers(&signer, NOW, b"{}");
        assert!(!v.verify_at(&headers, b"{}", NOW));
    }

    #[test]
    fn test_custom_tolerance() {
        let v = RequestVerifier::new(SECRET).with_tolerance(30);
        let headers = signed_headers(&v, NOW - 31, b"{}");
        assert!(!v.verify_at(&headers, b"{}", NOW));
    }
}
