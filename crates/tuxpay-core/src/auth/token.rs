//! Bearer token decoding.
//!
//! Tokens issued by the server are HS256 JWTs. The client never verifies the
//! signature (it has no secret); it only reads the payload to learn when the
//! token expires. Anything that cannot be decoded is treated as "no claims".

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Header segment the server strips from invoice tokens to keep URLs short.
const SHORT_TOKEN_HEADER: &str = r#"{"typ":"JWT","alg":"HS256"}"#;

/// Claims carried by an admin bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Claims {
    /// Expiry in seconds since the epoch. The server emits a float.
    #[serde(default)]
    pub exp: Option<f64>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Claims {
    /// Expiry as epoch milliseconds, if the claim is present and finite.
    pub fn expires_at_millis(&self) -> Option<i64> {
        self.exp
            .filter(|exp| exp.is_finite())
            .map(|exp| (exp * 1000.0) as i64)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at_millis()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    /// Read the known claims out of a decoded payload object.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let object = payload.as_object()?;
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);
        Some(Self {
            exp: object.get("exp").and_then(Value::as_f64),
            id: object.get("id").and_then(Value::as_i64),
            email: text("email"),
            name: text("name"),
        })
    }

    /// Whether the token is still valid at `now`. A missing expiry never is.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at_millis()
            .map(|exp_ms| exp_ms > now.timestamp_millis())
            .unwrap_or(false)
    }
}

/// Decode one base64 segment, accepting both the URL-safe and the standard
/// alphabet, with or without padding.
fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    let trimmed = segment.trim_end_matches('=');
    URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
        .ok()
}

/// Decode the payload of a `header.payload.signature` token.
///
/// Returns `None` for a wrong segment count, invalid base64, or a payload
/// that is not a JSON object. Claims of an unexpected type are left empty
/// rather than rejecting the whole token.
pub fn decode_claims(token: &str) -> Option<Claims> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return None;
    }
    let payload: Value = serde_json::from_slice(&decode_segment(segments[1])?).ok()?;
    Claims::from_payload(&payload)
}

/// Rebuild the full token from an invoice token whose header was dropped.
pub fn expand_short_token(short: &str) -> String {
    format!("{}.{}", URL_SAFE_NO_PAD.encode(SHORT_TOKEN_HEADER), short)
}

/// Decode the payload of a short (`payload.signature`) invoice token.
pub fn decode_short_claims(short: &str) -> Option<Value> {
    let segments: Vec<&str> = short.split('.').collect();
    if segments.len() != 2 {
        return None;
    }
    let payload = decode_segment(segments[0])?;
    serde_json::from_slice(&payload).ok()
}


#[cfg(test)]
mod tests {
    use super::test_tokens::*;
    use super::*;

    #[test]
    fn test_decode_claims_reads_server_payload() {
        let token = token_expiring_at(1_700_000_000.5);
        let claims = decode_claims(&token).expect("claims should decode");
        assert_eq!(claims.id, Some(1));
        assert_eq!(claims.email.as_deref(), Some("admin@example.com"));
        assert_eq!(claims.expires_at_millis(), Some(1_700_000_000_500));
    }

    #[test]
    fn test_decode_claims_accepts_standard_alphabet_and_padding() {
        // Encodes with '+' and trailing padding in the standard alphabet
        let payload = r#"{"exp":4102444800,"name":">>>"}"#;
        let token = format!("h.{}.s", base64::engine::general_purpose::STANDARD.encode(payload));
        let claims = decode_claims(&token).expect("claims should decode");
        assert_eq!(claims.exp, Some(4_102_444_800.0));
    }

    #[test]
    fn test_decode_claims_rejects_malformed_tokens() {
        assert!(decode_claims("").is_none());
        assert!(decode_claims("only-one-segment").is_none());
        assert!(decode_claims("two.segments").is_none());
        assert!(decode_claims("a.b.c.d").is_none());
        assert!(decode_claims("header.!!!not-base64!!!.sig").is_none());
        let not_json = format!("h.{}.s", URL_SAFE_NO_PAD.encode("not json"));
        assert!(decode_claims(&not_json).is_none());
        let not_object = format!("h.{}.s", URL_SAFE_NO_PAD.encode(r#""just a string""#));
        assert!(decode_claims(&not_object).is_none());
    }

    #[test]
    fn test_claims_of_other_types_do_not_block_expiry() {
        let exp = Utc::now().timestamp() + 3600;
        for payload in [
            format!(r#"{{"exp":{},"id":"u-42"}}"#, exp),
            format!(r#"{{"exp":{},"name":7,"email":null}}"#, exp),
            format!(r#"{{"exp":{},"roles":["admin"],"iat":"yesterday"}}"#, exp),
        ] {
            let claims = decode_claims(&token_with_payload(&payload)).expect("object payload should decode");
            assert!(claims.is_valid_at(Utc::now()), "payload {} should be valid", payload);
        }

        let claims = decode_claims(&token_with_payload(&format!(r#"{{"exp":{},"id":"u-42","name":7}}"#, exp))).unwrap();
        assert_eq!(claims.id, None);
        assert_eq!(claims.name, None);

        // Only a numeric exp counts
        let claims = decode_claims(&token_with_payload(r#"{"exp":"4102444800"}"#)).unwrap();
        assert!(!claims.is_valid_at(Utc::now()));
    }

    #[test]
    fn test_claims_validity() {
        let now = Utc::now();
        assert!(decode_claims(&fresh_token()).unwrap().is_valid_at(now));
        assert!(!decode_claims(&expired_token()).unwrap().is_valid_at(now));
        assert!(!Claims::default().is_valid_at(now)); // no exp claim
    }

    #[test]
    fn test_short_token_round_trip() {
        // Short token as issued for invoice #6
        let short = "eyJpZCI6Nn0.kqGv1YFHpoENA0iIwm_1BopND6KsIzuNYaKTDX_xV1Q";
        let claims = decode_short_claims(short).expect("short claims should decode");
        assert_eq!(claims["id"], 6);

        let full = expand_short_token(short);
        assert_eq!(full.split('.').count(), 3);
        assert!(full.ends_with(short));
        assert!(decode_short_claims("a.b.c").is_none());
    }
}
