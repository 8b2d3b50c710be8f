//! Unverified inspection of JWT access tokens.
//!
//! The client never validates signatures; it only reads `exp` to decide
//! whether a stored token is worth sending.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// Decode the payload segment of `token`. `None` when the token is not a
/// three-part JWT or its payload is not a JSON object.
pub fn parse_claims(token: &str) -> Option<Map<String, Value>> {
    let mut parts = token.split('.');
    let (_, payload, _) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    match serde_json::from_slice(&bytes).ok()? {
        Value::Object(claims) => Some(claims),
        _ => None,
    }
}

/// Unreadable tokens and tokens without `exp` count as expired.
pub fn is_token_expired(token: &str) -> bool {
    is_expired_at(token, OffsetDateTime::now_utc())
}

fn is_expired_at(token: &str, now: OffsetDateTime) -> bool {
    let Some(exp) = parse_claims(token)
        .as_ref()
        .and_then(|claims| claims.get("exp"))
        .and_then(Value::as_i64)
    else {
        return true;
    };
    exp <= now.unix_timestamp()
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn token(payload: &str) -> String {
        format!(
            "eyJhbGciOiJIUzI1NiJ9.{}.c2ln",
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn reads_claims() {
        let claims = parse_claims(&token(r#"{"sub":"u1","exp":1700000000}"#)).expect("claims");
        assert_eq!(claims.get("sub").and_then(Value::as_str), Some("u1"));
    }

    #[test]
    fn tolerates_padding() {
        let padded = format!(
            "h.{}==.s",
            URL_SAFE_NO_PAD.encode(r#"{"exp":1}"#)
        );
        assert!(parse_claims(&padded).is_some());
    }

    #[test]
    fn expiry_is_compared_to_now() {
        let now = datetime!(2024-01-01 00:00 UTC);
        let future = token(&format!(r#"{{"exp":{}}}"#, now.unix_timestamp() + 60));
        let past = token(&format!(r#"{{"exp":{}}}"#, now.unix_timestamp() - 60));
        assert!(!is_expired_at(&future, now));
        assert!(is_expired_at(&past, now));
    }

    #[test]
    fn garbage_counts_as_expired() {
        assert!(is_token_expired("not-a-jwt"));
        assert!(is_token_expired(&token(r#"{"sub":"no-exp"}"#)));
        assert!(is_token_expired(&token("[1,2]")));
    }
}
