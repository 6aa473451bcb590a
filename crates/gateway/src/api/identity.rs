//! Caller identity extraction from bearer credentials.
//!
//! Splits the JWT into its three segments, decodes the claims from the
//! middle segment (base64url, padding-agnostic), and checks expiry and
//! subject. When an HS256 secret is configured the signature over
//! `header.payload` is verified with a constant-time comparison; without
//! one the resolver is decode-only and trusts that a proxy verified the
//! credential upstream (the gateway warns about this at startup).

use axum::http::HeaderMap;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The `sub` claim — doubles as the profile id.
    pub subject: String,
    pub email: Option<String>,
}

/// Credential failures. All map to 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("Missing Authorization header")]
    MissingCredential,

    #[error("credential must have 3 dot-separated segments with a decodable payload")]
    MalformedCredential,

    #[error("credential has expired")]
    ExpiredCredential,

    #[error("credential is missing 'sub' (subject)")]
    MissingSubject,

    #[error("credential signature verification failed")]
    InvalidSignature,
}

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    exp: Option<i64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Resolution
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Extract the bearer token from request headers and resolve the caller
/// identity.
pub fn authenticate(
    headers: &HeaderMap,
    secret: Option<&[u8]>,
    now: DateTime<Utc>,
) -> Result<Identity, IdentityError> {
    let header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(IdentityError::MissingCredential)?;

    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .unwrap_or(header)
        .trim();
    if token.is_empty() {
        return Err(IdentityError::MissingCredential);
    }

    resolve_identity(token, secret, now)
}

/// Resolve a raw credential string into an [`Identity`].
pub fn resolve_identity(
    token: &str,
    secret: Option<&[u8]>,
    now: DateTime<Utc>,
) -> Result<Identity, IdentityError> {
    let parts: Vec<&str> = token.split('.').collect();
    let &[header, payload, signature] = parts.as_slice() else {
        return Err(IdentityError::MalformedCredential);
    };

    if let Some(secret) = secret {
        verify_signature(header, payload, signature, secret)?;
    }

    let claims_bytes =
        decode_segment(payload).map_err(|_| IdentityError::MalformedCredential)?;
    let claims: Claims = serde_json::from_slice(&claims_bytes)
        .map_err(|_| IdentityError::MalformedCredential)?;

    if let Some(exp) = claims.exp {
        if exp < now.timestamp() {
            return Err(IdentityError::ExpiredCredential);
        }
    }

    let subject = claims
        .sub
        .filter(|s| !s.is_empty())
        .ok_or(IdentityError::MissingSubject)?;

    Ok(Identity {
        subject,
        email: claims.email,
    })
}

/// Decode one base64url segment regardless of padding.
fn decode_segment(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(segment.trim_end_matches('='))
}

/// Verify the HS256 signature over `header.payload` in constant time.
fn verify_signature(
    header: &str,
    payload: &str,
    signature: &str,
    secret: &[u8],
) -> Result<(), IdentityError> {
    let provided =
        decode_segment(signature).map_err(|_| IdentityError::MalformedCredential)?;

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|_| IdentityError::InvalidSignature)?;
    mac.update(header.as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    let expected = mac.finalize().into_bytes();

    if bool::from(expected.as_slice().ct_eq(&provided)) {
        Ok(())
    } else {
        Err(IdentityError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    fn encode(value: &serde_json::Value) -> String {
        URL_SAFE_NO_PAD.encode(value.to_string())
    }

    fn sign(header: &str, payload: &str, secret: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret).unwrap();
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }

    fn token(claims: serde_json::Value, secret: &[u8]) -> String {
        let header = encode(&serde_json::json!({"alg": "HS256", "typ": "JWT"}));
        let payload = encode(&claims);
        let signature = sign(&header, &payload, secret);
        format!("{header}.{payload}.{signature}")
    }

    fn now() -> DateTime<Utc> {
        "2026-08-06T12:00:00Z".parse().unwrap()
    }

    fn future_exp() -> i64 {
        now().timestamp() + 3600
    }

    #[test]
    fn valid_token_resolves_subject_and_email() {
        let t = token(
            serde_json::json!({"sub": "u1", "email": "a@b.c", "exp": future_exp()}),
            SECRET,
        );
        let identity = resolve_identity(&t, None, now()).unwrap();
        assert_eq!(identity.subject, "u1");
        assert_eq!(identity.email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn two_segments_is_malformed() {
        let err = resolve_identity("abc.def", None, now()).unwrap_err();
        assert_eq!(err, IdentityError::MalformedCredential);
    }

    #[test]
    fn garbage_payload_is_malformed() {
        let err = resolve_identity("aaa.%%%%.ccc", None, now()).unwrap_err();
        assert_eq!(err, IdentityError::MalformedCredential);
    }

    #[test]
    fn expired_token_is_rejected() {
        let t = token(
            serde_json::json!({"sub": "u1", "exp": now().timestamp() - 10}),
            SECRET,
        );
        let err = resolve_identity(&t, None, now()).unwrap_err();
        assert_eq!(err, IdentityError::ExpiredCredential);
    }

    #[test]
    fn token_without_exp_is_accepted() {
        let t = token(serde_json::json!({"sub": "u1"}), SECRET);
        assert!(resolve_identity(&t, None, now()).is_ok());
    }

    #[test]
    fn missing_subject_is_rejected() {
        let t = token(serde_json::json!({"email": "a@b.c", "exp": future_exp()}), SECRET);
        let err = resolve_identity(&t, None, now()).unwrap_err();
        assert_eq!(err, IdentityError::MissingSubject);
    }

    #[test]
    fn signature_is_verified_when_secret_configured() {
        let t = token(serde_json::json!({"sub": "u1", "exp": future_exp()}), SECRET);
        assert!(resolve_identity(&t, Some(SECRET), now()).is_ok());

        let forged = token(
            serde_json::json!({"sub": "u1", "exp": future_exp()}),
            b"wrong-secret",
        );
        let err = resolve_identity(&forged, Some(SECRET), now()).unwrap_err();
        assert_eq!(err, IdentityError::InvalidSignature);
    }

    #[test]
    fn decode_only_mode_accepts_unverifiable_signature() {
        let t = token(serde_json::json!({"sub": "u1"}), b"anything");
        assert!(resolve_identity(&t, None, now()).is_ok());
    }

    #[test]
    fn padded_payload_segment_decodes() {
        let header = encode(&serde_json::json!({"alg": "HS256"}));
        let payload = format!("{}==", encode(&serde_json::json!({"sub": "u1"})));
        let t = format!("{header}.{payload}.sig");
        assert!(resolve_identity(&t, None, now()).is_ok());
    }

    #[test]
    fn authenticate_reads_bearer_header() {
        let t = token(serde_json::json!({"sub": "u1"}), SECRET);
        let mut headers = HeaderMap::new();
        headers.insert("authorization", format!("Bearer {t}").parse().unwrap());
        let identity = authenticate(&headers, None, now()).unwrap();
        assert_eq!(identity.subject, "u1");
    }

    #[test]
    fn authenticate_missing_header_fails() {
        let headers = HeaderMap::new();
        let err = authenticate(&headers, None, now()).unwrap_err();
        assert_eq!(err, IdentityError::MissingCredential);
    }

    #[test]
    fn authenticate_empty_token_fails() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer   ".parse().unwrap());
        let err = authenticate(&headers, None, now()).unwrap_err();
        assert_eq!(err, IdentityError::MissingCredential);
    }
}
