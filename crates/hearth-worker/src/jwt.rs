//! Minimal HS256 JWT utilities.
//!
//! Only JSON objects are supported for header and payload, encoded as base64url
//! without padding. Signatures are checked with `Hmac::verify_slice`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::config::Settings;
use crate::util::{hex_encode, random_bytes};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid JWT format")]
    Format,
    #[error("Invalid base64url: {0}")]
    Base64(String),
    #[error("Invalid JWT JSON: {0}")]
    Json(String),
    #[error("Unsupported JWT header")]
    UnsupportedHeader,
    #[error("Invalid HMAC key")]
    Key,
    #[error("Invalid JWT signature")]
    Signature,
    #[error("Token expired")]
    Expired,
    #[error("Wrong token type")]
    WrongKind,
}

#[derive(Debug, Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

fn b64url_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

fn b64url_decode(s: &str) -> Result<Vec<u8>, TokenError> {
    URL_SAFE_NO_PAD
        .decode(s.as_bytes())
        .map_err(|e| TokenError::Base64(e.to_string()))
}

fn mac(secret: &[u8], signing_input: &str) -> Result<Hmac<Sha256>, TokenError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret).map_err(|_| TokenError::Key)?;
    mac.update(signing_input.as_bytes());
    Ok(mac)
}

/// Encode claims as an HS256-signed JWT.
pub fn encode_hs256<T: Serialize>(secret: &[u8], claims: &T) -> Result<String, TokenError> {
    let header = JwtHeader {
        alg: "HS256".to_string(),
        typ: "JWT".to_string(),
    };

    let header_json = serde_json::to_vec(&header).map_err(|e| TokenError::Json(e.to_string()))?;
    let claims_json = serde_json::to_vec(claims).map_err(|e| TokenError::Json(e.to_string()))?;

    let signing_input = format!("{}.{}", b64url_encode(&header_json), b64url_encode(&claims_json));
    let signature = mac(secret, &signing_input)?.finalize().into_bytes();

    Ok(format!("{signing_input}.{}", b64url_encode(&signature)))
}

/// Decode an HS256 JWT and verify its signature.
///
/// Expiry and token kind are not checked here; see [`verify`].
pub fn decode_hs256<T: DeserializeOwned>(secret: &[u8], token: &str) -> Result<T, TokenError> {
    let token = token.replace(char::is_whitespace, "");
    let mut parts = token.split('.');
    let (Some(header_b64), Some(payload_b64), Some(sig_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Format);
    };

    let header: JwtHeader = serde_json::from_slice(&b64url_decode(header_b64)?)
        .map_err(|e| TokenError::Json(e.to_string()))?;
    if header.alg != "HS256" || !header.typ.eq_ignore_ascii_case("JWT") {
        return Err(TokenError::UnsupportedHeader);
    }

    let signing_input = format!("{header_b64}.{payload_b64}");
    let sig = b64url_decode(sig_b64)?;
    mac(secret, &signing_input)?
        .verify_slice(&sig)
        .map_err(|_| TokenError::Signature)?;

    serde_json::from_slice(&b64url_decode(payload_b64)?).map_err(|e| TokenError::Json(e.to_string()))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Username.
    pub sub: String,
    pub typ: TokenKind,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

pub fn issue(settings: &Settings, username: &str, kind: TokenKind, now: i64) -> Result<String, TokenError> {
    let ttl = match kind {
        TokenKind::Access => settings.access_token_ttl,
        TokenKind::Refresh => settings.refresh_token_ttl,
    };
    let claims = Claims {
        sub: username.to_string(),
        typ: kind,
        iat: now,
        exp: now + ttl,
        jti: hex_encode(&random_bytes(16)),
    };
    encode_hs256(&settings.jwt_secret, &claims)
}

pub fn issue_pair(settings: &Settings, username: &str, now: i64) -> Result<TokenPair, TokenError> {
    Ok(TokenPair {
        access: issue(settings, username, TokenKind::Access, now)?,
        refresh: issue(settings, username, TokenKind::Refresh, now)?,
    })
}

/// Verify signature, kind and expiry. Returns the username on success.
pub fn verify(settings: &Settings, token: &str, kind: TokenKind, now: i64) -> Result<String, TokenError> {
    let claims: Claims = decode_hs256(&settings.jwt_secret, token)?;
    if claims.typ != kind {
        return Err(TokenError::WrongKind);
    }
    if claims.exp <= now {
        return Err(TokenError::Expired);
    }
    Ok(claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_settings;

    #[test]
    fn access_token_roundtrip() {
        let settings = test_settings();
        let token = issue(&settings, "alice", TokenKind::Access, 1_000).unwrap();
        assert_eq!(verify(&settings, &token, TokenKind::Access, 1_001).unwrap(), "alice");
    }

    #[test]
    fn access_tokens_expire_after_ttl() {
        let settings = test_settings();
        let token = issue(&settings, "alice", TokenKind::Access, 1_000).unwrap();
        let expiry = 1_000 + settings.access_token_ttl;
        assert!(verify(&settings, &token, TokenKind::Access, expiry - 1).is_ok());
        assert_eq!(
            verify(&settings, &token, TokenKind::Access, expiry),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn kinds_are_not_interchangeable() {
        let settings = test_settings();
        let pair = issue_pair(&settings, "bob", 0).unwrap();
        assert_eq!(
            verify(&settings, &pair.refresh, TokenKind::Access, 1),
            Err(TokenError::WrongKind)
        );
        assert_eq!(
            verify(&settings, &pair.access, TokenKind::Refresh, 1),
            Err(TokenError::WrongKind)
        );
        assert_eq!(verify(&settings, &pair.refresh, TokenKind::Refresh, 1).unwrap(), "bob");
    }

    #[test]
    fn tampering_is_detected() {
        let settings = test_settings();
        let token = issue(&settings, "alice", TokenKind::Access, 0).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = b64url_encode(br#"{"sub":"mallory","typ":"access","iat":0,"exp":99999999999,"jti":"x"}"#);
        parts[1] = &forged;
        let forged_token = parts.join(".");
        assert_eq!(
            verify(&settings, &forged_token, TokenKind::Access, 1),
            Err(TokenError::Signature)
        );

        let mut other = test_settings();
        other.jwt_secret = b"another-secret-another-secret-123".to_vec();
        assert_eq!(verify(&other, &token, TokenKind::Access, 1), Err(TokenError::Signature));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let settings = test_settings();
        assert_eq!(verify(&settings, "abc", TokenKind::Access, 0), Err(TokenError::Format));
        assert_eq!(verify(&settings, "a.b.c.d", TokenKind::Access, 0), Err(TokenError::Format));
        assert!(matches!(
            verify(&settings, "!!.b.c", TokenKind::Access, 0),
            Err(TokenError::Base64(_))
        ));
    }
}
