//! HS256 access tokens.
//!
//! Tokens are `base64url(header).base64url(claims).base64url(signature)`
//! without padding. Only HS256 is accepted.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Malformed token: {0}")]
    Malformed(String),
    #[error("Invalid token signature")]
    InvalidSignature,
    #[error("Token has expired")]
    Expired,
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_email: String,
    pub iat: i64,
    pub exp: i64,
}

fn b64url_decode(s: &str) -> Result<Vec<u8>, TokenError> {
    URL_SAFE_NO_PAD
        .decode(s.as_bytes())
        .map_err(|e| TokenError::Malformed(format!("Invalid base64url: {e}")))
}

fn mac_for(secret: &[u8]) -> Result<Hmac<Sha256>, TokenError> {
    Hmac::<Sha256>::new_from_slice(secret).map_err(|e| TokenError::InvalidKey(e.to_string()))
}

pub fn encode_hs256<T: Serialize>(secret: &[u8], claims: &T) -> Result<String, TokenError> {
    let header = JwtHeader {
        alg: "HS256".to_string(),
        typ: "JWT".to_string(),
    };

    let header_json =
        serde_json::to_vec(&header).map_err(|e| TokenError::Malformed(e.to_string()))?;
    let claims_json =
        serde_json::to_vec(claims).map_err(|e| TokenError::Malformed(e.to_string()))?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    );

    let mut mac = mac_for(secret)?;
    mac.update(signing_input.as_bytes());
    let signature = mac.finalize().into_bytes();

    Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
}

/// Verifies the signature and decodes the claims. Expiry is not checked here.
pub fn decode_hs256<T: DeserializeOwned>(secret: &[u8], token: &str) -> Result<T, TokenError> {
    let mut parts = token.trim().split('.');
    let (Some(header_b64), Some(payload_b64), Some(sig_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed("expected three segments".to_string()));
    };

    let header: JwtHeader = serde_json::from_slice(&b64url_decode(header_b64)?)
        .map_err(|e| TokenError::Malformed(format!("Invalid header JSON: {e}")))?;
    if header.alg != "HS256" || !header.typ.eq_ignore_ascii_case("JWT") {
        return Err(TokenError::Malformed("unsupported header".to_string()));
    }

    let mut mac = mac_for(secret)?;
    mac.update(format!("{header_b64}.{payload_b64}").as_bytes());
    mac.verify_slice(&b64url_decode(sig_b64)?)
        .map_err(|_| TokenError::InvalidSignature)?;

    serde_json::from_slice(&b64url_decode(payload_b64)?)
        .map_err(|e| TokenError::Malformed(format!("Invalid payload JSON: {e}")))
}

pub fn issue_access_token(secret: &[u8], email: &str, ttl: Duration) -> Result<String, TokenError> {
    let iat = Utc::now().timestamp();
    let claims = Claims {
        user_email: email.to_string(),
        iat,
        exp: iat + ttl.as_secs() as i64,
    };
    encode_hs256(secret, &claims)
}

pub fn verify_access_token(secret: &[u8], token: &str) -> Result<Claims, TokenError> {
    let claims: Claims = decode_hs256(secret, token)?;
    if claims.exp <= Utc::now().timestamp() {
        return Err(TokenError::Expired);
    }
    Ok(claims)
}
