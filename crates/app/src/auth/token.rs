//! Session token formatting, signing and verification.
//!
//! Tokens are stateless: `tg_v1_<tenant uuid>_<expiry unix seconds>.<hmac hex>`
//! where the HMAC-SHA256 covers `<tenant uuid>:<version>:<expiry>`.

use std::{fmt, str::FromStr};

use hmac::{Hmac, Mac};
use jiff::Timestamp;
use rand::{RngCore, rngs::OsRng};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;
use zeroize::Zeroize;

use crate::domain::tenants::records::TenantUuid;

type HmacSha256 = Hmac<Sha256>;

/// Session token prefix.
pub const SESSION_TOKEN_PREFIX: &str = "tg";

/// Minimum accepted signing key length.
pub const SIGNING_KEY_MIN_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTokenVersion {
    V1,
}

impl SessionTokenVersion {
    #[must_use]
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::V1 => 1,
        }
    }

    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::V1 => "v1",
        }
    }
}

impl FromStr for SessionTokenVersion {
    type Err = SessionTokenError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "v1" => Ok(Self::V1),
            _ => Err(SessionTokenError::UnsupportedVersion),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionTokenError {
    #[error("session token format is invalid")]
    InvalidFormat,

    #[error("session token uses an unsupported version")]
    UnsupportedVersion,

    #[error("session token signature is invalid")]
    InvalidSignature,

    #[error("session token has expired")]
    Expired,

    #[error("signing key must be hex encoded and at least {SIGNING_KEY_MIN_BYTES} bytes")]
    InvalidKey,
}

/// HMAC key used to sign session tokens.
#[derive(Clone)]
pub struct SigningKey {
    bytes: Vec<u8>,
}

impl SigningKey {
    /// # Errors
    ///
    /// Returns [`SessionTokenError::InvalidKey`] for keys shorter than
    /// [`SIGNING_KEY_MIN_BYTES`].
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, SessionTokenError> {
        if bytes.len() < SIGNING_KEY_MIN_BYTES {
            return Err(SessionTokenError::InvalidKey);
        }

        Ok(Self { bytes })
    }

    /// # Errors
    ///
    /// Returns [`SessionTokenError::InvalidKey`] for malformed or short keys.
    pub fn from_hex(value: &str) -> Result<Self, SessionTokenError> {
        decode_hex(value.trim())
            .ok_or(SessionTokenError::InvalidKey)
            .and_then(Self::from_bytes)
    }

    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = vec![0_u8; SIGNING_KEY_MIN_BYTES];

        OsRng.fill_bytes(&mut bytes);

        Self { bytes }
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        encode_hex(&self.bytes)
    }

    fn mac(&self) -> Result<HmacSha256, SessionTokenError> {
        <HmacSha256 as Mac>::new_from_slice(&self.bytes)
            .map_err(|_invalid_length| SessionTokenError::InvalidKey)
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(**redacted**)")
    }
}

impl Drop for SigningKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// Verified contents of a session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClaims {
    pub tenant: TenantUuid,
    pub version: SessionTokenVersion,
    pub expires_at: Timestamp,
}

/// Sign a token for `tenant` valid until `expires_at`.
///
/// # Errors
///
/// Returns [`SessionTokenError::InvalidKey`] if the key cannot seed the MAC.
pub fn issue_session_token(
    key: &SigningKey,
    tenant: TenantUuid,
    expires_at: Timestamp,
) -> Result<String, SessionTokenError> {
    let version = SessionTokenVersion::V1;
    let expiry = expires_at.as_second();

    let mut mac = key.mac()?;
    mac.update(&signing_input(tenant.into_uuid(), version, expiry));

    Ok(format!(
        "{SESSION_TOKEN_PREFIX}_{}_{}_{expiry}.{}",
        version.segment(),
        tenant.into_uuid().simple(),
        encode_hex(&mac.finalize().into_bytes())
    ))
}

/// Verify signature, then expiry, of a session token.
///
/// # Errors
///
/// Returns [`SessionTokenError::Expired`] for a well-signed token at or past
/// its expiry, and a format or signature error otherwise.
pub fn verify_session_token(
    key: &SigningKey,
    token: &str,
    now: Timestamp,
) -> Result<SessionClaims, SessionTokenError> {
    let (claims_part, signature_hex) = token
        .split_once('.')
        .ok_or(SessionTokenError::InvalidFormat)?;

    let mut parts = claims_part.splitn(4, '_');

    let prefix = parts.next().ok_or(SessionTokenError::InvalidFormat)?;
    let version_segment = parts.next().ok_or(SessionTokenError::InvalidFormat)?;
    let tenant_segment = parts.next().ok_or(SessionTokenError::InvalidFormat)?;
    let expiry_segment = parts.next().ok_or(SessionTokenError::InvalidFormat)?;

    if prefix != SESSION_TOKEN_PREFIX {
        return Err(SessionTokenError::InvalidFormat);
    }

    let version = SessionTokenVersion::from_str(version_segment)?;

    let tenant =
        Uuid::try_parse(tenant_segment).map_err(|_malformed| SessionTokenError::InvalidFormat)?;
    let expiry: i64 = expiry_segment
        .parse()
        .map_err(|_malformed| SessionTokenError::InvalidFormat)?;

    let signature = decode_hex(signature_hex).ok_or(SessionTokenError::InvalidFormat)?;

    let mut mac = key.mac()?;
    mac.update(&signing_input(tenant, version, expiry));
    mac.verify_slice(&signature)
        .map_err(|_mismatch| SessionTokenError::InvalidSignature)?;

    let expires_at =
        Timestamp::from_second(expiry).map_err(|_out_of_range| SessionTokenError::InvalidFormat)?;

    if now >= expires_at {
        return Err(SessionTokenError::Expired);
    }

    Ok(SessionClaims {
        tenant: TenantUuid::from_uuid(tenant),
        version,
        expires_at,
    })
}

fn signing_input(tenant: Uuid, version: SessionTokenVersion, expiry: i64) -> Vec<u8> {
    format!("{}:{}:{expiry}", tenant.simple(), version.as_i16()).into_bytes()
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .flat_map(|byte| [byte >> 4, byte & 0x0f])
        .filter_map(|nibble| char::from_digit(u32::from(nibble), 16))
        .collect()
}

fn decode_hex(value: &str) -> Option<Vec<u8>> {
    if value.is_empty() || value.len() % 2 != 0 {
        return None;
    }

    value
        .as_bytes()
        .chunks_exact(2)
        .map(|pair| match pair {
            [hi, lo] => Some((decode_hex_nibble(*hi)? << 4) | decode_hex_nibble(*lo)?),
            _ => None,
        })
        .collect()
}

fn decode_hex_nibble(value: u8) -> Option<u8> {
    match value {
        b'0'..=b'9' => Some(value - b'0'),
        b'a'..=b'f' => Some(value - b'a' + 10),
        b'A'..=b'F' => Some(value - b'A' + 10),
        _ => None,
    }
}
