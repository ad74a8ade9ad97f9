//! Short-lived opaque references for video links.
//!
//! A token is the standard base64 of `"{raw}::{expiry}"`, where `expiry` is
//! a unix timestamp in milliseconds. This is an obfuscation, not a seal:
//! anyone holding a token can read and forge it.

use base64::{prelude::BASE64_STANDARD, Engine};
use chrono::{DateTime, Utc};
use thiserror::Error;

pub const DEFAULT_TTL_MINUTES: i64 = 10;
/// One year. Longer lifetimes are clamped to it.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

const SEPARATOR: &str = "::";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("token payload is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("token payload has no expiry separator")]
    MissingSeparator,
    #[error("token expiry is not an integer: {0}")]
    InvalidExpiry(#[from] std::num::ParseIntError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    pub raw: String,
    /// Unix timestamp, milliseconds.
    pub expiry: i64,
}

impl DecodedToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry < now.timestamp_millis()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TokenCodec {
    ttl_minutes: i64,
}

impl Default for TokenCodec {
    fn default() -> Self {
        Self {
            ttl_minutes: DEFAULT_TTL_MINUTES,
        }
    }
}

impl TokenCodec {
    /// `ttl_minutes` is clamped to `1..=MAX_TTL_MINUTES`.
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            ttl_minutes: ttl_minutes.clamp(1, MAX_TTL_MINUTES),
        }
    }

    pub fn ttl_minutes(&self) -> i64 {
        self.ttl_minutes
    }

    pub fn encode(&self, raw: &str) -> String {
        self.encode_at(raw, Utc::now())
    }

    pub fn encode_at(&self, raw: &str, now: DateTime<Utc>) -> String {
        let expiry = now
            .timestamp_millis()
            .saturating_add(self.ttl_minutes.saturating_mul(60_000));
        BASE64_STANDARD.encode(format!("{raw}{SEPARATOR}{expiry}"))
    }
}

pub fn decode(token: &str) -> Result<DecodedToken, TokenError> {
    let bytes = BASE64_STANDARD.decode(token)?;
    let payload = String::from_utf8(bytes)?;

    let (raw, expiry) = payload
        .rsplit_once(SEPARATOR)
        .ok_or(TokenError::MissingSeparator)?;

    Ok(DecodedToken {
        raw: raw.to_owned(),
        expiry: expiry.parse()?,
    })
}

pub fn is_expired(token: &str) -> Result<bool, TokenError> {
    is_expired_at(token, Utc::now())
}

pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> Result<bool, TokenError> {
    Ok(decode(token)?.is_expired_at(now))
}
