use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::{error::ApiError, AppState};
use crate::utils::token::MAX_TTL_MINUTES;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

/// Identity attached to requests that passed the bearer gate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub user: String,
    pub expires_at: DateTime<Utc>,
}

pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    session_ttl: Duration,
}

impl AuthKeys {
    /// `session_ttl_minutes` is clamped to `1..=MAX_TTL_MINUTES`.
    pub fn new(secret: &[u8], session_ttl_minutes: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            session_ttl: Duration::minutes(session_ttl_minutes.clamp(1, MAX_TTL_MINUTES)),
        }
    }

    pub fn issue(&self, user: &str) -> jsonwebtoken::errors::Result<(String, DateTime<Utc>)> {
        self.issue_at(user, Utc::now())
    }

    pub fn issue_at(
        &self,
        user: &str,
        now: DateTime<Utc>,
    ) -> jsonwebtoken::errors::Result<(String, DateTime<Utc>)> {
        let expires_at = now
            .checked_add_signed(self.session_ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let claims = SessionClaims {
            user: user.to_owned(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;

        Ok((token, expires_at))
    }

    pub fn verify(&self, token: &str) -> jsonwebtoken::errors::Result<SessionClaims> {
        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
    }
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Rejects the request with 401 unless it carries a valid session token.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&req).ok_or_else(ApiError::unauthorized)?;

    let claims = state.auth.verify(token).map_err(|err| {
        log::warn!("[auth] rejected bearer token: {err}");
        ApiError::unauthorized()
    })?;

    let expires_at = Utc
        .timestamp_opt(claims.exp, 0)
        .single()
        .ok_or_else(ApiError::unauthorized)?;

    req.extensions_mut().insert(AuthUser {
        user: claims.user,
        expires_at,
    });

    Ok(next.run(req).await)
}
