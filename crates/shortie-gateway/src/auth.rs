use axum::extract::{Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shortie_core::OwnerId;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Name of the cookie carrying the signed owner token.
pub const AUTH_COOKIE: &str = "auth_token";

/// Lifetime of an issued token and of its cookie.
pub const TOKEN_TTL: SignedDuration = SignedDuration::from_hours(24);

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iat: i64,
    pub exp: i64,
    #[serde(default)]
    pub user_id: String,
}

/// HS256 keys for signing and verifying owner tokens.
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl AuthKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Signs a fresh token for `owner`.
    pub fn issue(&self, owner: &OwnerId) -> Result<String> {
        let now = Timestamp::now();
        let claims = Claims {
            iat: now.as_second(),
            exp: (now + TOKEN_TTL).as_second(),
            user_id: owner.as_str().to_owned(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("sign auth token: {e}")))
    }

    /// Returns the claims of a well-signed, unexpired token.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .inspect_err(|err| debug!(%err, "rejected auth token"))
            .ok()
    }
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find_map(|(key, value)| (key == name).then_some(value))
}

fn auth_cookie(token: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{AUTH_COOKIE}={token}; Path=/; Max-Age={}; HttpOnly",
        TOKEN_TTL.as_secs()
    ))
    .map_err(|e| AppError::Internal(format!("build auth cookie: {e}")))
}

/// Resolves the caller's [`OwnerId`] and stores it as a request extension.
///
/// A missing, forged or expired cookie gets a fresh owner and a new cookie.
/// A valid token without a user id is rejected.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let claims = cookie_value(request.headers(), AUTH_COOKIE)
        .and_then(|token| state.auth().verify(token));

    match claims {
        Some(claims) if claims.user_id.is_empty() => Err(AppError::Unauthorized(
            "auth token carries no user id".to_string(),
        )),
        Some(claims) => {
            request.extensions_mut().insert(OwnerId::new(claims.user_id));
            Ok(next.run(request).await)
        }
        None => {
            let owner = OwnerId::new(Uuid::new_v4().to_string());
            let cookie = auth_cookie(&state.auth().issue(&owner)?)?;
            debug!(owner = %owner, "issued new owner token");

            request.extensions_mut().insert(owner);
            let mut response = next.run(request).await;
            response.headers_mut().append(SET_COOKIE, cookie);
            Ok(response)
        }
    }
}
