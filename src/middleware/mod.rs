use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{Role, Session, SessionUser};

/// Полезная нагрузка токена, который выдаёт бэкенд.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: String,
    pub exp: usize,
}

pub fn session_from_token(token: &str, secret: &str) -> Result<Session, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    let claims = data.claims;
    let user = SessionUser {
        id: claims.sub,
        name: claims.name,
        role: Role::from_claim(&claims.role),
    };
    Ok(Session::new(user, token))
}

// Bearer JWT extractor
impl FromRequestParts<Arc<crate::AppState>> for Session {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        session_from_token(token, &state.config.jwt.secret).map_err(|e| {
            tracing::debug!("Rejected bearer token: {:?}", e);
            StatusCode::UNAUTHORIZED
        })
    }
}
