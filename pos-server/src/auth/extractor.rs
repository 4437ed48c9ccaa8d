//! Acting-user extractor
//!
//! Handlers that require staff identity take `CurrentUser` as an argument;
//! extraction failure rejects the request with `Unauthorized` before the
//! handler body runs, so no mutation path ever sees a half-resolved user.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::utils::AppError;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Already extracted earlier in the request
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let Some(header) = auth_header else {
            return Err(AppError::Unauthorized);
        };
        let token =
            JwtService::extract_from_header(header).ok_or(AppError::InvalidToken)?;

        match state.jwt.validate_token(token) {
            Ok(user) => {
                parts.extensions.insert(user.clone());
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, uri = ?parts.uri, "token validation failed");
                Err(AppError::InvalidToken)
            }
        }
    }
}
