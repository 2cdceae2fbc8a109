//! Authentication gateway.
//!
//! Per request: no token → 401; bad signature or expired token → 403;
//! otherwise the identity decoded from the token is attached to the request
//! extensions and control passes to the handler. With `session_check`
//! enabled, the gateway additionally requires that some active session
//! exists at the identity provider. That check is existence-only and is not
//! bound to the token's subject.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use unigig_core::Role;
use uuid::Uuid;

/// Identity attached to admitted requests.
#[derive(Clone, Copy, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_token)
        .ok_or_else(|| ApiError::unauthenticated("Authentication token required"))?;

    let claims = state
        .verifier
        .verify(&token)
        .map_err(|_| ApiError::InvalidCredential("Invalid token".to_string()))?;

    if state.cfg.auth.session_check {
        let active = state.identity.has_active_session().await.unwrap_or(false);
        if !active {
            return Err(ApiError::InvalidCredential(
                "Invalid or expired session".to_string(),
            ));
        }
    }

    req.extensions_mut().insert(AuthUser {
        id: claims.user_id,
        role: claims.role,
    });

    Ok(next.run(req).await)
}

/// The token is the second whitespace-delimited field of the header. The
/// scheme word is never compared against a literal.
fn extract_token(header: &str) -> Option<String> {
    header.split_whitespace().nth(1).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_the_second_field() {
        assert_eq!(extract_token("Bearer abc.def.ghi").as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn scheme_word_is_not_checked() {
        assert_eq!(extract_token("Token abc").as_deref(), Some("abc"));
        assert_eq!(extract_token("whatever abc").as_deref(), Some("abc"));
    }

    #[test]
    fn extra_whitespace_is_tolerated() {
        assert_eq!(extract_token("Bearer   abc").as_deref(), Some("abc"));
    }

    #[test]
    fn bare_token_or_empty_header_yields_none() {
        assert_eq!(extract_token("abc"), None);
        assert_eq!(extract_token("Bearer"), None);
        assert_eq!(extract_token(""), None);
    }
}
