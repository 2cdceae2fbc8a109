//! Resource routers. Each module exposes a `router()` assembling its routes;
//! write routes are gated behind the authentication middleware, reads are
//! public where the contract allows it.

pub mod categories;
pub mod gigs;
pub mod messages;
pub mod reviews;
pub mod services;
pub mod users;

use crate::state::AppState;
use axum::Router;
use uuid::Uuid;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", crate::auth::handlers::router())
        .nest("/users", users::router(state.clone()))
        .nest("/services", services::router(state.clone()))
        .nest("/gigs", gigs::router(state.clone()))
        .nest("/messages", messages::router(state.clone()))
        .nest("/reviews", reviews::router(state))
        .nest("/categories", categories::router())
}

/// `Some` for a present, non-empty, non-whitespace string.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a string field as an id.
pub(crate) fn parse_id(value: &Option<String>) -> Option<Uuid> {
    non_empty(value).and_then(|s| Uuid::parse_str(s).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_rejects_blank_values() {
        assert_eq!(non_empty(&None), None);
        assert_eq!(non_empty(&Some("".into())), None);
        assert_eq!(non_empty(&Some("   ".into())), None);
        assert_eq!(non_empty(&Some("  x ".into())), Some("x"));
    }

    #[test]
    fn parse_id_requires_a_uuid() {
        assert_eq!(parse_id(&Some("not-a-uuid".into())), None);
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&Some(id.to_string())), Some(id));
    }
}
