use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;
use tracing::{error, warn};
use uuid::Uuid;

use super::store::{Session, UserSnapshot};
use crate::state::AppState;

/// The identity bound to the request's session. Putting this extractor in a
/// handler signature IS the auth gate: identity resolution runs before the
/// handler body, and an anonymous request never reaches it.
pub struct CurrentUser(pub UserSnapshot);

/// The raw session token, resolved or not. Used by logout, which must work
/// for anonymous clients too.
pub struct SessionToken(pub Option<Uuid>);

fn token_from_parts(parts: &Parts, cookie_name: &str) -> Option<Uuid> {
    let jar = CookieJar::from_headers(&parts.headers);
    jar.get(cookie_name)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    // Anonymous access to a gated route goes back to the login entry point
    // rather than getting a bare 401.
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = token_from_parts(parts, &state.config.session.cookie_name) else {
            return Err(Redirect::to("/"));
        };

        match Session::resolve(&state.db, token).await {
            Ok(Some(session)) => Ok(CurrentUser(session.snapshot())),
            Ok(None) => {
                warn!(%token, "stale or unknown session token");
                Err(Redirect::to("/"))
            }
            Err(e) => {
                error!(error = %e, "session lookup failed");
                Err(Redirect::to("/"))
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for SessionToken {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(SessionToken(token_from_parts(
            parts,
            &state.config.session.cookie_name,
        )))
    }
}

/// Cookie handed out on login/registration. Secure/domain attributes are
/// deployment configuration, applied at the proxy.
pub fn session_cookie(name: &str, token: Uuid, ttl_minutes: i64) -> Cookie<'static> {
    Cookie::build((name.to_owned(), token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::minutes(ttl_minutes))
        .build()
}

/// Expired cookie that clears the client's copy of the token.
pub fn removal_cookie(name: &str) -> Cookie<'static> {
    let mut cookie = Cookie::new(name.to_owned(), "");
    cookie.set_path("/");
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let token = Uuid::new_v4();
        let cookie = session_cookie("sid", token, 60);
        assert_eq!(cookie.name(), "sid");
        assert_eq!(cookie.value(), token.to_string());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(Duration::minutes(60)));
    }

    #[test]
    fn removal_cookie_matches_path() {
        let cookie = removal_cookie("sid");
        assert_eq!(cookie.name(), "sid");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn malformed_cookie_value_is_anonymous() {
        let req = axum::http::Request::builder()
            .header(axum::http::header::COOKIE, "sid=not-a-uuid")
            .body(())
            .unwrap();
        let (parts, _) = req.into_parts();
        assert!(token_from_parts(&parts, "sid").is_none());
    }

    #[test]
    fn missing_cookie_is_anonymous() {
        let req = axum::http::Request::builder().body(()).unwrap();
        let (parts, _) = req.into_parts();
        assert!(token_from_parts(&parts, "sid").is_none());
    }

    #[test]
    fn valid_cookie_yields_token() {
        let token = Uuid::new_v4();
        let req = axum::http::Request::builder()
            .header(axum::http::header::COOKIE, format!("sid={token}"))
            .body(())
            .unwrap();
        let (parts, _) = req.into_parts();
        assert_eq!(token_from_parts(&parts, "sid"), Some(token));
    }
}
