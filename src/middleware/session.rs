//! Session middleware: every request passing through here gets a session
//! context, creating an anonymous record (and cookie) when none exists.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::error::AppError;
use crate::AppState;

pub const SESSION_COOKIE: &str = "sessionId";

pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let existing = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());

    // A store failure here fails the whole request; nothing runs without a
    // session context.
    let (session, created) = state.sessions.load_or_create(existing.as_deref()).await?;
    let session_id = session.id.clone();

    request.extensions_mut().insert(session);
    let response = next.run(request).await;

    if created {
        let jar = jar.add(session_cookie(&session_id, state.config.production));
        Ok((jar, response).into_response())
    } else {
        Ok(response)
    }
}

fn session_cookie(id: &str, production: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_owned()))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::days(30))
        .same_site(SameSite::Strict)
        .secure(production)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_carries_session_hardening_flags() {
        let cookie = session_cookie("abc", false);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(30)));
        assert_eq!(cookie.secure(), Some(false));
    }

    #[test]
    fn cookie_is_secure_in_production() {
        let cookie = session_cookie("abc", true);
        assert_eq!(cookie.secure(), Some(true));
    }
}
