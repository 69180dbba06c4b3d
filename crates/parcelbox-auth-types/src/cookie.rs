//! Cookie builders for the session token.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the session access token.
pub const PARCELBOX_SESSION: &str = "parcelbox_session";

/// Set the session cookie on the jar. `max_age_secs` should match the token lifetime.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use parcelbox_auth_types::cookie::{set_session_cookie, PARCELBOX_SESSION};
///
/// let jar = set_session_cookie(CookieJar::new(), "token".to_string(), "example.com".to_string(), 3600);
/// let cookie = jar.get(PARCELBOX_SESSION).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("example.com"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));
/// assert!(cookie.http_only().unwrap_or(false));
/// ```
pub fn set_session_cookie(
    jar: CookieJar,
    value: String,
    domain: String,
    max_age_secs: u64,
) -> CookieJar {
    let cookie = Cookie::build((PARCELBOX_SESSION, value))
        .path("/")
        .domain(domain)
        .max_age(Duration::seconds(max_age_secs as i64))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Clear the session cookie by setting Max-Age to 0.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use parcelbox_auth_types::cookie::{clear_session_cookie, set_session_cookie, PARCELBOX_SESSION};
///
/// let jar = set_session_cookie(CookieJar::new(), "t".to_string(), "example.com".to_string(), 60);
/// let jar = clear_session_cookie(jar, "example.com".to_string());
/// assert_eq!(jar.get(PARCELBOX_SESSION).unwrap().max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_session_cookie(jar: CookieJar, domain: String) -> CookieJar {
    let cookie = Cookie::build((PARCELBOX_SESSION, ""))
        .path("/")
        .domain(domain)
        .max_age(Duration::ZERO)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}
