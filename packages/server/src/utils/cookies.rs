use axum_extra::extract::cookie::{Cookie, SameSite};

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Build an HttpOnly auth cookie scoped to the whole site.
pub fn auth_cookie(
    name: &'static str,
    value: String,
    max_age_secs: i64,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// A cookie that instructs the browser to drop `name` immediately.
pub fn expired_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    auth_cookie(name, String::new(), 0, secure)
}
