// Session cookies set on login/refresh and cleared on logout

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::config::SecurityConfig;

/// Cookie name for the access token
pub const ACCESS_COOKIE_NAME: &str = "access_token";

/// Cookie name for the refresh token
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Attributes shared by both session cookies
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    pub secure: bool,
    pub domain: Option<String>,
}

impl From<&SecurityConfig> for CookiePolicy {
    fn from(security: &SecurityConfig) -> Self {
        Self {
            secure: security.cookie_secure,
            domain: security.cookie_domain.clone(),
        }
    }
}

impl CookiePolicy {
    /// Build an http-only session cookie that expires with its token.
    pub fn session_cookie(&self, name: &'static str, token: String, ttl: chrono::Duration) -> Cookie<'static> {
        let mut cookie = Cookie::build((name, token))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(ttl.num_seconds()))
            .build();

        if let Some(domain) = &self.domain {
            cookie.set_domain(domain.clone());
        }

        cookie
    }

    /// Build a cookie that clears `name` in the browser.
    pub fn removal_cookie(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = Cookie::build((name, ""))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build();

        if let Some(domain) = &self.domain {
            cookie.set_domain(domain.clone());
        }
        cookie.make_removal();

        cookie
    }

    /// Add both session cookies to `jar`.
    pub fn with_session(
        &self,
        jar: CookieJar,
        access: (&str, chrono::Duration),
        refresh: (&str, chrono::Duration),
    ) -> CookieJar {
        jar.add(self.session_cookie(ACCESS_COOKIE_NAME, access.0.to_string(), access.1))
            .add(self.session_cookie(REFRESH_COOKIE_NAME, refresh.0.to_string(), refresh.1))
    }

    /// Add removal cookies for both session cookies to `jar`.
    pub fn clear_session(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.removal_cookie(ACCESS_COOKIE_NAME))
            .add(self.removal_cookie(REFRESH_COOKIE_NAME))
    }
}

/// Read the refresh token from request cookies.
pub fn refresh_token_from(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}
