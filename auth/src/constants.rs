//! Authentication constants.
//!
//! Cookie names, provider endpoint paths and policy values shared by the
//! whole crate.

/// Cookie names and lifetimes.
pub mod cookies {
    /// Signed `StoredSession` cookie.
    pub const AUTH_COOKIE_NAME: &str = "empresor_auth";

    /// Signed `PkceSessionData` cookie (one login attempt).
    pub const PKCE_COOKIE_NAME: &str = "empresor_pkce";

    /// PKCE cookie lifetime in seconds.
    ///
    /// Bounds replay risk for login attempts that are never completed.
    pub const PKCE_COOKIE_MAX_AGE_SECS: i64 = 900;
}

/// OAuth2 request values.
pub mod oauth {
    /// Scopes requested at `/authorize`.
    ///
    /// `offline_access` is what makes Auth0 issue a refresh token.
    pub const SCOPE: &str = "openid profile email offline_access";

    /// PKCE challenge method (RFC 7636).
    pub const CODE_CHALLENGE_METHOD: &str = "S256";

    /// Refresh sessions this many seconds before they expire.
    pub const DEFAULT_REFRESH_THRESHOLD_SECS: i64 = 60;

    /// Where a completed login lands when no `returnTo` was requested.
    pub const DEFAULT_RETURN_TO: &str = "/dashboard";
}

/// Auth0 endpoint paths, relative to `https://{domain}`.
pub mod endpoints {
    /// Hosted login page.
    pub const AUTHORIZE: &str = "/authorize";

    /// Hosted logout page.
    pub const LOGOUT: &str = "/v2/logout";

    /// Token endpoint (`authorization_code` and `refresh_token` grants).
    pub const TOKEN: &str = "/oauth/token";

    /// Database connection signup.
    pub const SIGNUP: &str = "/dbconnections/signup";

    /// Database connection password-reset email.
    pub const CHANGE_PASSWORD: &str = "/dbconnections/change_password";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_names() {
        assert_eq!(cookies::AUTH_COOKIE_NAME, "empresor_auth");
        assert_eq!(cookies::PKCE_COOKIE_NAME, "empresor_pkce");
        assert_eq!(cookies::PKCE_COOKIE_MAX_AGE_SECS, 900);
    }

    #[test]
    fn test_scope_requests_offline_access() {
        assert!(oauth::SCOPE.split(' ').any(|s| s == "offline_access"));
    }
}
