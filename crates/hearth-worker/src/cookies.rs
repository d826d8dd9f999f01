//! Session cookies and credential extraction from request headers.

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// `Set-Cookie` value for a session cookie.
///
/// Cookies are always HttpOnly, Secure, `SameSite=None` and scoped to `/` so a web client
/// on another origin can send them with credentialed requests.
pub fn session_cookie(name: &str, value: &str, max_age: Option<i64>) -> String {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; Secure; SameSite=None");
    if let Some(max_age) = max_age {
        cookie.push_str(&format!("; Max-Age={max_age}"));
    }
    cookie
}

/// `Set-Cookie` value that makes the browser drop `name`.
pub fn expired_cookie(name: &str) -> String {
    format!(
        "{name}=; Path=/; HttpOnly; Secure; SameSite=None; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT"
    )
}

/// Look up one cookie in a `Cookie` request header.
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| v.trim().trim_matches('"').to_string())
        .filter(|v| !v.is_empty())
}

/// Token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<String> {
    let (scheme, rest) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = rest.trim();
    if token.is_empty() {
        return None;
    }

    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_cookie_attributes() {
        assert_eq!(
            session_cookie(ACCESS_COOKIE, "abc", Some(900)),
            "access_token=abc; Path=/; HttpOnly; Secure; SameSite=None; Max-Age=900"
        );
        assert_eq!(
            session_cookie(REFRESH_COOKIE, "def", None),
            "refresh_token=def; Path=/; HttpOnly; Secure; SameSite=None"
        );
    }

    #[test]
    fn expired_cookie_is_empty() {
        let c = expired_cookie(REFRESH_COOKIE);
        assert!(c.starts_with("refresh_token=;"));
        assert!(c.contains("Max-Age=0"));
        assert!(c.contains("SameSite=None"));
    }

    #[test]
    fn reads_cookies_from_header() {
        let header = "theme=dark; access_token=aaa.bbb.ccc;refresh_token=\"r1\"; empty=";
        assert_eq!(cookie_value(header, ACCESS_COOKIE).as_deref(), Some("aaa.bbb.ccc"));
        assert_eq!(cookie_value(header, REFRESH_COOKIE).as_deref(), Some("r1"));
        assert_eq!(cookie_value(header, "empty"), None);
        assert_eq!(cookie_value(header, "missing"), None);
    }

    #[test]
    fn reads_bearer_tokens() {
        assert_eq!(bearer_token("Bearer abc").as_deref(), Some("abc"));
        assert_eq!(bearer_token("bearer   abc  ").as_deref(), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer"), None);
    }
}
