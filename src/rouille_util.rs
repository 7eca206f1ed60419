use rouille::{Request, Response, input};

/// Get a particular cookie. O(n) with n == number of cookies.
pub fn get_cookie<'r>(request: &'r Request, key: &str) -> Option<&'r str> {
    input::cookies(request).find(|&(n, _)| n == key).map(|(_, v)| v)
}

/// What to do with a cookie in the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewCookieValue<S> {
    /// Session cookie (no Max-Age)
    Updated(S),
    Deleted,
}

/// The `Set-Cookie` header value for the given action. The cookie is
/// valid for the whole site.
pub fn set_cookie_value(key: &str, value: &NewCookieValue<String>) -> String {
    match value {
        NewCookieValue::Updated(v) => format!("{key}={v}; Path=/"),
        NewCookieValue::Deleted => format!("{key}=; Path=/; Max-Age=0"),
    }
}

pub fn with_cookie(response: Response, key: &str, value: &NewCookieValue<String>) -> Response {
    response.with_additional_header("Set-Cookie", set_cookie_value(key, value))
}

pub fn header_value<'r>(response: &'r Response, key: &str) -> Option<&'r str> {
    response.headers.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| &**v)
}
