//! The authentication signal: a plaintext `auth` cookie. There is no
//! security in this, it only switches between the authenticated and
//! unauthenticated page sets of a theme.

use rouille::{Request, Response};

use crate::rouille_util::{get_cookie, with_cookie, NewCookieValue};

pub const AUTH_COOKIE: &str = "auth";
const AUTH_COOKIE_TRUE: &str = "true";

pub fn is_authenticated(request: &Request) -> bool {
    get_cookie(request, AUTH_COOKIE) == Some(AUTH_COOKIE_TRUE)
}

/// Redirect to the portal root, setting the cookie.
pub fn login_response() -> Response {
    with_cookie(Response::redirect_302("/"),
                AUTH_COOKIE,
                &NewCookieValue::Updated(AUTH_COOKIE_TRUE.into()))
}

/// Redirect to the portal root, clearing the cookie.
pub fn logout_response() -> Response {
    with_cookie(Response::redirect_302("/"),
                AUTH_COOKIE,
                &NewCookieValue::Deleted)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::rouille_util::header_value;

    fn request(cookie: &str) -> Request {
        Request::fake_http("GET", "/", vec![("Cookie".to_owned(), cookie.to_owned())], vec![])
    }

    #[test]
    fn t_is_authenticated() {
        assert!(is_authenticated(&request("auth=true")));
        assert!(is_authenticated(&request("x=1; auth=true")));
        assert!(!is_authenticated(&request("auth=false")));
        assert!(!is_authenticated(&request("auth=")));
        assert!(!is_authenticated(&request("notauth=true")));
        assert!(!is_authenticated(&Request::fake_http("GET", "/", vec![], vec![])));
    }

    #[test]
    fn t_login_logout() {
        let r = login_response();
        assert_eq!(r.status_code, 302);
        assert_eq!(header_value(&r, "Location"), Some("/"));
        assert_eq!(header_value(&r, "Set-Cookie"), Some("auth=true; Path=/"));
        let r = logout_response();
        assert_eq!(r.status_code, 302);
        assert_eq!(header_value(&r, "Set-Cookie"), Some("auth=; Path=/; Max-Age=0"));
    }
}
