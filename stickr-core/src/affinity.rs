//! Session-affinity cookie handling.
//!
//! Sticky load balancers commonly pin a client through a `JSESSIONID` cookie whose value carries
//! the serving node as a suffix, e.g. `5F1A2B.node7`.

use stickr_http::header_values;

pub const SESSION_COOKIE: &str = "JSESSIONID";

/// Extracts the `JSESSIONID` value from the response's `Set-Cookie` headers.
///
/// Every `set-cookie` entry is scanned attribute by attribute; the first attribute whose name
/// is exactly `JSESSIONID` wins. Missing headers or attributes yield `None`.
pub fn session_token(headers: &[(String, String)]) -> Option<String> {
    header_values(headers, "set-cookie").find_map(|value| {
        value.split(';').find_map(|attr| {
            let (name, token) = attr.trim().split_once('=')?;
            (name.trim() == SESSION_COOKIE).then(|| token.trim().to_string())
        })
    })
}

/// The node identifier is whatever follows the first `.` of the token.
pub fn node_id(token: &str) -> Option<&str> {
    let (_, node) = token.split_once('.')?;
    (!node.is_empty()).then_some(node)
}

/// `Cookie` header value replaying an established token.
pub fn cookie_header(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_cookie(v: &str) -> Vec<(String, String)> {
        vec![("set-cookie".to_string(), v.to_string())]
    }

    #[test]
    fn extracts_token_and_node() {
        let headers = set_cookie("JSESSIONID=ABC123.node7; Path=/; HttpOnly");
        let token = session_token(&headers);
        assert_eq!(token.as_deref(), Some("ABC123.node7"));
        assert_eq!(token.as_deref().and_then(node_id), Some("node7"));
    }

    #[test]
    fn missing_session_attribute_yields_none() {
        assert_eq!(session_token(&set_cookie("theme=dark; Path=/")), None);
        assert_eq!(session_token(&[]), None);
        assert_eq!(
            session_token(&[("content-type".to_string(), "JSESSIONID=x".to_string())]),
            None
        );
    }

    #[test]
    fn token_may_follow_other_attributes() {
        let headers = set_cookie("Path=/; JSESSIONID=s1.n2");
        assert_eq!(session_token(&headers).as_deref(), Some("s1.n2"));
    }

    #[test]
    fn similarly_named_cookies_are_ignored() {
        let headers = set_cookie("XJSESSIONID=nope; JSESSIONIDX=nope2");
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn scans_repeated_set_cookie_headers() {
        let headers = vec![
            ("set-cookie".to_string(), "theme=dark".to_string()),
            ("Set-Cookie".to_string(), "JSESSIONID=zz.n3; Secure".to_string()),
        ];
        assert_eq!(session_token(&headers).as_deref(), Some("zz.n3"));
    }

    #[test]
    fn node_requires_delimiter() {
        assert_eq!(node_id("ABC123"), None);
        assert_eq!(node_id("ABC123."), None);
        assert_eq!(node_id("a.b.c"), Some("b.c"));
    }

    #[test]
    fn cookie_header_replays_token() {
        assert_eq!(cookie_header("A.n1"), "JSESSIONID=A.n1");
    }
}
