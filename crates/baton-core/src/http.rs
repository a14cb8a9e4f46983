use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
    Connect,
    Unknown,
}

impl Method {
    /// Verbs registered by `any(...)` routes.
    pub const ROUTABLE: [Method; 6] = [
        Method::Get,
        Method::Post,
        Method::Patch,
        Method::Put,
        Method::Delete,
        Method::Options,
    ];

    pub fn from_bytes(b: &[u8]) -> Self {
        match b {
            b"GET" => Method::Get,
            b"POST" => Method::Post,
            b"PUT" => Method::Put,
            b"DELETE" => Method::Delete,
            b"PATCH" => Method::Patch,
            b"HEAD" => Method::Head,
            b"OPTIONS" => Method::Options,
            b"TRACE" => Method::Trace,
            b"CONNECT" => Method::Connect,
            _ => Method::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Connect => "CONNECT",
            Method::Unknown => "UNKNOWN",
        }
    }
}

impl FromStr for Method {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Method::from_bytes(s.to_ascii_uppercase().as_bytes()))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The pipe-delimited verb list a route answers to, e.g. `GET|POST`.
///
/// Matching is a case-insensitive substring test against the whole list,
/// so `"GET|POST"` accepts either verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSet(String);

impl MethodSet {
    pub fn new(methods: impl AsRef<str>) -> Self {
        MethodSet(methods.as_ref().trim().to_ascii_uppercase())
    }

    /// Every routable verb (`GET|POST|PATCH|PUT|DELETE|OPTIONS`).
    pub fn any() -> Self {
        let joined = Method::ROUTABLE
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join("|");
        MethodSet(joined)
    }

    pub fn contains(&self, method: &str) -> bool {
        let method = method.trim();
        !method.is_empty() && self.0.contains(&method.to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Method> for MethodSet {
    fn from(m: Method) -> Self {
        MethodSet(m.as_str().to_string())
    }
}

impl From<&str> for MethodSet {
    fn from(s: &str) -> Self {
        MethodSet::new(s)
    }
}

impl From<String> for MethodSet {
    fn from(s: String) -> Self {
        MethodSet::new(s)
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An already-parsed request: method, raw path (query string allowed) and headers.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Case-insensitive header lookup; first occurrence wins.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.header_value("cookie")?
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }

    /// The token from `Authorization: Bearer <token>`, if present.
    pub fn bearer_token(&self) -> Option<&str> {
        let value = self.header_value("authorization")?;
        let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
        (!token.is_empty()).then_some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_set_matching() {
        let set = MethodSet::new("get|post");
        assert!(set.contains("GET"));
        assert!(set.contains("post"));
        assert!(!set.contains("DELETE"));
        assert!(!set.contains(""));
    }

    #[test]
    fn test_any_lists_routable_verbs() {
        assert_eq!(MethodSet::any().as_str(), "GET|POST|PATCH|PUT|DELETE|OPTIONS");
    }

    #[test]
    fn test_request_headers_and_cookies() {
        let req = Request::new("GET", "/")
            .header("Authorization", "Bearer abc.def")
            .header("Cookie", "theme=dark; jwt=xyz");
        assert_eq!(req.bearer_token(), Some("abc.def"));
        assert_eq!(req.cookie("jwt"), Some("xyz"));
        assert_eq!(req.cookie("missing"), None);
    }
}
