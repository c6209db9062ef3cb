#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Response headers with lowercased names, in wire order.
    ///
    /// Repeated headers are kept as separate entries. `set-cookie` values must never be joined
    /// with ", " because cookie attributes such as `Expires` contain commas themselves.
    pub headers: Vec<(String, String)>,
}

/// A bodiless request against one URL.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: http::Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: &str) -> Self {
        Self::get_owned(url.to_string())
    }

    pub fn get_owned(url: String) -> Self {
        Self {
            method: http::Method::GET,
            url,
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}
