use bytes::Bytes;
use http_body_util::{BodyExt as _, Empty};
use hyper::Request;
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use std::time::Duration;

use super::util::{has_header, host_header_value};
use super::{Error, HttpRequest, HttpResponse, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    /// Keep idle connections pooled between requests. When disabled every request opens a new
    /// connection and asks the server to close it afterwards.
    pub keep_alive: bool,
    pub connect_timeout: Option<Duration>,
    /// Applied to the whole exchange: connect, head and body.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        // Bounded so an unreachable node surfaces as an error instead of stalling a worker.
        Self {
            keep_alive: true,
            connect_timeout: Some(Duration::from_secs(3)),
            request_timeout: Some(Duration::from_secs(5)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client<HttpsConnector<HttpConnector>, Empty<Bytes>>,
    options: ClientOptions,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(ClientOptions::default())
    }
}

impl HttpClient {
    #[must_use]
    pub fn new(options: ClientOptions) -> Self {
        let mut http_connector = HttpConnector::new();
        http_connector.enforce_http(false);
        http_connector.set_connect_timeout(options.connect_timeout);
        http_connector.set_nodelay(true);

        let https_connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(http_connector);

        let mut builder = Client::builder(TokioExecutor::new());
        if !options.keep_alive {
            builder.pool_max_idle_per_host(0);
        }
        let inner = builder.build(https_connector);

        Self { inner, options }
    }

    pub async fn request(&self, req: HttpRequest) -> Result<HttpResponse> {
        match self.options.request_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, self.exchange(req)).await {
                Ok(res) => res,
                Err(_) => Err(Error::Timeout(timeout)),
            },
            None => self.exchange(req).await,
        }
    }

    pub async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.request(HttpRequest::get(url)).await
    }

    async fn exchange(&self, req: HttpRequest) -> Result<HttpResponse> {
        let parsed = url::Url::parse(&req.url).map_err(|_| Error::InvalidUrl(req.url.clone()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(Error::UnsupportedScheme(req.url));
        }

        let uri: hyper::Uri = req
            .url
            .parse()
            .map_err(|_| Error::InvalidUrl(req.url.to_string()))?;

        let mut builder = Request::builder().method(req.method).uri(uri);

        if !has_header(&req.headers, "host")
            && let Some(host) = host_header_value(&parsed)
        {
            builder = builder.header(http::header::HOST, host);
        }
        if !self.options.keep_alive && !has_header(&req.headers, "connection") {
            builder = builder.header(http::header::CONNECTION, "close");
        }

        for (k, v) in req.headers {
            let name = http::header::HeaderName::from_bytes(k.as_bytes())?;
            let value = http::header::HeaderValue::from_str(&v)?;
            builder = builder.header(name, value);
        }

        let req: Request<Empty<Bytes>> = builder.body(Empty::new())?;
        let res: hyper::Response<Incoming> = self.inner.request(req).await?;

        let (parts, body) = res.into_parts();
        let status = parts.status.as_u16();

        let headers: Vec<(String, String)> = parts
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_ascii_lowercase(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        // Drain the body so the connection can go back to the pool.
        body.collect().await?;

        Ok(HttpResponse { status, headers })
    }
}
