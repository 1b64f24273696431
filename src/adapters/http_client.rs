use async_trait::async_trait;
use axum::body::Body as AxumBody;
use eyre::Result;
use hyper::{Request, Response, Version, header, header::HeaderValue};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use rustls_native_certs::load_native_certs;

use crate::ports::http_client::{HttpClient, HttpClientError, HttpClientResult};

const USER_AGENT: &str = concat!("triad-gateway/", env!("CARGO_PKG_VERSION"));

/// Upstream HTTP client adapter using Hyper with Rustls.
///
/// Responsibilities:
/// * Keeps one pooled connection set for the whole process (cheap to clone, never locked)
/// * Adds a small set of default headers
/// * Maps hyper failures onto the transport error taxonomy of the port
///
/// Deadlines and retries are the dispatcher's job; this adapter performs a
/// single exchange per call.
pub struct HttpClientAdapter {
    client: Client<HttpsConnector<HttpConnector>, AxumBody>,
}

impl HttpClientAdapter {
    /// Create a new HTTP client adapter.
    pub fn new() -> Result<Self> {
        // Install default crypto provider for rustls if not already set
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        let mut http_connector = HttpConnector::new();
        http_connector.enforce_http(false); // Allow HTTPS URLs
        http_connector.set_nodelay(true);

        let mut root_cert_store = rustls::RootCertStore::empty();
        let native_certs = load_native_certs();

        for cert in native_certs.certs {
            if root_cert_store.add(cert).is_err() {
                tracing::warn!("Failed to add native certificate to rustls RootCertStore");
            }
        }
        tracing::debug!("Loaded {} native root certificates.", root_cert_store.len());

        if !native_certs.errors.is_empty() {
            tracing::warn!(
                "Some native certificates failed to load: {:?}",
                native_certs.errors
            );
        }

        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_cert_store)
            .with_no_client_auth();

        // Upstreams are usually plain http inside the cluster; https works too.
        let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .wrap_connector(http_connector);

        let client = Client::builder(TokioExecutor::new()).build::<_, AxumBody>(https_connector);

        tracing::info!("Created upstream HTTP client (HTTP/1.1, rustls)");
        Ok(Self { client })
    }

    /// Inject a consistent set of headers if absent (User-Agent, Accept).
    fn add_common_headers(req: &mut Request<AxumBody>) {
        let headers = req.headers_mut();
        if !headers.contains_key(header::USER_AGENT) {
            headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        }
        if !headers.contains_key(header::ACCEPT) {
            headers.insert(
                header::ACCEPT,
                HeaderValue::from_static("application/json, text/plain;q=0.9, */*;q=0.8"),
            );
        }
    }

    /// Derive the Host header value from the request URI.
    fn host_header(req: &Request<AxumBody>) -> Option<HeaderValue> {
        let host = req.uri().host()?;
        let value = match req.uri().port() {
            Some(port) => format!("{host}:{}", port.as_u16()),
            None => host.to_string(),
        };
        HeaderValue::from_str(&value).ok()
    }
}

#[async_trait]
impl HttpClient for HttpClientAdapter {
    async fn send_request(
        &self,
        mut req: Request<AxumBody>,
    ) -> HttpClientResult<Response<AxumBody>> {
        Self::add_common_headers(&mut req);

        match Self::host_header(&req) {
            Some(host) => {
                req.headers_mut().insert(header::HOST, host);
            }
            None => {
                tracing::error!("Outgoing URI has no host: {}", req.uri());
                return Err(HttpClientError::InvalidRequest(format!(
                    "Outgoing URI has no host: {}",
                    req.uri()
                )));
            }
        }

        *req.version_mut() = Version::HTTP_11;

        let method = req.method().clone();
        let uri = req.uri().clone();
        tracing::debug!("Sending upstream request: {} {}", method, uri);

        match self.client.request(req).await {
            Ok(response) => {
                let (mut parts, hyper_body) = response.into_parts();
                // The body is re-framed by the caller.
                parts.headers.remove(header::TRANSFER_ENCODING);
                Ok(Response::from_parts(parts, AxumBody::new(hyper_body)))
            }
            Err(e) => {
                let phase = if e.is_connect() { "connect" } else { "exchange" };
                tracing::debug!(
                    "Upstream {} failure for {} {}: {:?}",
                    phase,
                    method,
                    uri,
                    e
                );
                let message = format!("Request to {method} {uri} failed: {}", error_chain(&e));
                if is_timeout(&e) {
                    Err(HttpClientError::Timeout(message))
                } else {
                    Err(HttpClientError::ConnectionError(message))
                }
            }
        }
    }
}

/// Flatten an error and its sources into one line ("client error (Connect): tcp connect error: Connection refused").
fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// True when any error in the chain is an OS-level timeout (e.g. a TCP connect
/// that the kernel gave up on).
fn is_timeout(error: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(err) = current {
        if err
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::TimedOut)
        {
            return true;
        }
        current = err.source();
    }
    false
}
