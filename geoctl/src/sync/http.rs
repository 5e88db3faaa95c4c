//! Shared HTTP clients for outbound requests to IBGE and image hosts.

use reqwest::Client;
use std::time::Duration;
use url::Url;

/// A pair of clients built once: one verifying TLS certificates and one accepting invalid ones.
/// Callers pick per request through the `verify` flag.
#[derive(Debug, Clone)]
pub struct HttpClients {
    verified: Client,
    insecure: Client,
}

impl HttpClients {
    pub fn new(request_timeout: Duration) -> reqwest::Result<Self> {
        // No-op when the binary already installed the provider; tests rely on this call.
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        let verified = Client::builder().timeout(request_timeout).build()?;
        let insecure = Client::builder()
            .timeout(request_timeout)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self { verified, insecure })
    }

    pub fn get(&self, verify: bool) -> &Client {
        if verify { &self.verified } else { &self.insecure }
    }
}

/// Makes sure a url has a trailing slash.
///
/// `Url::join` replaces the last path segment unless the base ends with '/', so
/// `.../localidades` joined with `estados` would otherwise give `.../estados`.
pub fn ensure_slash(url: &Url) -> Url {
    if url.path().ends_with('/') {
        url.clone()
    } else {
        let mut new_url = url.clone();
        let mut path = new_url.path().to_string();
        path.push('/');
        new_url.set_path(&path);
        new_url
    }
}
