use std::sync::Arc;

use crate::app::{FreshetError, Result};
use crate::fetcher::Fetcher;

/// Fetches a target URL through an ordered list of relay proxies.
///
/// Proxies are tried front-to-back on every call. Proxy reliability is
/// systemic rather than per-target, so there is no rotation here; a
/// failed attempt simply falls through to the next proxy.
#[derive(Clone)]
pub struct ProxyClient {
    fetcher: Arc<dyn Fetcher>,
    proxies: Vec<String>,
}

impl ProxyClient {
    pub fn new(fetcher: Arc<dyn Fetcher>, proxies: Vec<String>) -> Self {
        Self { fetcher, proxies }
    }

    /// Try every proxy in order; first success wins. Fails with
    /// `AllProxiesFailed` only after the whole list has been exhausted.
    pub async fn fetch_via_proxies(&self, target: &str) -> Result<String> {
        for proxy in &self.proxies {
            let url = format!("{}{}", proxy, encode_component(target));
            match self.fetcher.get_text(&url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    tracing::debug!("Proxy {} failed for {}: {}", proxy, target, e);
                    continue;
                }
            }
        }

        Err(FreshetError::AllProxiesFailed(target.to_string()))
    }
}

/// Percent-encode a URL so it can ride in a proxy's query string.
pub fn encode_component(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
