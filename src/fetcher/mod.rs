pub mod http_fetcher;
pub mod proxy;
pub mod rotation;

use async_trait::async_trait;

use crate::app::Result;

pub use http_fetcher::HttpFetcher;
pub use proxy::ProxyClient;
pub use rotation::RotationCursor;

/// A single outbound GET returning the response body as text.
///
/// Non-2xx statuses are errors; every caller in the crate treats a
/// failed attempt as a soft failure and moves to the next endpoint.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String>;
}
