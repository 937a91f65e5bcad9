use reqwest::{Client, Proxy};
use std::time::Duration;
use tracing::{info, warn};

/// Build the HTTP client a provider talks through.
///
/// - `None`: no explicit proxy; reqwest still honours `HTTPS_PROXY` / `HTTP_PROXY`.
/// - `Some("")`: direct connection, environment proxies ignored.
/// - `Some(url)`: route every request through `url`.
pub fn build_http_client(proxy: Option<&str>, timeout: Duration) -> Client {
    let mut builder = Client::builder().timeout(timeout);

    match proxy.map(str::trim) {
        Some("") => {
            info!("LLM provider forced to direct connect (proxy disabled)");
            builder = builder.no_proxy();
        }
        Some(url) => match Proxy::all(url) {
            Ok(p) => {
                info!(proxy = %url, "LLM provider using proxy");
                builder = builder.proxy(p);
            }
            Err(e) => {
                warn!(error = %e, proxy = %url, "Invalid proxy URL, falling back to direct connect");
            }
        },
        None => {}
    }

    builder.build().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to build HTTP client, using default");
        Client::new()
    })
}
