// HTTP client utilities
use crate::domain::error::TrackError;
use crate::infrastructure::config::ApiConfig;
use reqwest::{Client, Proxy};

/// Create the HTTP client from the API settings
pub fn create_client(api: &ApiConfig) -> Result<Client, TrackError> {
    let mut builder = Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(std::time::Duration::from_secs(30))
        .timeout(api.timeout())
        .user_agent(concat!("ordertrack/", env!("CARGO_PKG_VERSION")));

    if let Some(proxy) = api.http_proxy.as_deref().filter(|p| !p.is_empty()) {
        builder = builder.proxy(Proxy::all(proxy)?);
    }

    Ok(builder.build()?)
}
