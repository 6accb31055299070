mod error;
mod geolocation;
mod ip;
mod retry;

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::Geolocation;
pub use error::ResolveError;
pub use geolocation::GeolocationResolver;
pub use ip::IpResolver;
pub use retry::RetryPolicy;

/// Resolves the public IP address of the caller.
#[async_trait]
pub trait IpLookup: Send + Sync {
    async fn resolve_ip(&self) -> Result<String, ResolveError>;
}

/// Maps an IP address or domain to a geolocation record.
#[async_trait]
pub trait GeolocationLookup: Send + Sync {
    async fn lookup(&self, ip_or_domain: &str) -> Result<Geolocation, ResolveError>;
}

/// Sends the request and parses a successful body as `T`, any other status becomes [ResolveError::Upstream].
async fn fetch_json<T>(request: RequestBuilder) -> Result<T, ResolveError>
where
    T: DeserializeOwned,
{
    let response = request.send().await.map_err(ResolveError::from_request)?;
    let status = response.status();
    let body = response.text().await.map_err(ResolveError::from_request)?;

    if !status.is_success() {
        return Err(ResolveError::Upstream {
            status: status.as_u16(),
            message: upstream_message(&body).unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string()),
        });
    }

    serde_json::from_str(&body).map_err(|e| ResolveError::InvalidPayload(e.to_string()))
}

fn upstream_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        messages: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(error_body) => Some(error_body.messages),
        Err(_) if !body.trim().is_empty() => Some(body.trim().to_string()),
        Err(_) => None,
    }
}
