use crate::app_config::{GeolocationConfig, Http};
use crate::domain::Geolocation;
use crate::resolver::{GeolocationLookup, ResolveError, RetryPolicy, fetch_json};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, instrument, warn};

/// Looks up IP addresses and domains with the geolocation service.
///
/// The API key is captured at construction and sent as the `apiKey` query parameter.
#[derive(Debug)]
pub struct GeolocationResolver {
    client: Client,
    url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl GeolocationResolver {
    pub fn new(client: Client, config: &GeolocationConfig, http: &Http) -> Self {
        GeolocationResolver {
            client,
            url: config.url().to_string(),
            api_key: config.api_key().to_string(),
            retry: RetryPolicy::from_config(http),
        }
    }
}

#[async_trait]
impl GeolocationLookup for GeolocationResolver {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn lookup(&self, ip_or_domain: &str) -> Result<Geolocation, ResolveError> {
        info!("📍 Looking up '{}'...", ip_or_domain);

        let geolocation: Geolocation = self
            .retry
            .run(|| fetch_json(self.client.get(&self.url).query(&[("apiKey", self.api_key.as_str()), ("ipAddress", ip_or_domain)])))
            .await
            .inspect_err(|e| warn!("📍 Looking up '{}'... failed, {}", ip_or_domain, e))?;

        info!(
            "📍 Looking up '{}'... OK, {}, {}",
            ip_or_domain, geolocation.location.city, geolocation.location.country
        );
        Ok(geolocation)
    }
}
