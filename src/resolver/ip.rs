use crate::app_config::AppConfig;
use crate::resolver::{IpLookup, ResolveError, RetryPolicy, fetch_json};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::net::IpAddr;
use tracing::{info, instrument, warn};

#[derive(Debug, Deserialize)]
struct IpResponse {
    ip: String,
}

#[derive(Debug)]
pub struct IpResolver {
    client: Client,
    url: String,
    retry: RetryPolicy,
}

impl IpResolver {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        IpResolver {
            client,
            url: config.ip_echo().url().to_string(),
            retry: RetryPolicy::from_config(config.http()),
        }
    }
}

#[async_trait]
impl IpLookup for IpResolver {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn resolve_ip(&self) -> Result<String, ResolveError> {
        info!("🌐 Resolving public IP address...");

        let response: IpResponse = self.retry.run(|| fetch_json(self.client.get(&self.url))).await.inspect_err(|e| {
            warn!("🌐 Resolving public IP address... failed, {}", e);
        })?;

        let ip = response.ip.trim();
        if ip.parse::<IpAddr>().is_err() {
            warn!("🌐 Resolving public IP address... failed, '{}' is not an IP address", ip);
            return Err(ResolveError::InvalidPayload(format!("'{}' is not an IP address", ip)));
        }

        info!("🌐 Resolving public IP address... OK, {}", ip);
        Ok(ip.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AppConfigBuilder;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use test_log::test;

    async fn resolver_for(server: &mockito::Server) -> IpResolver {
        let config = AppConfigBuilder::new().ip_echo_url(format!("{}/ip", server.url())).build();
        IpResolver::new(Client::new(), &config)
    }

    #[test(tokio::test)]
    async fn resolve_ip_returns_the_echoed_ip() -> Result<(), ResolveError> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ip")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ip":"203.0.113.5"}"#)
            .create_async()
            .await;

        let ip = resolver_for(&server).await.resolve_ip().await?;

        mock.assert_async().await;
        assert_eq!(ip, "203.0.113.5");
        Ok(())
    }

    #[test(tokio::test)]
    async fn resolve_ip_accepts_ipv6() -> Result<(), ResolveError> {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/ip").with_status(200).with_body(r#"{"ip":"2001:db8::1"}"#).create_async().await;

        let ip = resolver_for(&server).await.resolve_ip().await?;

        assert_eq!(ip, "2001:db8::1");
        Ok(())
    }

    #[rstest]
    #[case::not_json("203.0.113.5")]
    #[case::missing_ip(r#"{"address":"203.0.113.5"}"#)]
    #[case::not_an_ip(r#"{"ip":"localhost"}"#)]
    #[case::empty_ip(r#"{"ip":""}"#)]
    #[tokio::test]
    async fn resolve_ip_rejects_a_malformed_body(#[case] body: &str) {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/ip").with_status(200).with_body(body).create_async().await;

        let result = resolver_for(&server).await.resolve_ip().await;

        assert!(matches!(result, Err(ResolveError::InvalidPayload(_))), "{:?}", result);
    }

    #[test(tokio::test)]
    async fn resolve_ip_reports_an_upstream_failure() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("GET", "/ip").with_status(503).with_body("Service Unavailable").expect(1).create_async().await;

        let result = resolver_for(&server).await.resolve_ip().await;

        mock.assert_async().await;
        assert!(matches!(result, Err(ResolveError::Upstream { status: 503, ref message }) if message == "Service Unavailable"));
    }

    #[test(tokio::test)]
    async fn resolve_ip_fails_when_the_service_is_unreachable() {
        let config = AppConfigBuilder::new().ip_echo_url("http://127.0.0.1:9/ip".to_string()).retry_attempts(1).build();
        let resolver = IpResolver::new(Client::new(), &config);

        let result = resolver.resolve_ip().await;

        assert!(matches!(result, Err(ResolveError::Request(_))));
    }

    #[test(tokio::test)]
    async fn resolve_ip_does_not_retry_an_upstream_failure() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("GET", "/ip").with_status(503).with_body("Service Unavailable").expect(1).create_async().await;
        let config = AppConfigBuilder::new().ip_echo_url(format!("{}/ip", server.url())).retry_attempts(2).build();
        let resolver = IpResolver::new(Client::new(), &config);

        let result = resolver.resolve_ip().await;

        mock.assert_async().await;
        assert!(matches!(result, Err(ResolveError::Upstream { status: 503, .. })));
    }
}
