use crate::domain::Geolocation;
use crate::resolver::{GeolocationLookup, IpLookup, ResolveError};
use crate::search_form::SearchQuery;
use crate::store::Store;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, instrument};

pub type StageOutcome<T> = Result<T, ResolveError>;

/// Outcome of every stage that ran during a lookup.
#[derive(Debug)]
pub struct LookupReport {
    pub ip: Option<StageOutcome<String>>,
    pub geolocation: StageOutcome<Geolocation>,
    pub duration: Duration,
}

/// Resolve-IP followed by Resolve-Geolocation, reporting each stage to the store.
#[derive(Clone)]
pub struct Pipeline {
    ip_lookup: Arc<dyn IpLookup>,
    geolocation_lookup: Arc<dyn GeolocationLookup>,
}

impl Pipeline {
    pub fn new(ip_lookup: Arc<dyn IpLookup>, geolocation_lookup: Arc<dyn GeolocationLookup>) -> Self {
        Pipeline {
            ip_lookup,
            geolocation_lookup,
        }
    }

    /// Looks up the caller's own location.
    ///
    /// A failed IP stage does not stop the pipeline: the geolocation stage then runs with an empty
    /// address, for which the service reports the location of the caller.
    #[instrument(skip_all)]
    pub async fn run_initial(&self, store: &Store) -> LookupReport {
        info!("▶️ Running initial lookup...");
        let start = Instant::now();

        store.begin_ip_lookup();
        let ip = self.ip_lookup.resolve_ip().await;
        store.finish_ip_lookup(&ip);

        let ip_address = ip.as_deref().unwrap_or_default().to_string();
        let geolocation = self.resolve_geolocation(store, &ip_address).await;

        let duration = Instant::now() - start;
        info!(duration = ?duration, "▶️ Running initial lookup... OK");

        LookupReport {
            ip: Some(ip),
            geolocation,
            duration,
        }
    }

    /// Looks up a submitted search, the IP stage is skipped.
    #[instrument(skip_all, fields(query = query.as_str()))]
    pub async fn run_search(&self, store: &Store, query: &SearchQuery) -> LookupReport {
        info!("▶️ Running search...");
        let start = Instant::now();

        store.begin_search();
        let geolocation = self.resolve_geolocation(store, query.as_str()).await;

        let duration = Instant::now() - start;
        info!(duration = ?duration, "▶️ Running search... OK");

        LookupReport {
            ip: None,
            geolocation,
            duration,
        }
    }

    async fn resolve_geolocation(&self, store: &Store, ip_or_domain: &str) -> StageOutcome<Geolocation> {
        store.begin_geolocation_lookup();
        let geolocation = self.geolocation_lookup.lookup(ip_or_domain).await;
        store.finish_geolocation_lookup(&geolocation);
        geolocation
    }
}
