use crate::domain::Geolocation;
use crate::resolver::ResolveError;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::sync::watch::Receiver as WatchReceiver;
use tracing::{debug, warn};

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Settled,
}

impl LoadStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadStatus::Loading)
    }
}

/// Everything the view renders.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    pub ip_address: String,
    pub ip_status: LoadStatus,
    pub geolocation_status: LoadStatus,
    pub geolocation: Geolocation,
    pub last_error: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            ip_address: String::new(),
            ip_status: LoadStatus::Loading,
            geolocation_status: LoadStatus::Idle,
            geolocation: Geolocation::default(),
            last_error: None,
        }
    }
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        self.ip_status.is_loading() || self.geolocation_status.is_loading()
    }
}

/// Single writer of the [ViewState], every change is published to the subscribers.
#[derive(Clone, Debug)]
pub struct Store {
    tx: Arc<watch::Sender<ViewState>>,
}

impl Store {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ViewState::default());
        Store { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> WatchReceiver<ViewState> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> ViewState {
        self.tx.borrow().clone()
    }

    pub fn begin_ip_lookup(&self) {
        debug!("🔵 IP lookup started");
        self.tx.send_modify(|state| {
            state.ip_status = LoadStatus::Loading;
            state.last_error = None;
        });
    }

    pub fn finish_ip_lookup(&self, outcome: &Result<String, ResolveError>) {
        self.tx.send_modify(|state| {
            state.ip_status = LoadStatus::Settled;
            match outcome {
                Ok(ip) => state.ip_address = ip.clone(),
                Err(e) => {
                    warn!("⚠️ Could not resolve the public IP address: {}", e);
                    state.last_error = Some(format!("Could not resolve your IP address: {}", e));
                }
            }
        });
    }

    /// A search skips the IP stage, so it is marked settled, and drops the error of the previous lookup.
    pub fn begin_search(&self) {
        debug!("🔵 Search started");
        self.tx.send_modify(|state| {
            if state.ip_status.is_loading() {
                state.ip_status = LoadStatus::Settled;
            }
            state.last_error = None;
        });
    }

    pub fn begin_geolocation_lookup(&self) {
        debug!("🔵 Geolocation lookup started");
        self.tx.send_modify(|state| state.geolocation_status = LoadStatus::Loading);
    }

    pub fn finish_geolocation_lookup(&self, outcome: &Result<Geolocation, ResolveError>) {
        self.tx.send_modify(|state| {
            state.geolocation_status = LoadStatus::Settled;
            match outcome {
                // An IP failure earlier in the same lookup stays visible
                Ok(geolocation) => state.geolocation = geolocation.clone(),
                Err(e) => {
                    warn!("⚠️ Could not look up the geolocation: {}", e);
                    state.last_error = Some(format!("Could not look up the location: {}", e));
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Location;
    use pretty_assertions::assert_eq;

    fn springfield() -> Geolocation {
        Geolocation {
            ip: "203.0.113.5".to_string(),
            location: Location {
                country: "US".to_string(),
                city: "Springfield".to_string(),
                latitude: 39.1,
                longitude: -89.6,
                timezone: "-06:00".to_string(),
            },
            isp: "ExampleNet".to_string(),
        }
    }

    #[test]
    fn starts_with_the_ip_lookup_loading_and_a_zero_valued_record() {
        let state = Store::new().snapshot();

        assert_eq!(state.ip_status, LoadStatus::Loading);
        assert_eq!(state.geolocation_status, LoadStatus::Idle);
        assert_eq!(state.geolocation, Geolocation::default());
        assert!(state.is_loading());
    }

    #[test]
    fn settles_the_ip_lookup_on_success() {
        let store = Store::new();

        store.finish_ip_lookup(&Ok("203.0.113.5".to_string()));

        let state = store.snapshot();
        assert_eq!(state.ip_status, LoadStatus::Settled);
        assert_eq!(state.ip_address, "203.0.113.5");
        assert_eq!(state.last_error, None);
    }

    #[test]
    fn settles_the_ip_lookup_on_failure_and_keeps_the_ip_empty() {
        let store = Store::new();

        store.finish_ip_lookup(&Err(ResolveError::InvalidPayload("garbage".to_string())));

        let state = store.snapshot();
        assert_eq!(state.ip_status, LoadStatus::Settled);
        assert_eq!(state.ip_address, "");
        assert!(state.last_error.is_some());
    }

    #[test]
    fn replaces_the_record_wholesale_on_success() {
        let store = Store::new();
        store.finish_ip_lookup(&Ok("203.0.113.5".to_string()));
        store.begin_geolocation_lookup();
        assert!(store.snapshot().geolocation_status.is_loading());

        store.finish_geolocation_lookup(&Ok(springfield()));

        let state = store.snapshot();
        assert_eq!(state.geolocation_status, LoadStatus::Settled);
        assert_eq!(state.geolocation, springfield());
        assert!(!state.is_loading());
    }

    #[test]
    fn keeps_the_previous_record_when_a_lookup_fails() {
        let store = Store::new();
        store.finish_geolocation_lookup(&Ok(springfield()));

        store.begin_geolocation_lookup();
        store.finish_geolocation_lookup(&Err(ResolveError::Upstream {
            status: 422,
            message: "Input correct ipAddress or domain".to_string(),
        }));

        let state = store.snapshot();
        assert_eq!(state.geolocation, springfield());
        assert_eq!(
            state.last_error.as_deref(),
            Some("Could not look up the location: service responded with status 422: Input correct ipAddress or domain")
        );
    }

    #[test]
    fn keeps_the_ip_error_when_the_geolocation_lookup_succeeds() {
        let store = Store::new();
        store.finish_ip_lookup(&Err(ResolveError::InvalidPayload("garbage".to_string())));

        store.begin_geolocation_lookup();
        store.finish_geolocation_lookup(&Ok(springfield()));

        let state = store.snapshot();
        assert_eq!(state.geolocation, springfield());
        assert_eq!(
            state.last_error.as_deref(),
            Some("Could not resolve your IP address: invalid response payload: garbage")
        );
    }

    #[test]
    fn begin_search_settles_the_ip_stage_and_clears_the_last_error() {
        let store = Store::new();
        store.finish_geolocation_lookup(&Err(ResolveError::InvalidPayload("garbage".to_string())));

        store.begin_search();

        let state = store.snapshot();
        assert_eq!(state.ip_status, LoadStatus::Settled);
        assert_eq!(state.last_error, None);
    }

    #[tokio::test]
    async fn notifies_subscribers_of_changes() {
        let store = Store::new();
        let mut rx = store.subscribe();

        store.begin_geolocation_lookup();

        assert!(rx.changed().await.is_ok());
        assert!(rx.borrow_and_update().geolocation_status.is_loading());
    }
}
