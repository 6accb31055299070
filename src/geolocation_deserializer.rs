use crate::domain::{Geolocation, Location, TimezoneOffset};
use serde::de::Error;
use serde::{Deserialize, Deserializer};

impl<'de> Deserialize<'de> for Geolocation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Debug, Deserialize)]
        pub struct Inner {
            ip: String,
            location: Location,
            isp: String,
        }

        let inner = Inner::deserialize(deserializer)?;
        Ok(Geolocation {
            ip: inner.ip,
            location: inner.location,
            isp: inner.isp,
        })
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Debug, Deserialize)]
        pub struct Inner {
            country: String,
            city: String,
            lat: f64,
            lng: f64,
            timezone: String,
        }

        let inner = Inner::deserialize(deserializer)?;
        if !(inner.lat >= -90.0 && inner.lat <= 90.0) {
            return Err(Error::custom(format!("invalid location latitude: {}, must be between -90 and 90", inner.lat)));
        }

        if !(inner.lng >= -180.0 && inner.lng <= 180.0) {
            return Err(Error::custom(format!("invalid location longitude: {}, must be between -180 and 180", inner.lng)));
        }

        // The service leaves the offset empty for some reserved ranges
        if !inner.timezone.is_empty() {
            inner.timezone.parse::<TimezoneOffset>().map_err(D::Error::custom)?;
        }

        Ok(Location {
            country: inner.country,
            city: inner.city,
            latitude: inner.lat,
            longitude: inner.lng,
            timezone: inner.timezone,
        })
    }
}
