/// A geolocation record as reported by the geolocation service.
///
/// The record starts out zero-valued and is only ever replaced as a whole.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Geolocation {
    pub ip: String,
    pub location: Location,
    pub isp: String,
}

#[derive(Clone, Default, Debug, PartialEq)]
pub struct Location {
    pub country: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String, // UTC offset as sent by the service, e.g. "-06:00"
}
