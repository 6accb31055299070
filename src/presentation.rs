use crate::app_config::MapConfig;
use crate::store::ViewState;
use std::fmt::Write;

pub const TITLE: &str = "IP Address Tracker";
pub const LOADING: &str = "...";
pub const POPUP_CAPTION: &str = "This is the IP Address location.";

const LABEL_WIDTH: usize = 12;

#[derive(Debug, PartialEq)]
pub struct Card {
    pub label: &'static str,
    pub value: String,
}

/// A map centred on the resolved location with a single marker.
#[derive(Debug, PartialEq)]
pub struct MapView {
    pub center: (f64, f64),
    pub marker: (f64, f64),
    pub zoom: u8,
    pub popup: &'static str,
    pub tile_url: String,
    pub attribution: String,
}

impl MapView {
    pub fn link(&self) -> String {
        let (lat, lng) = self.marker;
        format!("https://www.openstreetmap.org/?mlat={lat}&mlon={lng}#map={}/{lat}/{lng}", self.zoom)
    }
}

pub fn cards(state: &ViewState) -> [Card; 4] {
    let loading = state.is_loading();
    let value = |text: String| if loading { LOADING.to_string() } else { text };
    let geolocation = &state.geolocation;

    [
        Card {
            label: "IP ADDRESS",
            value: value(geolocation.ip.clone()),
        },
        Card {
            label: "LOCATION",
            value: value(format!("{}, {}", geolocation.location.city, geolocation.location.country)),
        },
        Card {
            label: "TIMEZONE",
            value: value(format!("UTC {}", geolocation.location.timezone)),
        },
        Card {
            label: "ISP",
            value: value(geolocation.isp.clone()),
        },
    ]
}

/// The map is only shown once the geolocation lookup is no longer in flight.
pub fn map_view(state: &ViewState, config: &MapConfig) -> Option<MapView> {
    if state.geolocation_status.is_loading() {
        return None;
    }

    let position = (state.geolocation.location.latitude, state.geolocation.location.longitude);
    Some(MapView {
        center: position,
        marker: position,
        zoom: config.zoom(),
        popup: POPUP_CAPTION,
        tile_url: config.tile_url().to_string(),
        attribution: config.attribution().to_string(),
    })
}

pub fn render(state: &ViewState, config: &MapConfig) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "{}\n", TITLE);
    for card in cards(state) {
        let _ = writeln!(out, "  {:<width$} {}", card.label, card.value, width = LABEL_WIDTH);
    }

    if let Some(error) = &state.last_error {
        let _ = writeln!(out, "  ! {}", error);
    }

    if let Some(map) = map_view(state, config) {
        let indent = " ".repeat(LABEL_WIDTH + 3);
        let _ = writeln!(out);
        let _ = writeln!(out, "  {:<width$} {}, {} (zoom {})", "MAP", map.center.0, map.center.1, map.zoom, width = LABEL_WIDTH);
        let _ = writeln!(out, "{indent}📍 {}", map.popup);
        let _ = writeln!(out, "{indent}{}", map.link());
        let _ = writeln!(out, "{indent}Tiles: {}", map.tile_url);
        let _ = writeln!(out, "{indent}{}", map.attribution);
    }

    out
}
