mod geolocation;
mod timezone_offset;

pub use geolocation::{Geolocation, Location};
pub use timezone_offset::TimezoneOffset;
