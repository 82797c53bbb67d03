//! Nearby-shop selection.

pub mod distance;
pub mod selector;

pub use distance::{format_distance, haversine_km, EARTH_RADIUS_KM};
pub use selector::{nearby_shops, GeoError, Reference, ShopSelector};
