use crate::model::Location;
use serde::{Deserialize, Serialize};

/// A shop directory entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: u32,
    pub name: String,
    pub address: String,
    pub timing: String,
    pub coordinates: Location,
    #[serde(default)]
    pub image: String,
}

/// A shop enriched with its distance from the reference point of one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopListing {
    #[serde(flatten)]
    pub shop: Shop,
    pub distance_value: f64,
    pub distance: String,
}

/// A named area that can stand in for the device location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Area {
    pub name: &'static str,
    pub coordinates: Location,
}
