use super::{format_distance, haversine_km};
use crate::catalog;
use crate::model::{Location, Shop, ShopListing};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeoError {
    #[error("Current location is unavailable")]
    LocationUnavailable,
    #[error("Unknown area: {0}")]
    UnknownArea(String),
    #[error("Shop {0} is not among the nearby shops")]
    UnknownShop(u32),
}

/// Shops within `radius_km` of `reference`, nearest first.
///
/// An empty result means nothing is close enough; it is not an error.
pub fn nearby_shops(reference: Location, shops: &[Shop], radius_km: f64) -> Vec<ShopListing> {
    let mut listings: Vec<ShopListing> = shops
        .iter()
        .map(|shop| {
            let km = haversine_km(reference, shop.coordinates);
            ShopListing {
                shop: shop.clone(),
                distance_value: km,
                distance: format_distance(km),
            }
        })
        .filter(|listing| listing.distance_value <= radius_km)
        .collect();
    listings.sort_by(|a, b| a.distance_value.total_cmp(&b.distance_value));
    listings
}

/// What nearby shops are measured from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reference {
    CurrentLocation,
    Area(&'static str),
}

/// Shop finder state: the chosen reference, the shops near it and the shop picked from them.
#[derive(Debug)]
pub struct ShopSelector {
    shops: Vec<Shop>,
    radius_km: f64,
    reference: Reference,
    device: Option<Location>,
    listings: Vec<ShopListing>,
    selected: Option<ShopListing>,
}

impl ShopSelector {
    pub fn new(shops: Vec<Shop>, radius_km: f64) -> Self {
        Self {
            shops,
            radius_km,
            reference: Reference::CurrentLocation,
            device: None,
            listings: Vec::new(),
            selected: None,
        }
    }

    pub fn reference(&self) -> Reference {
        self.reference
    }

    pub fn reference_label(&self) -> &str {
        match self.reference {
            Reference::CurrentLocation => "Current Location",
            Reference::Area(name) => name,
        }
    }

    /// The coordinate shops are measured from.
    pub fn reference_location(&self) -> Result<Location, GeoError> {
        match self.reference {
            Reference::CurrentLocation => self.device.ok_or(GeoError::LocationUnavailable),
            Reference::Area(name) => catalog::area(name)
                .map(|area| area.coordinates)
                .ok_or_else(|| GeoError::UnknownArea(name.to_string())),
        }
    }

    pub fn listings(&self) -> &[ShopListing] {
        &self.listings
    }

    pub fn selected(&self) -> Option<&ShopListing> {
        self.selected.as_ref()
    }

    /// Measure from a named area. Clears the picked shop.
    pub fn select_area(&mut self, name: &str) -> Result<&[ShopListing], GeoError> {
        let area = catalog::area(name).ok_or_else(|| GeoError::UnknownArea(name.to_string()))?;
        self.reference = Reference::Area(area.name);
        self.selected = None;
        self.refresh()
    }

    /// Measure from the device location again. Clears the picked shop.
    pub fn use_current_location(&mut self) -> Result<&[ShopListing], GeoError> {
        self.reference = Reference::CurrentLocation;
        self.selected = None;
        self.refresh()
    }

    /// Record a new device fix (or its loss) and recompute.
    pub fn set_device_location(
        &mut self,
        location: Option<Location>,
    ) -> Result<&[ShopListing], GeoError> {
        self.device = location;
        self.refresh()
    }

    pub fn select_shop(&mut self, id: u32) -> Result<&ShopListing, GeoError> {
        let listing = self
            .listings
            .iter()
            .find(|l| l.shop.id == id)
            .cloned()
            .ok_or(GeoError::UnknownShop(id))?;
        Ok(self.selected.insert(listing))
    }

    /// Recompute the nearby shops; the nearest is picked if no shop is picked yet.
    pub fn refresh(&mut self) -> Result<&[ShopListing], GeoError> {
        let reference = match self.reference_location() {
            Ok(location) => location,
            Err(e) => {
                self.listings.clear();
                return Err(e);
            }
        };
        self.listings = nearby_shops(reference, &self.shops, self.radius_km);
        if self.selected.is_none() {
            self.selected = self.listings.first().cloned();
        }
        debug!(
            reference = %reference,
            found = self.listings.len(),
            "Nearby shops refreshed"
        );
        Ok(&self.listings)
    }
}
