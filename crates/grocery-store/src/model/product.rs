use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for catalog products.
///
/// Catalog ids start at 1; `0` is what a payload without an id deserializes to and means
/// "no identity".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl ProductId {
    pub const UNASSIGNED: ProductId = ProductId(0);

    pub fn is_assigned(self) -> bool {
        self != Self::UNASSIGNED
    }
}

impl From<u32> for ProductId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "product_{}", self.0)
    }
}

/// A catalog product. Reference data: the stores copy it, never mutate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub unit: String,
    pub category: String,
    #[serde(default)]
    pub image: String,
}

impl Product {
    /// Creates a new Product without an image.
    ///
    /// # Arguments
    /// * `id` - Catalog identifier
    /// * `name` - Display name
    /// * `price` - Unit price in rupees
    /// * `unit` - Unit label ("kg", "dozen", ...)
    /// * `category` - Catalog category
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: f64,
        unit: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            unit: unit.into(),
            category: category.into(),
            image: String::new(),
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }
}
