use crate::model::{Product, ProductId};
use serde::{Deserialize, Serialize};

/// A product in the cart together with how many of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    pub fn new(product: Product, quantity: u32) -> Self {
        Self { product, quantity }
    }

    pub fn line_total(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }
}

/// The cart: lines in order of first add, plus their total.
///
/// `total` is never set on its own. Every mutation ends in [`CartState::recompute`], so
/// `total == Σ price × quantity` holds for every value a caller can observe, and no line
/// ever has a quantity of zero.
///
/// Serializes as `{ "items": [{ "product": .., "quantity": n }], "total": x }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CartState {
    #[serde(rename = "items")]
    lines: Vec<CartLine>,
    total: f64,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from arbitrary lines.
    ///
    /// Zero-quantity lines are dropped and repeated products are merged into the position of
    /// their first occurrence.
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut state = Self::new();
        for line in lines.into_iter().filter(|l| l.quantity > 0) {
            match state.position(line.product.id) {
                Some(idx) => {
                    let existing = &mut state.lines[idx];
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => state.lines.push(line),
            }
        }
        state.recompute();
        state
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of units across all lines.
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, l| acc.saturating_add(l.quantity))
    }

    pub fn line(&self, id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product.id == id)
    }

    pub fn quantity_of(&self, id: ProductId) -> u32 {
        self.line(id).map_or(0, |l| l.quantity)
    }

    fn position(&self, id: ProductId) -> Option<usize> {
        self.lines.iter().position(|l| l.product.id == id)
    }

    /// Increment the product's line, appending it with quantity 1 if absent.
    pub(crate) fn add(&mut self, product: Product) {
        match self.position(product.id) {
            Some(idx) => {
                let line = &mut self.lines[idx];
                line.quantity = line.quantity.saturating_add(1);
            }
            None => self.lines.push(CartLine::new(product, 1)),
        }
        self.recompute();
    }

    /// Returns whether a line was removed.
    pub(crate) fn remove(&mut self, id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product.id != id);
        self.recompute();
        self.lines.len() != before
    }

    /// Replace a line's quantity; `quantity <= 0` removes the line. Unknown ids are a no-op.
    ///
    /// Returns whether the cart changed.
    pub(crate) fn set_quantity(&mut self, id: ProductId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(id);
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let changed = match self.position(id) {
            Some(idx) if self.lines[idx].quantity != quantity => {
                self.lines[idx].quantity = quantity;
                true
            }
            _ => false,
        };
        self.recompute();
        changed
    }

    pub(crate) fn clear(&mut self) {
        self.lines.clear();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.total = self.lines.iter().map(CartLine::line_total).sum();
    }
}
