//! Cart
//!
//! The in-memory cart: an ordered sequence of [`LineItem`]s with a
//! uniqueness guarantee on the `(product, variant)` identity key. All
//! mutation goes through [`Cart`] methods so the invariants hold after
//! every operation. Persistence lives in [`crate::store`], not here.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::items::{LineItem, LineKey, NewLineItem};

/// Validation errors raised by cart mutations. A failed mutation leaves the
/// cart exactly as it was.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// A unit price below zero was supplied.
    #[error("unit price {0} is negative")]
    NegativePrice(Decimal),

    /// An add was requested with a zero quantity.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// The addressed line does not exist (use `add` to create one).
    #[error("no cart line for product {product_id:?} variant {variant_name:?}")]
    LineNotFound {
        /// Product id of the missing line.
        product_id: String,
        /// Variant name of the missing line.
        variant_name: String,
    },

    /// Two lines share an identity key. Only reachable from persisted data;
    /// in-memory merging makes duplicates impossible.
    #[error("duplicate cart line for product {product_id:?} variant {variant_name:?}")]
    DuplicateLine {
        /// Product id of the duplicated line.
        product_id: String,
        /// Variant name of the duplicated line.
        variant_name: String,
    },
}

impl CartError {
    fn not_found(key: &LineKey) -> Self {
        Self::LineNotFound {
            product_id: key.product_id.clone(),
            variant_name: key.variant_name.clone(),
        }
    }
}

/// The full ordered sequence of cart lines held by one session.
///
/// Insertion order is preserved across merges: a line keeps its original
/// position when its quantity is incremented.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<LineItem>,
    index: FxHashMap<LineKey, usize>,
}

impl Cart {
    /// Creates an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a cart from already-validated lines, e.g. restored state.
    ///
    /// # Errors
    ///
    /// - [`CartError::ZeroQuantity`] if a line has quantity 0.
    /// - [`CartError::NegativePrice`] if a line has a negative unit price.
    /// - [`CartError::DuplicateLine`] if two lines share an identity key.
    pub fn from_lines(lines: Vec<LineItem>) -> Result<Self, CartError> {
        let mut cart = Self::new();

        for line in lines {
            validate(line.unit_price, line.quantity)?;

            let key = line.key();
            if cart.index.contains_key(&key) {
                return Err(CartError::DuplicateLine {
                    product_id: key.product_id,
                    variant_name: key.variant_name,
                });
            }

            cart.index.insert(key, cart.lines.len());
            cart.lines.push(line);
        }

        Ok(cart)
    }

    /// Merges a new addition into the cart.
    ///
    /// An existing line with the same identity key has its quantity
    /// incremented in place and keeps its position, price, specs and
    /// thumbnail. Otherwise the addition is appended as a new line.
    ///
    /// # Errors
    ///
    /// - [`CartError::ZeroQuantity`] if the requested quantity is 0.
    /// - [`CartError::NegativePrice`] if the unit price is negative.
    pub fn merge(&mut self, new: NewLineItem) -> Result<&LineItem, CartError> {
        validate(new.unit_price, new.quantity)?;

        let key = new.key();
        let position = match self.index.get(&key) {
            Some(&i) => {
                if let Some(line) = self.lines.get_mut(i) {
                    line.quantity = line.quantity.saturating_add(new.quantity);
                }
                i
            }
            None => {
                let i = self.lines.len();
                self.index.insert(key.clone(), i);
                self.lines.push(new.into());
                i
            }
        };

        self.lines.get(position).ok_or_else(|| CartError::not_found(&key))
    }

    /// Removes the line with the given identity key, returning it. Absent
    /// keys are a no-op, not an error.
    pub fn remove(&mut self, key: &LineKey) -> Option<LineItem> {
        let position = self.index.remove(key)?;
        let removed = self.lines.remove(position);

        // Lines after the removed one shift left by one.
        for (i, line) in self.lines.iter().enumerate().skip(position) {
            self.index.insert(line.key(), i);
        }

        Some(removed)
    }

    /// Sets an existing line's quantity directly. A quantity of 0 removes
    /// the line entirely.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if no line has this key.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: u32) -> Result<(), CartError> {
        let Some(&position) = self.index.get(key) else {
            return Err(CartError::not_found(key));
        };

        if quantity == 0 {
            self.remove(key);
        } else if let Some(line) = self.lines.get_mut(position) {
            line.quantity = quantity;
        }

        Ok(())
    }

    /// Returns the line with the given identity key, if present.
    #[must_use]
    pub fn get(&self, key: &LineKey) -> Option<&LineItem> {
        self.index.get(key).and_then(|&i| self.lines.get(i))
    }

    /// Returns the lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Iterates over the lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.lines.iter()
    }

    /// Returns the number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Checks whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line quantities (the badge count, not the line count).
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of all line subtotals.
    #[must_use]
    pub fn total_amount(&self) -> Decimal {
        self.lines.iter().map(LineItem::subtotal).sum()
    }
}

fn validate(unit_price: Decimal, quantity: u32) -> Result<(), CartError> {
    if unit_price.is_sign_negative() && !unit_price.is_zero() {
        return Err(CartError::NegativePrice(unit_price));
    }

    if quantity == 0 {
        return Err(CartError::ZeroQuantity);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::items::VariantSpecs;

    use super::*;

    fn addition(product_id: &str, variant_name: &str, price: i64, quantity: u32) -> NewLineItem {
        NewLineItem {
            product_id: product_id.into(),
            variant_name: variant_name.into(),
            name: format!("Product {product_id}"),
            unit_price: Decimal::from(price),
            base_price: Decimal::from(price),
            quantity,
            specs: VariantSpecs::default(),
            thumbnail: String::new(),
        }
    }

    #[test]
    fn merge_appends_new_line() -> TestResult {
        let mut cart = Cart::new();

        cart.merge(addition("P1", "", 10, 2))?;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);

        Ok(())
    }

    #[test]
    fn merge_increments_existing_line_in_place() -> TestResult {
        let mut cart = Cart::new();

        cart.merge(addition("P1", "", 10, 2))?;
        cart.merge(addition("P2", "", 5, 1))?;
        cart.merge(addition("P1", "", 10, 3))?;

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.lines()[0].product_id, "P1");
        assert_eq!(cart.lines()[0].quantity, 5);

        Ok(())
    }

    #[test]
    fn merge_preserves_price_at_first_add() -> TestResult {
        let mut cart = Cart::new();

        cart.merge(addition("P1", "", 10, 1))?;
        cart.merge(addition("P1", "", 99, 1))?;

        assert_eq!(cart.lines()[0].unit_price, Decimal::from(10));
        assert_eq!(cart.lines()[0].subtotal(), Decimal::from(20));

        Ok(())
    }

    #[test]
    fn distinct_variants_are_distinct_lines() -> TestResult {
        let mut cart = Cart::new();

        cart.merge(addition("P1", "A", 10, 1))?;
        cart.merge(addition("P1", "B", 10, 1))?;

        assert_eq!(cart.len(), 2);

        Ok(())
    }

    #[test]
    fn merge_rejects_zero_quantity() {
        let mut cart = Cart::new();

        let result = cart.merge(addition("P1", "", 10, 0));

        assert_eq!(result, Err(CartError::ZeroQuantity));
        assert!(cart.is_empty());
    }

    #[test]
    fn merge_rejects_negative_price() {
        let mut cart = Cart::new();

        let result = cart.merge(addition("P1", "", -10, 1));

        assert!(matches!(result, Err(CartError::NegativePrice(_))));
        assert!(cart.is_empty());
    }

    #[test]
    fn remove_missing_key_is_noop() -> TestResult {
        let mut cart = Cart::new();
        cart.merge(addition("P1", "", 10, 2))?;

        assert_eq!(cart.remove(&LineKey::new("P9", "")), None);
        assert_eq!(cart.len(), 1);

        Ok(())
    }

    #[test]
    fn remove_reindexes_following_lines() -> TestResult {
        let mut cart = Cart::new();
        cart.merge(addition("P1", "", 10, 1))?;
        cart.merge(addition("P2", "", 20, 1))?;
        cart.merge(addition("P3", "", 30, 1))?;

        cart.remove(&LineKey::new("P1", ""));
        cart.merge(addition("P3", "", 30, 1))?;

        assert_eq!(cart.lines()[1].product_id, "P3");
        assert_eq!(cart.lines()[1].quantity, 2);

        Ok(())
    }

    #[test]
    fn set_quantity_zero_removes_line() -> TestResult {
        let mut cart = Cart::new();
        cart.merge(addition("P1", "", 10, 3))?;

        cart.set_quantity(&LineKey::new("P1", ""), 0)?;

        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn set_quantity_on_missing_line_errors() {
        let mut cart = Cart::new();

        let result = cart.set_quantity(&LineKey::new("P1", ""), 2);

        assert!(matches!(result, Err(CartError::LineNotFound { .. })));
    }

    #[test]
    fn totals_sum_quantities_and_subtotals() -> TestResult {
        let mut cart = Cart::new();
        cart.merge(addition("P1", "", 10, 5))?;
        cart.merge(addition("P1", "L", 12, 1))?;

        assert_eq!(cart.total_item_count(), 6);
        assert_eq!(cart.total_amount(), Decimal::from(62));

        Ok(())
    }

    #[test]
    fn from_lines_rejects_duplicate_identity() -> TestResult {
        let mut cart = Cart::new();
        cart.merge(addition("P1", "", 10, 1))?;
        let line = cart.lines()[0].clone();

        let result = Cart::from_lines(vec![line.clone(), line]);

        assert!(matches!(result, Err(CartError::DuplicateLine { .. })));

        Ok(())
    }
}
