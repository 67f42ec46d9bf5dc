//! Cart records
//!
//! The persisted shape of a cart line, kept field-for-field compatible with
//! carts already sitting in browser storage: camelCase keys, prices as JSON
//! numbers, and both the old `image` and the newer `thumbnailUrl` slot.
//! Older carts carried only `{id, name, price, image, quantity}`, so every
//! later field is optional on the way in.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::items::{LineItem, VariantSpecs};

/// A persisted record is structurally valid JSON but semantically unusable.
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    /// Quantity 0 is never stored; a line reduced to 0 is removed instead.
    #[error("record quantity must be at least 1")]
    ZeroQuantity,

    /// Prices are non-negative by construction.
    #[error("record price {0} is negative")]
    NegativePrice(Decimal),
}

/// One line of the persisted cart blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRecord {
    /// Product identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Unit price actually charged (base plus variant adjustment).
    pub price: Decimal,

    /// Image id or icon fallback identifier (oldest thumbnail slot).
    #[serde(default)]
    pub image: Option<String>,

    /// Aggregated quantity.
    pub quantity: u32,

    /// Base product price before the variant adjustment.
    #[serde(default)]
    pub base_price: Option<Decimal>,

    /// Variant name, empty when the product has no variants.
    #[serde(default)]
    pub variant_name: String,

    /// Descriptive variant attributes.
    #[serde(default)]
    pub variant_specs: VariantSpecs,

    /// Variant-adjusted unit price, always equal to `price`.
    #[serde(default)]
    pub variant_price: Option<Decimal>,

    /// Unit price, always equal to `price`.
    #[serde(default)]
    pub unit_price: Option<Decimal>,

    /// `price * quantity` at the time of the last write.
    #[serde(default)]
    pub subtotal: Option<Decimal>,

    /// Image id or icon fallback identifier (newer thumbnail slot).
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl From<&LineItem> for CartItemRecord {
    fn from(line: &LineItem) -> Self {
        Self {
            id: line.product_id.clone(),
            name: line.name.clone(),
            price: line.unit_price,
            image: Some(line.thumbnail.clone()),
            quantity: line.quantity,
            base_price: Some(line.base_price),
            variant_name: line.variant_name.clone(),
            variant_specs: line.specs.clone(),
            variant_price: Some(line.unit_price),
            unit_price: Some(line.unit_price),
            subtotal: Some(line.subtotal()),
            thumbnail_url: Some(line.thumbnail.clone()),
        }
    }
}

impl TryFrom<CartItemRecord> for LineItem {
    type Error = RecordError;

    fn try_from(record: CartItemRecord) -> Result<Self, Self::Error> {
        if record.quantity == 0 {
            return Err(RecordError::ZeroQuantity);
        }

        let unit_price = record.price;
        if unit_price.is_sign_negative() && !unit_price.is_zero() {
            return Err(RecordError::NegativePrice(unit_price));
        }

        Ok(Self {
            product_id: record.id,
            variant_name: record.variant_name,
            name: record.name,
            unit_price,
            base_price: record.base_price.unwrap_or(unit_price),
            quantity: record.quantity,
            specs: record.variant_specs,
            thumbnail: record
                .thumbnail_url
                .or(record.image)
                .unwrap_or_default(),
        })
    }
}
