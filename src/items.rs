//! Cart line items

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identity of a cart line: the `(product, variant)` pair that decides
/// whether two additions merge.
///
/// An empty variant name is a value in its own right, so products without
/// variants merge on the product id alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    /// Opaque product identifier.
    pub product_id: String,

    /// Chosen variant name, empty when the product has no variants.
    pub variant_name: String,
}

impl LineKey {
    /// Creates a new line key.
    #[must_use]
    pub fn new(product_id: impl Into<String>, variant_name: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            variant_name: variant_name.into(),
        }
    }
}

/// Descriptive variant attributes. Informational only, never part of the
/// line identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSpecs {
    /// Size label, if any.
    #[serde(default)]
    pub size: String,

    /// Colour label, if any.
    #[serde(default)]
    pub color: String,

    /// Material label, if any.
    #[serde(default)]
    pub material: String,

    /// Free-text specification.
    #[serde(default)]
    pub specifications: String,
}

/// One purchasable unit in the cart, with an aggregated quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    /// Product identifier, immutable once the line exists.
    pub product_id: String,

    /// Variant name, empty when the product has no variants.
    pub variant_name: String,

    /// Display name, not used for identity.
    pub name: String,

    /// Price of one unit of this exact variant (base price plus the
    /// variant's additional price). Fixed at the time of first add.
    pub unit_price: Decimal,

    /// Base product price before the variant adjustment.
    pub base_price: Decimal,

    /// Aggregated quantity, always at least 1.
    pub quantity: u32,

    /// Descriptive variant attributes.
    pub specs: VariantSpecs,

    /// Image id or icon fallback identifier.
    pub thumbnail: String,
}

impl LineItem {
    /// Returns this line's identity key.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey::new(self.product_id.clone(), self.variant_name.clone())
    }

    /// Returns `unit_price * quantity`, recomputed from the current fields.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Input for adding a line to the cart.
///
/// When the identity key already exists in the cart, only `quantity` is
/// taken from this value; the existing line keeps its price, specs and
/// thumbnail.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLineItem {
    /// Product identifier.
    pub product_id: String,

    /// Variant name, empty when the product has no variants.
    pub variant_name: String,

    /// Display name.
    pub name: String,

    /// Price of one unit of this exact variant.
    pub unit_price: Decimal,

    /// Base product price before the variant adjustment.
    pub base_price: Decimal,

    /// Requested quantity, must be at least 1.
    pub quantity: u32,

    /// Descriptive variant attributes.
    pub specs: VariantSpecs,

    /// Image id or icon fallback identifier.
    pub thumbnail: String,
}

impl NewLineItem {
    /// Returns the identity key this addition merges on.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey::new(self.product_id.clone(), self.variant_name.clone())
    }
}

impl From<NewLineItem> for LineItem {
    fn from(new: NewLineItem) -> Self {
        Self {
            product_id: new.product_id,
            variant_name: new.variant_name,
            name: new.name,
            unit_price: new.unit_price,
            base_price: new.base_price,
            quantity: new.quantity,
            specs: new.specs,
            thumbnail: new.thumbnail,
        }
    }
}
