//! Products
//!
//! Catalog-side data model: what the read-only catalog service returns for
//! categories and products, plus the small derivations the storefront pages
//! need (variant-adjusted prices, stock checks, thumbnail fallback) and the
//! construction of a cart addition from a product and chosen variant.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::items::{NewLineItem, VariantSpecs};

/// Icon identifier used when a product has no image.
pub const FALLBACK_THUMBNAIL: &str = "fas fa-shopping-bag";

/// A catalog category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Category identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,

    /// Number of products in the category, when the service reports it.
    #[serde(default)]
    pub product_count: Option<u64>,
}

/// A display tag attached to a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag text.
    pub value: String,

    /// Display colour.
    #[serde(default)]
    pub color: String,

    /// Inactive tags are not displayed.
    #[serde(default)]
    pub active: bool,
}

/// One purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    /// Variant name, unique within the product.
    pub name: String,

    /// Price delta on top of the product's base price.
    #[serde(default)]
    pub additional_price: Decimal,

    /// Units in stock. The catalog service is the only source of stock
    /// truth; the cart never stores this.
    #[serde(default)]
    pub stock: i64,

    /// Inactive variants are not offered.
    #[serde(default)]
    pub active: bool,

    /// Colour label, if any.
    #[serde(default)]
    pub color: Option<String>,

    /// Size label, if any.
    #[serde(default)]
    pub size: Option<String>,

    /// Material label, if any.
    #[serde(default)]
    pub material: Option<String>,

    /// Free-text specification.
    #[serde(default)]
    pub specifications: Option<String>,
}

impl Variant {
    /// Whether any units are in stock.
    #[must_use]
    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Whether stock covers the requested quantity.
    #[must_use]
    pub fn has_stock_for(&self, quantity: u32) -> bool {
        self.stock >= i64::from(quantity)
    }

    /// The descriptive attributes carried onto a cart line.
    #[must_use]
    pub fn specs(&self) -> VariantSpecs {
        VariantSpecs {
            size: self.size.clone().unwrap_or_default(),
            color: self.color.clone().unwrap_or_default(),
            material: self.material.clone().unwrap_or_default(),
            specifications: self.specifications.clone().unwrap_or_default(),
        }
    }
}

/// A catalog product with its variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Stock-keeping unit code.
    #[serde(default)]
    pub sku: String,

    /// Base price before any variant adjustment.
    pub price: Decimal,

    /// Optional long description.
    #[serde(default)]
    pub description: Option<String>,

    /// Image identifier, if the product has one.
    #[serde(default)]
    pub image_id: Option<String>,

    /// Names of the categories this product belongs to.
    #[serde(default)]
    pub category_names: Vec<String>,

    /// Ids of the categories this product belongs to.
    #[serde(default)]
    pub category_ids: Vec<String>,

    /// Display tags.
    #[serde(default)]
    pub tags: Vec<Tag>,

    /// Purchasable variants; may be empty.
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Product {
    /// Looks up a variant by name.
    #[must_use]
    pub fn variant(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// The first variant with stock, the listing-page quick-add choice.
    #[must_use]
    pub fn first_in_stock_variant(&self) -> Option<&Variant> {
        self.variants.iter().find(|v| v.is_in_stock())
    }

    /// Active variants ordered by effective price, the detail-page
    /// dropdown ordering.
    #[must_use]
    pub fn active_variants_by_price(&self) -> Vec<&Variant> {
        let mut variants: Vec<&Variant> = self.variants.iter().filter(|v| v.active).collect();
        variants.sort_by_key(|v| self.price_with(v));
        variants
    }

    /// Effective unit price of the given variant: base plus delta.
    #[must_use]
    pub fn price_with(&self, variant: &Variant) -> Decimal {
        self.price + variant.additional_price
    }

    /// Image id, or the icon fallback when the product has none.
    #[must_use]
    pub fn thumbnail(&self) -> String {
        self.image_id
            .clone()
            .unwrap_or_else(|| FALLBACK_THUMBNAIL.to_owned())
    }

    /// Builds the cart addition for this product.
    ///
    /// With a variant, the line carries the variant name, its specs and the
    /// variant-adjusted unit price. Without one (a variant-less product)
    /// the variant name is empty and the unit price is the base price.
    #[must_use]
    pub fn to_line(&self, variant: Option<&Variant>, quantity: u32) -> NewLineItem {
        let unit_price = variant.map_or(self.price, |v| self.price_with(v));

        NewLineItem {
            product_id: self.id.clone(),
            variant_name: variant.map(|v| v.name.clone()).unwrap_or_default(),
            name: self.name.clone(),
            unit_price,
            base_price: self.price,
            quantity,
            specs: variant.map(Variant::specs).unwrap_or_default(),
            thumbnail: self.thumbnail(),
        }
    }
}
