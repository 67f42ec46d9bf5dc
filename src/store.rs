//! Cart store
//!
//! [`CartStore`] is the sole owner of cart state. Every mutation validates
//! its input, persists the whole cart synchronously, and only then commits
//! the new state in memory, so a reload never observes a half-applied
//! operation and a failed write leaves the previous state intact.
//!
//! The store never touches the network: callers resolve product and variant
//! data (and check stock) before asking for an `add`.

use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    cart::{Cart, CartError},
    items::{LineItem, LineKey, NewLineItem},
    records::{CartItemRecord, RecordError},
    storage::{StorageBackend, StorageError},
};

/// The fixed key the cart occupies in the persisted store.
pub const CART_STORAGE_KEY: &str = "homestore_cart";

/// Errors surfaced by cart store operations.
///
/// `load` never returns these: absent or corrupt persisted state is treated
/// as an empty cart, since the cart is a client-side cache rather than a
/// system of record.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// The requested mutation is invalid; nothing was changed or written.
    #[error(transparent)]
    Validation(#[from] CartError),

    /// The cart could not be encoded for persistence.
    #[error("failed to encode cart")]
    Encode(#[source] serde_json::Error),

    /// The backing store rejected the write; in-memory state is unchanged.
    #[error("failed to persist cart")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
enum LoadError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("persisted cart is not an array of line records: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Cart(#[from] CartError),
}

type ChangeListener = Box<dyn Fn(&Cart) + Send>;

/// Mediates all reads and writes of the cart.
pub struct CartStore<S: StorageBackend> {
    storage: S,
    key: String,
    cart: Cart,
    listeners: Vec<ChangeListener>,
}

impl<S: StorageBackend> CartStore<S> {
    /// Creates a store over the given backend under the default cart key,
    /// restoring any persisted state.
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, CART_STORAGE_KEY)
    }

    /// Creates a store over the given backend and key, restoring any
    /// persisted state.
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        let mut store = Self {
            storage,
            key: key.into(),
            cart: Cart::new(),
            listeners: Vec::new(),
        };

        store.load();
        store
    }

    /// Registers a callback invoked synchronously after each successful
    /// mutation, e.g. for a navbar badge.
    pub fn on_change(&mut self, listener: impl Fn(&Cart) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Re-reads the cart from persisted state.
    ///
    /// Absent or malformed data yields an empty cart; this method never
    /// fails. It is also the re-read hook for callers reacting to an
    /// external (other-tab) change of the backing store.
    pub fn load(&mut self) -> &Cart {
        self.cart = match self.read_persisted() {
            Ok(cart) => cart,
            Err(error) => {
                warn!(key = %self.key, %error, "discarding malformed persisted cart");
                Cart::new()
            }
        };

        &self.cart
    }

    /// Adds a line to the cart, merging into an existing line with the same
    /// `(product, variant)` identity. A merged line keeps its original
    /// position and its price at first add.
    ///
    /// # Errors
    ///
    /// - [`CartStoreError::Validation`] for a zero quantity or negative
    ///   price; nothing is changed.
    /// - [`CartStoreError::Storage`] if persisting fails; the in-memory
    ///   cart stays at its previous state.
    pub fn add(&mut self, new: NewLineItem) -> Result<&Cart, CartStoreError> {
        let mut next = self.cart.clone();
        let line = next.merge(new)?;

        debug!(
            product_id = %line.product_id,
            variant_name = %line.variant_name,
            quantity = line.quantity,
            "cart line merged"
        );

        self.commit(next)
    }

    /// Removes the line matching the identity key. Absent keys are a no-op
    /// and do not touch the persisted state.
    ///
    /// # Errors
    ///
    /// Returns [`CartStoreError::Storage`] if persisting fails.
    pub fn remove(
        &mut self,
        product_id: &str,
        variant_name: &str,
    ) -> Result<&Cart, CartStoreError> {
        let key = LineKey::new(product_id, variant_name);
        let mut next = self.cart.clone();

        if next.remove(&key).is_none() {
            return Ok(&self.cart);
        }

        self.commit(next)
    }

    /// Sets an existing line's quantity directly; 0 removes the line.
    ///
    /// # Errors
    ///
    /// - [`CartStoreError::Validation`] if the line does not exist (use
    ///   [`CartStore::add`] to create it).
    /// - [`CartStoreError::Storage`] if persisting fails.
    pub fn set_quantity(
        &mut self,
        product_id: &str,
        variant_name: &str,
        quantity: u32,
    ) -> Result<&Cart, CartStoreError> {
        let key = LineKey::new(product_id, variant_name);
        let mut next = self.cart.clone();
        next.set_quantity(&key, quantity)?;

        self.commit(next)
    }

    /// Empties the cart and deletes the persisted entry.
    ///
    /// # Errors
    ///
    /// Returns [`CartStoreError::Storage`] if the store cannot be written.
    pub fn clear(&mut self) -> Result<(), CartStoreError> {
        self.storage.remove(&self.key)?;
        self.cart = Cart::new();
        self.notify();
        Ok(())
    }

    /// Read-only snapshot of the lines in insertion order.
    #[must_use]
    pub fn list(&self) -> &[LineItem] {
        self.cart.lines()
    }

    /// The current cart.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.cart.total_item_count()
    }

    /// Sum of all line subtotals.
    #[must_use]
    pub fn total_amount(&self) -> Decimal {
        self.cart.total_amount()
    }

    fn read_persisted(&self) -> Result<Cart, LoadError> {
        let Some(raw) = self.storage.get(&self.key)? else {
            return Ok(Cart::new());
        };

        let records: Vec<CartItemRecord> = serde_json::from_str(&raw)?;
        let lines = records
            .into_iter()
            .map(LineItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Cart::from_lines(lines)?)
    }

    fn commit(&mut self, next: Cart) -> Result<&Cart, CartStoreError> {
        let records: Vec<CartItemRecord> = next.iter().map(CartItemRecord::from).collect();
        let encoded = serde_json::to_string(&records).map_err(CartStoreError::Encode)?;

        self.storage.set(&self.key, &encoded)?;
        self.cart = next;
        self.notify();

        Ok(&self.cart)
    }

    fn notify(&self) {
        for listener in &self.listeners {
            listener(&self.cart);
        }
    }
}

impl<S: StorageBackend + fmt::Debug> fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("storage", &self.storage)
            .field("key", &self.key)
            .field("cart", &self.cart)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
