//! End-to-end behavior of the cart store over real storage backends:
//! merging, identity, totals, and the reload-after-every-mutation
//! guarantee that makes a page refresh lossless.

use rust_decimal::Decimal;
use testresult::TestResult;

use homestore_cart::{
    items::{LineKey, NewLineItem, VariantSpecs},
    storage::{FileStorage, MemoryStorage, StorageBackend},
    store::{CART_STORAGE_KEY, CartStore, CartStoreError},
};

fn addition(product_id: &str, variant_name: &str, name: &str, price: i64, quantity: u32) -> NewLineItem {
    NewLineItem {
        product_id: product_id.into(),
        variant_name: variant_name.into(),
        name: name.into(),
        unit_price: Decimal::from(price),
        base_price: Decimal::from(price),
        quantity,
        specs: VariantSpecs::default(),
        thumbnail: "fas fa-shopping-bag".into(),
    }
}

#[test]
fn merges_same_identity_and_keeps_first_position() -> TestResult {
    let mut store = CartStore::new(MemoryStorage::new());

    store.add(addition("P1", "", "Shirt", 10, 2))?;
    store.add(addition("P1", "", "Shirt", 10, 3))?;
    store.add(addition("P1", "L", "Shirt", 12, 1))?;

    let lines = store.list();
    assert_eq!(lines.len(), 2);

    assert_eq!(lines[0].key(), LineKey::new("P1", ""));
    assert_eq!(lines[0].quantity, 5);
    assert_eq!(lines[0].subtotal(), Decimal::from(50));

    assert_eq!(lines[1].key(), LineKey::new("P1", "L"));
    assert_eq!(lines[1].quantity, 1);
    assert_eq!(lines[1].subtotal(), Decimal::from(12));

    assert_eq!(store.total_item_count(), 6);
    assert_eq!(store.total_amount(), Decimal::from(62));

    Ok(())
}

#[test]
fn different_variants_never_merge() -> TestResult {
    let mut store = CartStore::new(MemoryStorage::new());

    store.add(addition("P1", "A", "Shirt", 10, 1))?;
    store.add(addition("P1", "B", "Shirt", 10, 1))?;

    assert_eq!(store.list().len(), 2);

    Ok(())
}

#[test]
fn subtotal_tracks_quantity_changes() -> TestResult {
    let mut store = CartStore::new(MemoryStorage::new());
    store.add(addition("P1", "", "Shirt", 10, 1))?;

    store.set_quantity("P1", "", 7)?;

    let line = &store.list()[0];
    assert_eq!(line.subtotal(), line.unit_price * Decimal::from(line.quantity));
    assert_eq!(line.subtotal(), Decimal::from(70));

    Ok(())
}

#[test]
fn remove_drops_exactly_that_lines_quantity() -> TestResult {
    let mut store = CartStore::new(MemoryStorage::new());
    store.add(addition("P1", "", "Shirt", 10, 4))?;
    store.add(addition("P2", "", "Mug", 5, 2))?;

    store.remove("P1", "")?;

    assert_eq!(store.total_item_count(), 2);
    assert!(store.list().iter().all(|line| line.product_id != "P1"));

    Ok(())
}

#[test]
fn set_quantity_zero_collapses_the_line() -> TestResult {
    let mut store = CartStore::new(MemoryStorage::new());
    store.add(addition("P1", "", "Shirt", 10, 3))?;

    store.set_quantity("P1", "", 0)?;

    assert!(store.list().is_empty());

    Ok(())
}

#[test]
fn set_quantity_requires_an_existing_line() {
    let mut store = CartStore::new(MemoryStorage::new());

    let result = store.set_quantity("P1", "", 2);

    assert!(matches!(result, Err(CartStoreError::Validation(_))));
}

#[test]
fn reload_after_each_mutation_matches_memory() -> TestResult {
    let dir = tempfile::tempdir()?;
    let storage = FileStorage::new(dir.path().join("store.json"));
    let mut store = CartStore::new(storage.clone());

    store.add(addition("P1", "", "Shirt", 10, 2))?;
    store.add(addition("P1", "L", "Shirt", 12, 1))?;
    store.set_quantity("P1", "", 5)?;

    let reloaded = CartStore::new(storage);

    let observed: Vec<_> = reloaded
        .list()
        .iter()
        .map(|line| (line.key(), line.quantity, line.unit_price))
        .collect();
    let expected: Vec<_> = store
        .list()
        .iter()
        .map(|line| (line.key(), line.quantity, line.unit_price))
        .collect();

    assert_eq!(observed, expected);
    assert_eq!(reloaded.total_amount(), store.total_amount());

    Ok(())
}

#[test]
fn add_then_remove_then_reload_is_empty() -> TestResult {
    let dir = tempfile::tempdir()?;
    let storage = FileStorage::new(dir.path().join("store.json"));
    let mut store = CartStore::new(storage.clone());

    store.add(addition("P2", "", "Mug", 5, 1))?;
    store.remove("P2", "")?;

    let reloaded = CartStore::new(storage);
    assert!(reloaded.list().is_empty());
    assert_eq!(reloaded.total_amount(), Decimal::ZERO);

    Ok(())
}

#[test]
fn corrupt_persisted_data_loads_as_empty_cart() -> TestResult {
    for garbage in [
        "not json at all",
        "42",
        r#"{"this":"is-an-object-not-an-array"}"#,
        "[1, 2, 3]",
        r#"[{"id":"P1","name":"Shirt","price":10,"quantity":0}]"#,
        r#"[{"id":"P1","name":"Shirt","price":-3,"quantity":1}]"#,
    ] {
        let mut storage = MemoryStorage::new();
        storage.set(CART_STORAGE_KEY, garbage)?;

        let store = CartStore::new(storage);

        assert!(
            store.list().is_empty(),
            "expected empty cart for persisted blob {garbage:?}"
        );
    }

    Ok(())
}

#[test]
fn duplicate_identities_in_persisted_data_are_corruption() -> TestResult {
    let mut storage = MemoryStorage::new();
    storage.set(
        CART_STORAGE_KEY,
        r#"[
            {"id":"P1","name":"Shirt","price":10,"quantity":1},
            {"id":"P1","name":"Shirt","price":10,"quantity":2}
        ]"#,
    )?;

    let store = CartStore::new(storage);

    assert!(store.list().is_empty());

    Ok(())
}

#[test]
fn persisted_price_survives_reload_exactly() -> TestResult {
    let dir = tempfile::tempdir()?;
    let storage = FileStorage::new(dir.path().join("store.json"));
    let mut store = CartStore::new(storage.clone());

    // Merging with a different price must not refresh the stored price.
    store.add(addition("P1", "", "Shirt", 10, 1))?;
    store.add(addition("P1", "", "Shirt", 25, 1))?;

    let reloaded = CartStore::new(storage);
    assert_eq!(reloaded.list()[0].unit_price, Decimal::from(10));
    assert_eq!(reloaded.total_amount(), Decimal::from(20));

    Ok(())
}

#[test]
fn stores_with_different_keys_do_not_interfere() -> TestResult {
    let dir = tempfile::tempdir()?;
    let storage = FileStorage::new(dir.path().join("store.json"));

    let mut first = CartStore::with_key(storage.clone(), "homestore_cart");
    first.add(addition("P1", "", "Shirt", 10, 1))?;

    let second = CartStore::with_key(storage, "wishlist_cart");
    assert!(second.list().is_empty());

    Ok(())
}
