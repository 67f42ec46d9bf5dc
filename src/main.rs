//! HomeStore storefront CLI
//!
//! The UI collaborator over the cart core: it browses the catalog, runs the
//! caller-side checks the store deliberately does not (stock against the
//! requested quantity, variant selection), formats currency, and renders
//! cart contents. The cart itself never sees the network.

use std::{path::PathBuf, process};

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use rusty_money::{Money, iso};
use tabled::{Table, Tabled};

use homestore_cart::{
    catalog::{CatalogClient, CatalogError, HttpCatalogClient, ProductQuery},
    config::Config,
    products::{Product, Variant},
    storage::FileStorage,
    store::CartStore,
};

#[derive(Debug, Parser)]
#[command(name = "homestore", about = "HomeStore storefront client", long_about = None)]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, env = "HOMESTORE_CONFIG", default_value = "homestore.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Browse the catalog service
    Catalog(CatalogCommand),
    /// Inspect and mutate the local cart
    Cart(CartCommand),
}

#[derive(Debug, Args)]
struct CatalogCommand {
    #[command(subcommand)]
    command: CatalogSubcommand,
}

#[derive(Debug, Subcommand)]
enum CatalogSubcommand {
    /// List categories
    Categories,
    /// List products
    Products(ProductsArgs),
    /// Show one product with its variants
    Show {
        /// Product id
        product_id: String,
    },
}

#[derive(Debug, Args)]
struct ProductsArgs {
    /// 0-based page index
    #[arg(long, default_value_t = 0)]
    page: u32,

    /// Page size; defaults to the configured size
    #[arg(long)]
    size: Option<u32>,

    /// Free-text search term
    #[arg(long)]
    search: Option<String>,

    /// Category id filter
    #[arg(long)]
    category: Option<String>,
}

#[derive(Debug, Args)]
struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Fetch a product and add it to the cart
    Add(AddArgs),
    /// Remove a line from the cart
    Remove {
        /// Product id
        product_id: String,

        /// Variant name; omit for variant-less products
        #[arg(long, default_value = "")]
        variant: String,
    },
    /// Set a line's quantity directly (0 removes the line)
    SetQty {
        /// Product id
        product_id: String,

        /// New quantity
        quantity: u32,

        /// Variant name; omit for variant-less products
        #[arg(long, default_value = "")]
        variant: String,
    },
    /// List the cart contents
    List,
    /// Empty the cart
    Clear,
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Product id
    product_id: String,

    /// Variant name; defaults to the first in-stock variant
    #[arg(long)]
    variant: Option<String>,

    /// Quantity to add
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    quantity: u32,
}

#[tokio::main]
#[expect(clippy::exit, reason = "CLI entry point reports failure via the exit status")]
async fn main() {
    let _env = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let config = Config::load_or_default(&cli.config)
        .map_err(|error| format!("failed to load config: {error}"))?;

    match cli.command {
        Commands::Catalog(CatalogCommand { command }) => match command {
            CatalogSubcommand::Categories => list_categories(&config).await,
            CatalogSubcommand::Products(args) => list_products(&config, args).await,
            CatalogSubcommand::Show { product_id } => show_product(&config, &product_id).await,
        },
        Commands::Cart(CartCommand { command }) => match command {
            CartSubcommand::Add(args) => add_to_cart(&config, args).await,
            CartSubcommand::Remove {
                product_id,
                variant,
            } => remove_from_cart(&config, &product_id, &variant),
            CartSubcommand::SetQty {
                product_id,
                quantity,
                variant,
            } => set_quantity(&config, &product_id, &variant, quantity),
            CartSubcommand::List => list_cart(&config),
            CartSubcommand::Clear => clear_cart(&config),
        },
    }
}

fn catalog_client(config: &Config) -> Result<HttpCatalogClient, String> {
    HttpCatalogClient::new(&config.api_base_url).map_err(|error| error.to_string())
}

fn cart_store(config: &Config) -> CartStore<FileStorage> {
    CartStore::new(FileStorage::new(&config.storage_path))
}

/// Catalog failures are transient from the user's point of view; say so.
fn catalog_failure(error: &CatalogError) -> String {
    match error {
        CatalogError::NotFound => "product not found".to_owned(),
        other => format!("{other}; check the connection and try again"),
    }
}

fn format_vnd(amount: Decimal) -> String {
    Money::from_decimal(amount, iso::VND).to_string()
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Products")]
    products: String,
}

async fn list_categories(config: &Config) -> Result<(), String> {
    let client = catalog_client(config)?;
    let categories = client
        .get_categories()
        .await
        .map_err(|error| catalog_failure(&error))?;

    let rows: Vec<CategoryRow> = categories
        .into_iter()
        .map(|category| CategoryRow {
            id: category.id,
            name: category.name,
            products: category
                .product_count
                .map(|count| count.to_string())
                .unwrap_or_default(),
        })
        .collect();

    println!("{}", Table::new(rows));
    Ok(())
}

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Category")]
    category: String,
}

async fn list_products(config: &Config, args: ProductsArgs) -> Result<(), String> {
    let client = catalog_client(config)?;
    let query = ProductQuery {
        page: args.page,
        size: args.size.unwrap_or(config.page_size),
        search: args.search,
        category_id: args.category,
    };

    let products = client
        .get_products(&query)
        .await
        .map_err(|error| catalog_failure(&error))?;

    if products.is_empty() {
        println!("No products found; try different filters or search terms.");
        return Ok(());
    }

    let count = products.len();
    let rows: Vec<ProductRow> = products
        .into_iter()
        .map(|product| ProductRow {
            id: product.id.clone(),
            name: product.name.clone(),
            price: format_vnd(product.price),
            category: product
                .category_names
                .first()
                .cloned()
                .unwrap_or_default(),
        })
        .collect();

    println!("{}", Table::new(rows));
    println!("Showing {count} products");
    Ok(())
}

#[derive(Tabled)]
struct VariantRow {
    #[tabled(rename = "Variant")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Stock")]
    stock: String,
}

async fn show_product(config: &Config, product_id: &str) -> Result<(), String> {
    let client = catalog_client(config)?;
    let product = client
        .get_product(product_id)
        .await
        .map_err(|error| catalog_failure(&error))?;

    println!("{} ({})", product.name, product.sku);
    if let Some(description) = &product.description {
        println!("{description}");
    }
    println!("Base price: {}", format_vnd(product.price));

    let variants = product.active_variants_by_price();
    if variants.is_empty() {
        println!("No variants are currently available for this product.");
        return Ok(());
    }

    let rows: Vec<VariantRow> = variants
        .into_iter()
        .map(|variant| VariantRow {
            name: variant.name.clone(),
            price: format_vnd(product.price_with(variant)),
            stock: if variant.is_in_stock() {
                format!("{} available", variant.stock)
            } else {
                "out of stock".to_owned()
            },
        })
        .collect();

    println!("{}", Table::new(rows));
    Ok(())
}

async fn add_to_cart(config: &Config, args: AddArgs) -> Result<(), String> {
    let client = catalog_client(config)?;
    let product = client
        .get_product(&args.product_id)
        .await
        .map_err(|error| catalog_failure(&error))?;

    let mut store = cart_store(config);
    let variant = select_variant(&product, args.variant.as_deref())?;

    // Stock pre-check is the caller's job: the cart never consults stock,
    // so account for what is already queued under the same line.
    if let Some(variant) = variant {
        let queued = store
            .list()
            .iter()
            .find(|line| line.product_id == product.id && line.variant_name == variant.name)
            .map_or(0, |line| line.quantity);
        let wanted = queued.saturating_add(args.quantity);

        if !variant.has_stock_for(wanted) {
            return Err(format!(
                "not enough stock for {} {:?}: {} available, {wanted} requested",
                product.name, variant.name, variant.stock
            ));
        }
    }

    let line = product.to_line(variant, args.quantity);
    let cart = store.add(line).map_err(|error| error.to_string())?;

    println!(
        "Added {} x \"{}\" to the cart ({} items, total {})",
        args.quantity,
        product.name,
        cart.total_item_count(),
        format_vnd(cart.total_amount())
    );
    Ok(())
}

/// Resolves which variant a cart add applies to, mirroring the storefront
/// pages: an explicit choice must exist, and a quick add without a choice
/// takes the first in-stock variant.
fn select_variant<'a>(
    product: &'a Product,
    requested: Option<&str>,
) -> Result<Option<&'a Variant>, String> {
    match requested {
        Some(name) => product
            .variant(name)
            .map(Some)
            .ok_or_else(|| format!("\"{}\" has no variant named {name:?}", product.name)),
        None if product.variants.is_empty() => Ok(None),
        None => product
            .first_in_stock_variant()
            .map(Some)
            .ok_or_else(|| format!("no variant of \"{}\" is currently in stock", product.name)),
    }
}

fn remove_from_cart(config: &Config, product_id: &str, variant: &str) -> Result<(), String> {
    let mut store = cart_store(config);
    let cart = store
        .remove(product_id, variant)
        .map_err(|error| error.to_string())?;

    println!(
        "Cart now has {} items, total {}",
        cart.total_item_count(),
        format_vnd(cart.total_amount())
    );
    Ok(())
}

fn set_quantity(
    config: &Config,
    product_id: &str,
    variant: &str,
    quantity: u32,
) -> Result<(), String> {
    let mut store = cart_store(config);
    let cart = store
        .set_quantity(product_id, variant, quantity)
        .map_err(|error| error.to_string())?;

    println!(
        "Cart now has {} items, total {}",
        cart.total_item_count(),
        format_vnd(cart.total_amount())
    );
    Ok(())
}

#[derive(Tabled)]
struct CartRow {
    #[tabled(rename = "Product")]
    name: String,
    #[tabled(rename = "Variant")]
    variant: String,
    #[tabled(rename = "Qty")]
    quantity: u32,
    #[tabled(rename = "Unit price")]
    unit_price: String,
    #[tabled(rename = "Subtotal")]
    subtotal: String,
}

fn list_cart(config: &Config) -> Result<(), String> {
    let store = cart_store(config);

    if store.list().is_empty() {
        println!("The cart is empty.");
        return Ok(());
    }

    let rows: Vec<CartRow> = store
        .list()
        .iter()
        .map(|line| CartRow {
            name: line.name.clone(),
            variant: line.variant_name.clone(),
            quantity: line.quantity,
            unit_price: format_vnd(line.unit_price),
            subtotal: format_vnd(line.subtotal()),
        })
        .collect();

    println!("{}", Table::new(rows));
    println!(
        "{} items, total {}",
        store.total_item_count(),
        format_vnd(store.total_amount())
    );
    Ok(())
}

fn clear_cart(config: &Config) -> Result<(), String> {
    let mut store = cart_store(config);
    store.clear().map_err(|error| error.to_string())?;

    println!("Cart cleared.");
    Ok(())
}
