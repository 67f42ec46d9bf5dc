//! Catalog client
//!
//! Read-only HTTP client for the catalog service. Wraps `reqwest` with
//! typed responses, the storefront's query-string conventions (0-based
//! `page`, `size`, optional `search` and `categoryId`), and a distinct
//! not-found error for missing products. The cart core never calls this;
//! callers resolve product data first and hand the result to the store.

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::products::{Category, Product};

/// Base URL the storefront pages were built against.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// Page size the product listing uses when none is given.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Errors raised by catalog requests.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The requested resource does not exist (HTTP 404).
    #[error("resource not found")]
    NotFound,

    /// Network failure or a non-success response other than 404.
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body does not match the expected shape.
    #[error("catalog response for {context} is malformed: {source}")]
    Deserialize {
        /// Which request produced the body.
        context: String,
        /// The underlying decode failure.
        #[source]
        source: serde_json::Error,
    },

    /// The configured base URL cannot be parsed.
    #[error("invalid catalog base URL {0:?}")]
    InvalidBaseUrl(String),
}

/// Filters for the product listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// 0-based page index.
    pub page: u32,

    /// Page size.
    pub size: u32,

    /// Free-text search term; empty or absent terms are omitted from the
    /// query string.
    pub search: Option<String>,

    /// Category filter; empty or absent ids are omitted.
    pub category_id: Option<String>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            search: None,
            category_id: None,
        }
    }
}

impl ProductQuery {
    fn apply_to(&self, url: &mut Url) {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("page", &self.page.to_string());
        pairs.append_pair("size", &self.size.to_string());

        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.append_pair("search", search);
        }

        if let Some(category_id) = self.category_id.as_deref().filter(|c| !c.is_empty()) {
            pairs.append_pair("categoryId", category_id);
        }
    }
}

/// The read-only catalog service contract.
#[automock]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Lists all categories.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] on transport failure or an unexpected
    /// response shape.
    async fn get_categories(&self) -> Result<Vec<Category>, CatalogError>;

    /// Lists products matching the query.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] on transport failure or an unexpected
    /// response shape.
    async fn get_products(&self, query: &ProductQuery) -> Result<Vec<Product>, CatalogError>;

    /// Fetches a single product with its variants.
    ///
    /// # Errors
    ///
    /// Fails with [`CatalogError::NotFound`] when the id does not exist, and
    /// with the other [`CatalogError`] variants as for the listing calls.
    async fn get_product(&self, id: &str) -> Result<Product, CatalogError>;
}

/// `reqwest`-backed catalog client.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: Client,
    base_url: Url,
}

impl HttpCatalogClient {
    /// Creates a client for the given API base URL, e.g.
    /// `http://localhost:8080/api`.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::InvalidBaseUrl`] if the URL does not parse or
    ///   cannot carry path segments.
    /// - [`CatalogError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("homestore/0.1")
            .build()?;

        // Trailing slashes would produce empty path segments when joining.
        let trimmed = base_url.trim_end_matches('/');
        let Ok(base_url) = Url::parse(trimmed) else {
            return Err(CatalogError::InvalidBaseUrl(base_url.to_owned()));
        };

        if base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    fn products_url(&self, query: &ProductQuery) -> Url {
        let mut url = self.endpoint(&["products"]);
        query.apply_to(&mut url);
        url
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url, context: &str) -> Result<T, CatalogError> {
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound);
        }

        let body = response.error_for_status()?.text().await?;

        serde_json::from_str(&body).map_err(|source| CatalogError::Deserialize {
            context: context.to_owned(),
            source,
        })
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn get_categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.fetch(self.endpoint(&["categories"]), "categories").await
    }

    async fn get_products(&self, query: &ProductQuery) -> Result<Vec<Product>, CatalogError> {
        self.fetch(self.products_url(query), "products").await
    }

    async fn get_product(&self, id: &str) -> Result<Product, CatalogError> {
        self.fetch(
            self.endpoint(&["products", id]),
            &format!("products/{id}"),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn client() -> Result<HttpCatalogClient, CatalogError> {
        HttpCatalogClient::new(DEFAULT_API_BASE_URL)
    }

    #[test]
    fn products_url_carries_page_and_size() -> TestResult {
        let url = client()?.products_url(&ProductQuery::default());

        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/products?page=0&size=12"
        );

        Ok(())
    }

    #[test]
    fn products_url_includes_non_empty_filters() -> TestResult {
        let query = ProductQuery {
            page: 2,
            size: 24,
            search: Some("đèn bàn".into()),
            category_id: Some("C7".into()),
        };

        let url = client()?.products_url(&query);

        assert_eq!(url.query_pairs().count(), 4);
        assert!(url.as_str().starts_with("http://localhost:8080/api/products?page=2&size=24&search="));
        assert!(url.as_str().ends_with("&categoryId=C7"));

        Ok(())
    }

    #[test]
    fn products_url_omits_empty_filters() -> TestResult {
        let query = ProductQuery {
            search: Some(String::new()),
            category_id: Some(String::new()),
            ..ProductQuery::default()
        };

        let url = client()?.products_url(&query);

        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/products?page=0&size=12"
        );

        Ok(())
    }

    #[test]
    fn trailing_base_slash_is_normalised() -> TestResult {
        let client = HttpCatalogClient::new("http://localhost:8080/api/")?;

        let url = client.endpoint(&["categories"]);

        assert_eq!(url.as_str(), "http://localhost:8080/api/categories");

        Ok(())
    }

    #[test]
    fn product_id_is_percent_encoded() -> TestResult {
        let url = client()?.endpoint(&["products", "a b/c"]);

        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/products/a%20b%2Fc"
        );

        Ok(())
    }

    #[test]
    fn rejects_unparsable_base_url() {
        let result = HttpCatalogClient::new("not a url");

        assert!(matches!(result, Err(CatalogError::InvalidBaseUrl(_))));
    }
}
