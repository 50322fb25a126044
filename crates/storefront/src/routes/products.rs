//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use riziky_core::catalog::{Product, ProductFilter};
use riziky_core::types::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Number of related products shown on a product page.
const RELATED_LIMIT: usize = 4;

/// Listing query parameters.
///
/// `category` takes a comma-separated list.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl ListingQuery {
    fn into_filter(self) -> Result<ProductFilter> {
        let defaults = ProductFilter::default();
        let filter = ProductFilter {
            query: self.q.filter(|q| !q.trim().is_empty()),
            categories: self
                .category
                .map(|list| {
                    list.split(',')
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                        .map(str::to_owned)
                        .collect()
                })
                .unwrap_or_default(),
            min_price: self.min_price.unwrap_or(defaults.min_price),
            max_price: self.max_price.unwrap_or(defaults.max_price),
        };
        if filter.min_price > filter.max_price {
            return Err(AppError::BadRequest(
                "min_price must not exceed max_price".to_string(),
            ));
        }
        Ok(filter)
    }
}

/// Product listing response.
#[derive(Debug, Serialize)]
pub struct ProductList {
    pub products: Vec<Product>,
    pub total: usize,
}

/// Product detail response.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    pub product: Product,
    /// Price formatted for display, e.g. `"899.99 €"`.
    pub display_price: String,
    pub related: Vec<Product>,
}

fn owned(products: Vec<&Product>) -> Vec<Product> {
    products.into_iter().cloned().collect()
}

/// Filtered product listing.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ProductList>> {
    let filter = query.into_filter()?;
    let products = owned(state.catalog().filter(&filter));
    tracing::debug!(results = products.len(), "Product listing filtered");

    Ok(Json(ProductList {
        total: products.len(),
        products,
    }))
}

/// Featured products.
pub async fn featured(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(owned(state.catalog().featured()))
}

/// Best-selling products.
pub async fn best_sellers(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(owned(state.catalog().best_selling()))
}

/// Distinct categories, in catalog order.
pub async fn categories(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(
        state
            .catalog()
            .categories()
            .into_iter()
            .map(str::to_owned)
            .collect(),
    )
}

/// Product detail with related products.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>> {
    let catalog = state.catalog();
    let product = catalog
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(ProductDetail {
        display_price: product.display_price().display(),
        related: owned(catalog.related(product, RELATED_LIMIT)),
        product: product.clone(),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_query_defaults() {
        let filter = ListingQuery::default().into_filter().unwrap();
        assert_eq!(filter, ProductFilter::default());
    }

    #[test]
    fn test_listing_query_splits_categories() {
        let query = ListingQuery {
            category: Some("Audio, Informatique,,".to_string()),
            q: Some("   ".to_string()),
            ..ListingQuery::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.categories, vec!["Audio", "Informatique"]);
        assert_eq!(filter.query, None);
    }

    #[test]
    fn test_listing_query_rejects_inverted_range() {
        let query = ListingQuery {
            min_price: Some(Decimal::from(100)),
            max_price: Some(Decimal::from(10)),
            ..ListingQuery::default()
        };
        assert!(matches!(query.into_filter(), Err(AppError::BadRequest(_))));
    }
}
