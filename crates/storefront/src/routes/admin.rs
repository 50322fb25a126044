//! Admin panel route handlers (admin account only).
//!
//! Product edits apply to the admin's own working copy of the catalog, kept
//! in their session; the public catalog is never modified.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use riziky_core::admin::{
    AdminCatalog, ProductDraft, ProductTable, SalesPoint, SalesStats, SortColumn, SortDirection,
};
use riziky_core::catalog::Product;
use riziky_core::types::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::session_keys;
use crate::state::AppState;

/// Product table query.
///
/// `sort` without `direction` behaves like a header click: the active column
/// flips direction, another column starts ascending.
#[derive(Debug, Default, Deserialize)]
pub struct TableQuery {
    pub search: Option<String>,
    pub sort: Option<SortColumn>,
    pub direction: Option<SortDirection>,
}

impl TableQuery {
    fn apply(self, table: &mut ProductTable) {
        if let Some(search) = self.search {
            table.search = search;
        }
        match (self.sort, self.direction) {
            (Some(column), Some(direction)) => {
                table.sort = column;
                table.direction = direction;
            }
            (Some(column), None) => table.click(column),
            (None, Some(direction)) => table.direction = direction,
            (None, None) => {}
        }
    }
}

/// Product table response.
#[derive(Debug, Serialize)]
pub struct ProductTableView {
    pub table: ProductTable,
    pub products: Vec<Product>,
    pub total: usize,
}

/// Sales dashboard response.
#[derive(Debug, Serialize)]
pub struct StatsView {
    pub monthly: Vec<SalesPoint>,
    pub top_products: Vec<SalesPoint>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_sales: Decimal,
    pub best_month: Option<SalesPoint>,
}

impl From<&SalesStats> for StatsView {
    fn from(stats: &SalesStats) -> Self {
        Self {
            monthly: stats.monthly.clone(),
            top_products: stats.top_products.clone(),
            total_sales: stats.total_sales(),
            best_month: stats.best_month().cloned(),
        }
    }
}

async fn load_catalog(session: &Session, state: &AppState) -> Result<AdminCatalog> {
    Ok(session
        .get(session_keys::ADMIN_CATALOG)
        .await?
        .unwrap_or_else(|| AdminCatalog::from_catalog(state.catalog())))
}

async fn store_catalog(session: &Session, catalog: &AdminCatalog) -> Result<()> {
    session.insert(session_keys::ADMIN_CATALOG, catalog).await?;
    Ok(())
}

/// Searchable, sortable product table.
#[instrument(skip(state, session, _admin))]
pub async fn products(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    session: Session,
    Query(query): Query<TableQuery>,
) -> Result<Json<ProductTableView>> {
    let mut table: ProductTable = session
        .get(session_keys::ADMIN_TABLE)
        .await?
        .unwrap_or_default();
    query.apply(&mut table);
    session.insert(session_keys::ADMIN_TABLE, &table).await?;

    let catalog = load_catalog(&session, &state).await?;
    let products: Vec<Product> = table
        .rows(catalog.products())
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(ProductTableView {
        table,
        total: products.len(),
        products,
    }))
}

/// Add a product.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    session: Session,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<Product>)> {
    let mut catalog = load_catalog(&session, &state).await?;
    let product = catalog.create(draft)?.clone();
    store_catalog(&session, &catalog).await?;
    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Edit a product.
#[instrument(skip(state, session, _admin, draft))]
pub async fn update(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    session: Session,
    Path(id): Path<ProductId>,
    Json(draft): Json<ProductDraft>,
) -> Result<Json<Product>> {
    let mut catalog = load_catalog(&session, &state).await?;
    let product = catalog.update(id, draft)?.clone();
    store_catalog(&session, &catalog).await?;
    tracing::info!("Product updated");
    Ok(Json(product))
}

/// Delete a product.
#[instrument(skip(state, session, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let mut catalog = load_catalog(&session, &state).await?;
    let removed = catalog.delete(id)?;
    store_catalog(&session, &catalog).await?;
    tracing::info!("Product deleted");
    Ok(Json(removed))
}

/// Sales dashboard.
pub async fn stats(State(state): State<AppState>, _admin: RequireAdmin) -> Json<StatsView> {
    Json(StatsView::from(state.sales()))
}
