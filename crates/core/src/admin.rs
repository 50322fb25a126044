//! Admin panel: product table, product editing and sales statistics.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, Product};
use crate::types::ProductId;

/// Number of best-selling products reported.
const TOP_PRODUCT_COUNT: usize = 5;

/// Errors raised by admin product management.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    /// No product with this id in the working copy.
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// A required product field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Price is zero or negative.
    #[error("price must be positive")]
    InvalidPrice,
}

/// Column the product table is sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Id,
    #[default]
    Name,
    Price,
    Category,
    Rating,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// View settings of the admin product table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductTable {
    pub search: String,
    pub sort: SortColumn,
    pub direction: SortDirection,
}

impl ProductTable {
    /// Header click: the active column flips direction, another column
    /// becomes active in ascending order.
    pub fn click(&mut self, column: SortColumn) {
        if self.sort == column {
            self.direction = self.direction.toggled();
        } else {
            self.sort = column;
            self.direction = SortDirection::Asc;
        }
    }

    /// Products matching the search, sorted.
    ///
    /// The search is case-insensitive over name and category.
    #[must_use]
    pub fn rows<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let needle = self.search.trim().to_lowercase();
        let mut rows: Vec<&Product> = products
            .iter()
            .filter(|p| {
                needle.is_empty()
                    || p.name.to_lowercase().contains(&needle)
                    || p.category.to_lowercase().contains(&needle)
            })
            .collect();

        rows.sort_by(|a, b| {
            let ord = compare(a, b, self.sort);
            match self.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        rows
    }
}

fn compare(a: &Product, b: &Product, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Id => a.id.cmp(&b.id),
        SortColumn::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortColumn::Price => a.price.cmp(&b.price),
        SortColumn::Category => a.category.to_lowercase().cmp(&b.category.to_lowercase()),
        SortColumn::Rating => a.rating.cmp(&b.rating),
    }
}

/// Product form as submitted by the admin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub category: String,
    #[serde(default = "default_true")]
    pub in_stock: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub images: Vec<String>,
}

const fn default_true() -> bool {
    true
}

/// A draft that passed validation.
struct ValidDraft {
    name: String,
    description: String,
    price: Decimal,
    category: String,
    in_stock: bool,
    featured: bool,
    images: Vec<String>,
}

impl ProductDraft {
    fn validate(self) -> Result<ValidDraft, AdminError> {
        let name = required(&self.name, "name")?;
        let description = required(&self.description, "description")?;
        let category = required(&self.category, "category")?;
        if self.price <= Decimal::ZERO {
            return Err(AdminError::InvalidPrice);
        }

        let mut images = self.images.into_iter().map(|url| url.trim().to_owned());
        let first = images
            .next()
            .filter(|url| !url.is_empty())
            .ok_or(AdminError::MissingField("image"))?;
        let images = std::iter::once(first)
            .chain(images.filter(|url| !url.is_empty()))
            .collect();

        Ok(ValidDraft {
            name,
            description,
            price: self.price,
            category,
            in_stock: self.in_stock,
            featured: self.featured,
            images,
        })
    }
}

fn required(value: &str, field: &'static str) -> Result<String, AdminError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AdminError::MissingField(field))
    } else {
        Ok(trimmed.to_owned())
    }
}

/// An admin's editable copy of the product list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminCatalog {
    products: Vec<Product>,
}

impl AdminCatalog {
    /// Start from the shop catalog.
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            products: catalog.all().to_vec(),
        }
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Add a product under the next free id. New products start unrated.
    ///
    /// # Errors
    ///
    /// Returns `AdminError` if the draft is incomplete.
    pub fn create(&mut self, draft: ProductDraft) -> Result<&Product, AdminError> {
        let draft = draft.validate()?;
        let next_id = self
            .products
            .iter()
            .map(|p| p.id.as_i32())
            .max()
            .unwrap_or(0)
            .saturating_add(1);

        self.products.push(Product {
            id: ProductId::new(next_id),
            name: draft.name,
            description: draft.description,
            price: draft.price,
            images: draft.images,
            category: draft.category,
            in_stock: draft.in_stock,
            featured: draft.featured,
            rating: Decimal::ZERO,
        });
        self.products.last().ok_or(AdminError::NotFound(ProductId::new(next_id)))
    }

    /// Replace a product's editable fields, keeping its id and rating.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` for an unknown id, or a validation error;
    /// the product is untouched on error.
    pub fn update(&mut self, id: ProductId, draft: ProductDraft) -> Result<&Product, AdminError> {
        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(AdminError::NotFound(id))?;
        let draft = draft.validate()?;

        product.name = draft.name;
        product.description = draft.description;
        product.price = draft.price;
        product.images = draft.images;
        product.category = draft.category;
        product.in_stock = draft.in_stock;
        product.featured = draft.featured;
        Ok(product)
    }

    /// Remove a product.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` for an unknown id.
    pub fn delete(&mut self, id: ProductId) -> Result<Product, AdminError> {
        let index = self
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or(AdminError::NotFound(id))?;
        Ok(self.products.remove(index))
    }
}

/// One labelled sales figure, in euros.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesPoint {
    pub name: &'static str,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Dashboard sales figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesStats {
    pub monthly: Vec<SalesPoint>,
    pub top_products: Vec<SalesPoint>,
}

impl SalesStats {
    /// The demo year's figures.
    #[must_use]
    pub fn demo() -> Self {
        let point = |name, total| SalesPoint {
            name,
            total: Decimal::from(total),
        };
        let monthly = [
            ("Jan", 1500),
            ("Fév", 2300),
            ("Mar", 3200),
            ("Avr", 2800),
            ("Mai", 3800),
            ("Juin", 4300),
            ("Juil", 4100),
            ("Août", 4700),
            ("Sep", 5200),
            ("Oct", 4800),
            ("Nov", 6000),
            ("Déc", 7200),
        ];
        let top = [
            ("Smartphone XYZ", 450),
            ("Écouteurs Bluetooth", 380),
            ("Montre connectée", 320),
            ("Ordinateur portable", 280),
            ("Tablette tactile", 250),
        ];

        Self {
            monthly: monthly.into_iter().map(|(n, t)| point(n, t)).collect(),
            top_products: top
                .into_iter()
                .take(TOP_PRODUCT_COUNT)
                .map(|(n, t)| point(n, t))
                .collect(),
        }
    }

    /// Sum over all months.
    #[must_use]
    pub fn total_sales(&self) -> Decimal {
        self.monthly.iter().map(|p| p.total).sum()
    }

    /// Month with the highest sales; the earliest wins a tie.
    #[must_use]
    pub fn best_month(&self) -> Option<&SalesPoint> {
        self.monthly
            .iter()
            .reduce(|best, p| if p.total > best.total { p } else { best })
    }
}
