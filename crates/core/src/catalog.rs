//! Product catalog.
//!
//! The shop runs on a fixed set of demo products; [`Catalog::demo`] seeds
//! them. Lookup, search and filtering are linear scans over a handful of
//! entries.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::types::{Price, ProductId};

/// Number of products shown as best sellers.
const BEST_SELLER_COUNT: usize = 4;

/// Upper bound of the default price range filter.
pub const DEFAULT_MAX_PRICE: Decimal = Decimal::from_parts(2000, 0, 0, false, 0);

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub images: Vec<String>,
    pub category: String,
    pub in_stock: bool,
    pub featured: bool,
    /// Average review score out of 5.
    #[serde(with = "rust_decimal::serde::float")]
    pub rating: Decimal,
}

impl Product {
    /// First image, used as the thumbnail.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Price as a displayable [`Price`].
    #[must_use]
    pub const fn display_price(&self) -> Price {
        Price::eur(self.price)
    }

    /// Build the cart line for `quantity` units of this product.
    #[must_use]
    pub fn to_cart_item(&self, quantity: u32) -> CartItem {
        CartItem {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
            image: self.primary_image().unwrap_or_default().to_owned(),
            quantity,
        }
    }

    fn matches_query(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.category.to_lowercase().contains(needle)
    }
}

/// Listing filter: free-text search, category set and inclusive price range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductFilter {
    pub query: Option<String>,
    pub categories: Vec<String>,
    pub min_price: Decimal,
    pub max_price: Decimal,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            query: None,
            categories: Vec::new(),
            min_price: Decimal::ZERO,
            max_price: DEFAULT_MAX_PRICE,
        }
    }
}

impl ProductFilter {
    /// Whether `product` passes every criterion.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let query_ok = self
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .is_none_or(|q| product.matches_query(&q.to_lowercase()));
        let category_ok =
            self.categories.is_empty() || self.categories.iter().any(|c| *c == product.category);
        let price_ok = product.price >= self.min_price && product.price <= self.max_price;

        query_ok && category_ok && price_ok
    }
}

/// The set of products on sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog from an explicit product list.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The demo shop's catalog.
    #[must_use]
    pub fn demo() -> Self {
        Self::new(demo_products())
    }

    /// Every product, in catalog order.
    #[must_use]
    pub fn all(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Products flagged as featured.
    #[must_use]
    pub fn featured(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| p.featured).collect()
    }

    /// Products in exactly `category`.
    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.category == category)
            .collect()
    }

    /// Case-insensitive substring search over name, description and category.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Product> {
        let needle = query.to_lowercase();
        self.products
            .iter()
            .filter(|p| p.matches_query(&needle))
            .collect()
    }

    /// Products passing `filter`.
    #[must_use]
    pub fn filter(&self, filter: &ProductFilter) -> Vec<&Product> {
        self.products.iter().filter(|p| filter.matches(p)).collect()
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.products
            .iter()
            .map(|p| p.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    /// Best sellers. There is no sales data, so these are the first products.
    #[must_use]
    pub fn best_selling(&self) -> Vec<&Product> {
        self.products.iter().take(BEST_SELLER_COUNT).collect()
    }

    /// Up to `limit` other products from the same category.
    #[must_use]
    pub fn related(&self, product: &Product, limit: usize) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.category == product.category && p.id != product.id)
            .take(limit)
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::demo()
    }
}

#[allow(clippy::too_many_arguments)]
fn product(
    id: i32,
    name: &str,
    description: &str,
    price_cents: i64,
    images: [String; 2],
    category: &str,
    in_stock: bool,
    featured: bool,
    rating_tenths: i64,
) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_owned(),
        description: description.to_owned(),
        price: Decimal::new(price_cents, 2),
        images: images.into(),
        category: category.to_owned(),
        in_stock,
        featured,
        rating: Decimal::new(rating_tenths, 1),
    }
}

fn demo_products() -> Vec<Product> {
    const UNSPLASH: &str = "https://images.unsplash.com";
    let img = |path: &str| format!("{UNSPLASH}/{path}?auto=format&fit=crop&w=1470&q=80");

    vec![
        product(
            1,
            "Smartphone Premium",
            "Dernier modèle de smartphone avec caméra 108MP, écran OLED et processeur ultra-rapide.",
            89999,
            [
                img("photo-1580910051074-3eb694886505"),
                img("photo-1598327105666-5b89351aff97"),
            ],
            "Électronique",
            true,
            true,
            48,
        ),
        product(
            2,
            "Ordinateur Portable Ultrabook",
            "Ordinateur portable léger et puissant pour les professionnels et créatifs.",
            129_999,
            [
                img("photo-1496181133206-80ce9b88a853"),
                img("photo-1498050108023-c5249f4df085"),
            ],
            "Électronique",
            true,
            true,
            46,
        ),
        product(
            3,
            "Écouteurs Sans Fil Pro",
            "Écouteurs avec réduction de bruit active et qualité sonore exceptionnelle.",
            24999,
            [
                img("photo-1590658268037-1e2a48a94195"),
                img("photo-1613040809024-b4ef7ba99bc3"),
            ],
            "Électronique",
            true,
            false,
            47,
        ),
        product(
            4,
            "Montre Intelligente",
            "Montre connectée avec suivi santé, notifications et GPS intégré.",
            29999,
            [
                img("photo-1579586337278-3befd40fd17a"),
                img("photo-1617043786394-f977fa12eddf"),
            ],
            "Accessoires",
            true,
            true,
            45,
        ),
        product(
            5,
            "Enceinte Bluetooth Portable",
            "Enceinte résistante à l'eau avec 24h d'autonomie et son immersif.",
            12999,
            [
                img("photo-1608043152269-423dbba4e7e1"),
                img("photo-1589491106920-0a470b7c31c6"),
            ],
            "Audio",
            true,
            false,
            44,
        ),
        product(
            6,
            "Appareil Photo Mirrorless",
            "Appareil photo professionnel léger avec capteur plein format.",
            149_999,
            [
                img("photo-1516035069371-29a1b244cc32"),
                img("photo-1502982720700-bfff97f2ecac"),
            ],
            "Photographie",
            false,
            true,
            49,
        ),
        product(
            7,
            "Tablette Graphique",
            "Tablette pour artistes et designers avec stylet sensible à la pression.",
            79999,
            [
                img("photo-1623934199716-711d34598dcc"),
                img("photo-1561505457-62c5d38efa82"),
            ],
            "Accessoires",
            true,
            false,
            46,
        ),
        product(
            8,
            "Console de Jeux",
            "Dernière génération de console avec graphismes 4K et manette sans fil.",
            49999,
            [
                img("photo-1486572788966-cfd3df1f5b42"),
                img("photo-1579586337278-3befd40fd17a"),
            ],
            "Jeux Vidéo",
            true,
            true,
            48,
        ),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn ids(products: &[&Product]) -> Vec<i32> {
        products.iter().map(|p| p.id.as_i32()).collect()
    }

    #[test]
    fn test_demo_catalog_shape() {
        let catalog = Catalog::demo();
        assert_eq!(catalog.all().len(), 8);
        assert_eq!(
            catalog.categories(),
            vec![
                "Électronique",
                "Accessoires",
                "Audio",
                "Photographie",
                "Jeux Vidéo"
            ]
        );
    }

    #[test]
    fn test_get_and_featured() {
        let catalog = Catalog::demo();
        assert_eq!(
            catalog.get(ProductId::new(4)).unwrap().name,
            "Montre Intelligente"
        );
        assert!(catalog.get(ProductId::new(42)).is_none());
        assert_eq!(ids(&catalog.featured()), vec![1, 2, 4, 6, 8]);
        assert_eq!(ids(&catalog.best_selling()), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_search_is_case_insensitive_over_all_text_fields() {
        let catalog = Catalog::demo();
        // name
        assert_eq!(ids(&catalog.search("CONSOLE")), vec![8]);
        // description
        assert_eq!(ids(&catalog.search("stylet")), vec![7]);
        // category
        assert_eq!(ids(&catalog.search("audio")), vec![5]);
        assert!(catalog.search("aspirateur").is_empty());
    }

    #[test]
    fn test_related_excludes_self() {
        let catalog = Catalog::demo();
        let phone = catalog.get(ProductId::new(1)).unwrap();
        assert_eq!(ids(&catalog.related(phone, 4)), vec![2, 3]);
        assert_eq!(ids(&catalog.related(phone, 1)), vec![2]);
    }

    #[test]
    fn test_filter_combines_criteria() {
        let catalog = Catalog::demo();

        let everything = ProductFilter::default();
        assert_eq!(catalog.filter(&everything).len(), 8);

        let accessories = ProductFilter {
            categories: vec!["Accessoires".to_string(), "Audio".to_string()],
            ..ProductFilter::default()
        };
        assert_eq!(ids(&catalog.filter(&accessories)), vec![4, 5, 7]);

        let cheap_electronics = ProductFilter {
            query: Some("  électronique ".to_string()),
            max_price: Decimal::new(300, 0),
            ..ProductFilter::default()
        };
        assert_eq!(ids(&catalog.filter(&cheap_electronics)), vec![3]);

        let bounds_inclusive = ProductFilter {
            min_price: Decimal::new(12999, 2),
            max_price: Decimal::new(12999, 2),
            ..ProductFilter::default()
        };
        assert_eq!(ids(&catalog.filter(&bounds_inclusive)), vec![5]);
    }

    #[test]
    fn test_to_cart_item_uses_first_image() {
        let catalog = Catalog::demo();
        let product = catalog.get(ProductId::new(5)).unwrap();
        let line = product.to_cart_item(2);
        assert_eq!(line.id, product.id);
        assert_eq!(line.price, product.price);
        assert_eq!(line.image, product.images[0]);
        assert_eq!(line.quantity, 2);
    }
}
