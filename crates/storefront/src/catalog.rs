//! Static product catalog.
//!
//! The catalog is a fixed, preloaded set of products for the lifetime of
//! the process. There are no create/update/delete operations; prices are
//! authored in the base currency (USD).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use verdant_core::ProductId;

/// A catalog product.
///
/// Immutable once defined. The full record travels with cart line items so
/// a persisted cart can be displayed without re-resolving the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Unit price in the base currency.
    pub price: Decimal,
    pub image_url: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_number: Option<String>,
}

/// The fixed product catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Create a catalog from an explicit product list (used by tests).
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Look up a product by its identifier.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Look up a product by its exact display name.
    ///
    /// Upsell recommendations arrive as product names and are matched back
    /// against the catalog here.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.name == name)
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for product in &self.products {
            if !categories.contains(&product.category.as_str()) {
                categories.push(&product.category);
            }
        }
        categories
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Default for Catalog {
    /// The shipped nine-product catalog.
    fn default() -> Self {
        Self::with_products(seed_products())
    }
}

fn product(
    id: &str,
    name: &str,
    description: &str,
    price_cents: i64,
    image_url: &str,
    category: &str,
    model_number: &str,
) -> Product {
    Product {
        id: ProductId::from(id),
        name: name.to_owned(),
        description: description.to_owned(),
        price: Decimal::new(price_cents, 2),
        image_url: image_url.to_owned(),
        category: category.to_owned(),
        model_number: Some(model_number.to_owned()),
    }
}

/// The products the store ships with.
fn seed_products() -> Vec<Product> {
    vec![
        product(
            "1",
            "Laptop Pro",
            "High-performance laptop for all your professional needs. Features a stunning display and a powerful processor.",
            129_999,
            "https://images.verdant.shop/products/laptop-pro.jpg",
            "Electronics",
            "LP-2024-A",
        ),
        product(
            "2",
            "Smartphone X",
            "The latest smartphone with a cutting-edge camera and all-day battery life. Stay connected in style.",
            89_950,
            "https://images.verdant.shop/products/smartphone-x.jpg",
            "Electronics",
            "SX-2024-C",
        ),
        product(
            "3",
            "Wireless Headphones",
            "Immerse yourself in high-fidelity sound with these noise-cancelling wireless headphones. Perfect for music lovers.",
            19_900,
            "https://images.verdant.shop/products/wireless-headphones.jpg",
            "Electronics",
            "WH-2024-B",
        ),
        product(
            "4",
            "Premium Spark Plugs",
            "Set of 4 high-performance spark plugs to improve your engine's efficiency and power. Built to last.",
            4_500,
            "https://images.verdant.shop/products/spark-plugs.jpg",
            "Car Parts",
            "PSP-2024-D",
        ),
        product(
            "5",
            "Ceramic Brake Pads",
            "Front set of ceramic brake pads for superior stopping power and low dust. Ensures a quiet and smooth ride.",
            7_580,
            "https://images.verdant.shop/products/brake-pads.jpg",
            "Car Parts",
            "CBP-2024-F",
        ),
        product(
            "6",
            "Engine Air Filter",
            "High-flow engine air filter to protect your engine from contaminants and improve airflow for better performance.",
            2_230,
            "https://images.verdant.shop/products/air-filter.jpg",
            "Car Parts",
            "EAF-2024-E",
        ),
        product(
            "7",
            "Organic Gala Apples",
            "A bag of fresh, crispy, and sweet organic Gala apples. Perfect for a healthy snack.",
            599,
            "https://images.verdant.shop/products/gala-apples.jpg",
            "Groceries",
            "OGA-2024-G",
        ),
        product(
            "8",
            "Whole Milk Gallon",
            "One gallon of fresh, Grade A whole milk. Rich in calcium and vitamin D.",
            350,
            "https://images.verdant.shop/products/whole-milk.jpg",
            "Groceries",
            "WMG-2024-H",
        ),
        product(
            "9",
            "Sourdough Bread Loaf",
            "Artisan sourdough loaf with a crispy crust and a chewy interior. Baked fresh daily.",
            625,
            "https://images.verdant.shop/products/sourdough.jpg",
            "Groceries",
            "SBL-2024-I",
        ),
    ]
}
