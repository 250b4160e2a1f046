//! Product listing pipeline: search, category filter and sort.
//!
//! Operates on an in-memory product list as fetched from the catalog API.

use std::cmp::Ordering;

use marketstall_core::{Category, Product, ProductId};
use rust_decimal::Decimal;
use serde::Serialize;

/// Minimum rating for a product to count as trending.
pub const TRENDING_MIN_RATING: f64 = 4.5;

/// Products priced above this are listed as premium.
pub const PREMIUM_MIN_PRICE: Decimal = Decimal::from_parts(200, 0, 0, false, 0);

/// Number of products shown as featured.
pub const FEATURED_COUNT: usize = 4;

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Case-insensitive by name.
    #[default]
    Name,
    /// Cheapest first.
    PriceLow,
    /// Most expensive first.
    PriceHigh,
    /// Highest rated first.
    Rating,
}

impl SortKey {
    /// Parse a sort key, falling back to [`SortKey::Name`] for anything
    /// unrecognised.
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        match value {
            "price-low" => Self::PriceLow,
            "price-high" => Self::PriceHigh,
            "rating" => Self::Rating,
            _ => Self::Name,
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Name => compare_names(a, b),
            Self::PriceLow => a.price.cmp(&b.price),
            Self::PriceHigh => b.price.cmp(&a.price),
            Self::Rating => b.rating.total_cmp(&a.rating),
        }
    }
}

/// Category restriction for a listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    /// Match products whose category has this slug (case-insensitive).
    Slug(String),
}

impl CategoryFilter {
    /// `"all"` (any case) or an empty value means no restriction.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Slug(value.to_string())
        }
    }
}

/// Search, filter and sort options for a listing.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: CategoryFilter,
    pub sort: SortKey,
}

/// A filtered listing with the size of the unfiltered catalog.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub products: Vec<Product>,
    /// Number of products before filtering.
    pub total: usize,
}

impl Catalog {
    /// Run `query` over `products`.
    #[must_use]
    pub fn query(products: &[Product], categories: &[Category], query: &ProductQuery) -> Self {
        Self {
            products: filter_products(products, categories, query),
            total: products.len(),
        }
    }
}

/// Products matching `query`, sorted as requested.
#[must_use]
pub fn filter_products(
    products: &[Product],
    categories: &[Category],
    query: &ProductQuery,
) -> Vec<Product> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_lowercase();

    let mut matched: Vec<Product> = products
        .iter()
        .filter(|product| needle.is_empty() || product.name.to_lowercase().contains(&needle))
        .filter(|product| matches_category(product, categories, &query.category))
        .cloned()
        .collect();

    matched.sort_by(|a, b| query.sort.compare(a, b));
    matched
}

/// Products rated at least [`TRENDING_MIN_RATING`], best first.
#[must_use]
pub fn trending(products: &[Product]) -> Vec<Product> {
    let mut matched: Vec<Product> = products
        .iter()
        .filter(|product| product.rating >= TRENDING_MIN_RATING)
        .cloned()
        .collect();
    matched.sort_by(|a, b| SortKey::Rating.compare(a, b));
    matched
}

/// Products priced above [`PREMIUM_MIN_PRICE`], in catalog order.
#[must_use]
pub fn premium(products: &[Product]) -> Vec<Product> {
    products
        .iter()
        .filter(|product| product.price > PREMIUM_MIN_PRICE)
        .cloned()
        .collect()
}

/// The first [`FEATURED_COUNT`] products.
#[must_use]
pub fn featured(products: &[Product]) -> Vec<Product> {
    products.iter().take(FEATURED_COUNT).cloned().collect()
}

#[must_use]
pub fn find_product<'a>(products: &'a [Product], id: &ProductId) -> Option<&'a Product> {
    products.iter().find(|product| &product.id == id)
}

fn matches_category(product: &Product, categories: &[Category], filter: &CategoryFilter) -> bool {
    match filter {
        CategoryFilter::All => true,
        CategoryFilter::Slug(slug) => categories
            .iter()
            .find(|category| category.name == product.category)
            .is_some_and(|category| category.slug.to_lowercase() == slug.to_lowercase()),
    }
}

fn compare_names(a: &Product, b: &Product) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use marketstall_core::CategoryId;

    use super::*;

    fn product(id: &str, name: &str, price: i64, rating: f64, category: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Decimal::new(price, 0),
            original_price: None,
            image: String::new(),
            brand: "Acme".to_string(),
            category: category.to_string(),
            description: String::new(),
            features: Vec::new(),
            rating,
            review_count: 0,
            in_stock: true,
            tags: Vec::new(),
        }
    }

    fn category(name: &str, slug: &str) -> Category {
        Category {
            id: CategoryId::new(slug),
            name: name.to_string(),
            slug: slug.to_string(),
            image: String::new(),
            product_count: 0,
        }
    }

    fn fixture() -> (Vec<Product>, Vec<Category>) {
        let products = vec![
            product("1", "Wireless Headphones", 299, 4.8, "Audio"),
            product("2", "smart watch", 199, 4.5, "Wearables"),
            product("3", "Bluetooth Speaker", 89, 4.1, "Audio"),
            product("4", "Fitness Band", 49, 3.9, "Wearables"),
            product("5", "Desk Lamp", 25, 4.9, "Home"),
        ];
        let categories = vec![
            category("Audio", "audio"),
            category("Wearables", "wearables"),
        ];
        (products, categories)
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_default_query_sorts_by_name_case_insensitively() {
        let (products, categories) = fixture();
        let result = filter_products(&products, &categories, &ProductQuery::default());
        assert_eq!(ids(&result), vec!["3", "5", "4", "2", "1"]);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let (products, categories) = fixture();
        let query = ProductQuery {
            search: Some("WATCH".to_string()),
            ..ProductQuery::default()
        };
        assert_eq!(ids(&filter_products(&products, &categories, &query)), vec!["2"]);
    }

    #[test]
    fn test_category_filter_matches_slug_via_category_name() {
        let (products, categories) = fixture();
        let query = ProductQuery {
            category: CategoryFilter::parse("AUDIO"),
            sort: SortKey::PriceLow,
            ..ProductQuery::default()
        };
        assert_eq!(
            ids(&filter_products(&products, &categories, &query)),
            vec!["3", "1"]
        );
    }

    #[test]
    fn test_category_filter_excludes_unknown_categories() {
        let (products, categories) = fixture();
        // "Home" has no entry in the category list.
        let query = ProductQuery {
            category: CategoryFilter::Slug("home".to_string()),
            ..ProductQuery::default()
        };
        assert!(filter_products(&products, &categories, &query).is_empty());
    }

    #[test]
    fn test_sort_orders() {
        let (products, categories) = fixture();
        let sorted = |sort| {
            let query = ProductQuery {
                sort,
                ..ProductQuery::default()
            };
            filter_products(&products, &categories, &query)
                .into_iter()
                .map(|p| p.id.into_inner())
                .collect::<Vec<_>>()
        };

        assert_eq!(sorted(SortKey::PriceLow), vec!["5", "4", "3", "2", "1"]);
        assert_eq!(sorted(SortKey::PriceHigh), vec!["1", "2", "3", "4", "5"]);
        assert_eq!(sorted(SortKey::Rating), vec!["5", "1", "2", "3", "4"]);
    }

    #[test]
    fn test_sort_key_parse_falls_back_to_name() {
        assert_eq!(SortKey::parse_or_default("price-low"), SortKey::PriceLow);
        assert_eq!(SortKey::parse_or_default("price-high"), SortKey::PriceHigh);
        assert_eq!(SortKey::parse_or_default("rating"), SortKey::Rating);
        assert_eq!(SortKey::parse_or_default("newest"), SortKey::Name);
    }

    #[test]
    fn test_category_filter_parse() {
        assert_eq!(CategoryFilter::parse("All"), CategoryFilter::All);
        assert_eq!(CategoryFilter::parse("  "), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::parse("audio"),
            CategoryFilter::Slug("audio".to_string())
        );
    }

    #[test]
    fn test_trending_premium_featured() {
        let (products, _) = fixture();
        assert_eq!(ids(&trending(&products)), vec!["5", "1", "2"]);
        assert_eq!(ids(&premium(&products)), vec!["1"]);
        assert_eq!(ids(&featured(&products)), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_catalog_reports_unfiltered_total() {
        let (products, categories) = fixture();
        let query = ProductQuery {
            search: Some("band".to_string()),
            ..ProductQuery::default()
        };
        let catalog = Catalog::query(&products, &categories, &query);
        assert_eq!(catalog.products.len(), 1);
        assert_eq!(catalog.total, 5);
    }

    #[test]
    fn test_find_product() {
        let (products, _) = fixture();
        assert_eq!(
            find_product(&products, &ProductId::new("3")).unwrap().name,
            "Bluetooth Speaker"
        );
        assert!(find_product(&products, &ProductId::new("99")).is_none());
    }
}
