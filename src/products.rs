use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;

use crate::nutrition::NutritionPer100;
use crate::text::normalize;

const SEARCH_URL: &str = "https://es.openfoodfacts.org/cgi/search.pl";
const USER_AGENT: &str = "PlanificaTuMenu - Rust - Version 0.1";
const PAGE_SIZE: u32 = 24;

/// A food product from the external database. Nutrition is per 100 g/ml when
/// the database knows it; its absence is a normal state, not an error.
#[derive(Debug, Clone)]
pub struct Product {
    pub code: String,
    pub name: String,
    pub brand: Option<String>,
    pub quantity_label: Option<String>,
    pub nutrition: Option<NutritionPer100>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<RawProduct>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    #[serde(default)]
    code: String,
    #[serde(default)]
    product_name_es: Option<String>,
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    brands: Option<String>,
    #[serde(default)]
    quantity: Option<String>,
    #[serde(default)]
    nutriments: Option<RawNutriments>,
}

#[derive(Debug, Deserialize)]
struct RawNutriments {
    #[serde(rename = "energy-kcal_100g", default)]
    energy_kcal_100g: f64,
    #[serde(default)]
    proteins_100g: f64,
    #[serde(default)]
    carbohydrates_100g: f64,
    #[serde(default)]
    fat_100g: f64,
    #[serde(default)]
    fiber_100g: f64,
    #[serde(default)]
    sodium_100g: f64,
}

impl RawProduct {
    fn into_product(self) -> Option<Product> {
        // The Spanish name wins when present; products with no name at all
        // are dropped.
        let name = self
            .product_name_es
            .filter(|n| !n.trim().is_empty())
            .or(self.product_name.filter(|n| !n.trim().is_empty()))?;
        Some(Product {
            code: self.code,
            name,
            brand: self.brands.filter(|b| !b.trim().is_empty()),
            quantity_label: self.quantity,
            nutrition: self.nutriments.map(|n| NutritionPer100 {
                calories: n.energy_kcal_100g,
                proteins: n.proteins_100g,
                carbohydrates: n.carbohydrates_100g,
                fats: n.fat_100g,
                fiber: n.fiber_100g,
                sodium: n.sodium_100g,
            }),
        })
    }
}

/// Orders results for display: products with nutrition data first, then
/// products whose name contains the search term.
fn sort_by_relevance(products: &mut [Product], term: &str) {
    let term = normalize(term);
    products.sort_by_key(|product| {
        let has_nutrition = product.nutrition.is_some();
        let name_matches = normalize(&product.name).contains(&term);
        (!has_nutrition, !name_matches)
    });
}

/// Searches the external food database. Returns up to one page of products;
/// a failed request propagates as an error, an empty result is normal.
pub async fn search_products(client: &Client, query: &str) -> Result<Vec<Product>> {
    let response = client
        .get(SEARCH_URL)
        .header("User-Agent", USER_AGENT)
        .query(&[
            ("search_terms", query),
            ("search_simple", "1"),
            ("action", "process"),
            ("json", "1"),
            ("page_size", &PAGE_SIZE.to_string()),
        ])
        .send()
        .await
        .context("Product search request failed")?
        .error_for_status()
        .context("Product search returned an error status")?;

    let body: SearchResponse = response
        .json()
        .await
        .context("Failed to parse product search response")?;

    let mut products: Vec<Product> = body
        .products
        .into_iter()
        .filter_map(RawProduct::into_product)
        .collect();
    sort_by_relevance(&mut products, query);
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, nutrition: Option<NutritionPer100>) -> Product {
        Product {
            code: "0000".to_string(),
            name: name.to_string(),
            brand: None,
            quantity_label: None,
            nutrition,
        }
    }

    #[test]
    fn test_sort_puts_products_with_nutrition_first() {
        let mut products = vec![
            product("Leche entera", None),
            product("Leche desnatada", Some(NutritionPer100::default())),
        ];
        sort_by_relevance(&mut products, "leche");
        assert_eq!(products[0].name, "Leche desnatada");
    }

    #[test]
    fn test_sort_prefers_matching_names_within_a_group() {
        let mut products = vec![
            product("Bebida de avena", Some(NutritionPer100::default())),
            product("Leche entera", Some(NutritionPer100::default())),
        ];
        sort_by_relevance(&mut products, "leche");
        assert_eq!(products[0].name, "Leche entera");
    }

    #[test]
    fn test_raw_product_without_any_name_is_dropped() {
        let raw: RawProduct = serde_json::from_str(r#"{"code": "123"}"#).unwrap();
        assert!(raw.into_product().is_none());
    }

    #[test]
    fn test_raw_product_prefers_spanish_name() {
        let raw: RawProduct = serde_json::from_str(
            r#"{"code": "123", "product_name": "Milk", "product_name_es": "Leche"}"#,
        )
        .unwrap();
        assert_eq!(raw.into_product().unwrap().name, "Leche");
    }

    #[test]
    fn test_missing_nutriment_fields_default_to_zero() {
        let raw: RawProduct = serde_json::from_str(
            r#"{"code": "1", "product_name": "Pan", "nutriments": {"energy-kcal_100g": 250.0}}"#,
        )
        .unwrap();
        let nutrition = raw.into_product().unwrap().nutrition.unwrap();
        assert_eq!(nutrition.calories, 250.0);
        assert_eq!(nutrition.proteins, 0.0);
        assert_eq!(nutrition.sodium, 0.0);
    }
}
