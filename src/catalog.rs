use anyhow::{Context, Result};
use csv::ReaderBuilder;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::menu::grid::{MealType, WeekDay};
use crate::nutrition::NutritionPer100;
use crate::text::normalize;

/// One ingredient reference inside a recipe: quantity in the ingredient's
/// base unit (grams or milliliters) and, when known, its per-100 macros.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecipeIngredient {
    pub name: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub nutrition: Option<NutritionPer100>,
}

/// A catalog recipe. Empty `meal_types` / `week_days` mean "no preference":
/// the recipe matches any meal type or any week day respectively. Recipes are
/// read-only input during menu generation.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub meal_types: Vec<MealType>,
    #[serde(default)]
    pub week_days: Vec<WeekDay>,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub instructions: String,
}

/// Parses a recipe catalog from JSON (an array of recipes).
pub fn parse_catalog(content: &str) -> Result<Vec<Recipe>> {
    let recipes: Vec<Recipe> =
        serde_json::from_str(content).context("Failed to parse catalog JSON")?;
    if recipes.is_empty() {
        warn!("catalog contains no recipes; generation will leave every slot empty");
    }
    Ok(recipes)
}

/// Loads a recipe catalog from a JSON file.
pub fn load_catalog(path: &Path) -> Result<Vec<Recipe>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file at {:?}", path))?;
    parse_catalog(&content).with_context(|| format!("Invalid catalog at {:?}", path))
}

// Expected nutrition table column headers
const NAME_COL: &str = "Name";
const CALORIES_COL: &str = "Calories (kcal/100g)";
const PROTEINS_COL: &str = "Proteins (g/100g)";
const CARBS_COL: &str = "Carbohydrates (g/100g)";
const FATS_COL: &str = "Fats (g/100g)";
const FIBER_COL: &str = "Fiber (g/100g)";
const SODIUM_COL: &str = "Sodium (g/100g)";

fn parse_field_or_zero(s: &str) -> f64 {
    // Blank or malformed cells count as zero, keeping partial rows usable.
    s.trim().parse::<f64>().unwrap_or(0.0)
}

/// Loads a per-100g nutrition table from CSV, keyed by normalized ingredient
/// name. Rows with an empty name are skipped.
pub fn load_nutrition_table(csv_path: &Path) -> Result<HashMap<String, NutritionPer100>> {
    if !csv_path.exists() {
        return Err(anyhow::anyhow!("Nutrition CSV file not found at: {:?}", csv_path));
    }

    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open nutrition CSV file at {:?}", csv_path))?;
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = rdr.headers()?.clone();

    let col = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow::anyhow!("Column '{}' not found", name))
    };
    let name_idx = col(NAME_COL)?;
    let calories_idx = col(CALORIES_COL)?;
    let proteins_idx = col(PROTEINS_COL)?;
    let carbs_idx = col(CARBS_COL)?;
    let fats_idx = col(FATS_COL)?;
    let fiber_idx = col(FIBER_COL)?;
    let sodium_idx = col(SODIUM_COL)?;

    let mut table = HashMap::new();
    for (row_index, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read record at row index {}", row_index))?;

        let name = record.get(name_idx).unwrap_or("").trim();
        if name.is_empty() {
            continue;
        }

        let nutrition = NutritionPer100 {
            calories: record.get(calories_idx).map_or(0.0, parse_field_or_zero),
            proteins: record.get(proteins_idx).map_or(0.0, parse_field_or_zero),
            carbohydrates: record.get(carbs_idx).map_or(0.0, parse_field_or_zero),
            fats: record.get(fats_idx).map_or(0.0, parse_field_or_zero),
            fiber: record.get(fiber_idx).map_or(0.0, parse_field_or_zero),
            sodium: record.get(sodium_idx).map_or(0.0, parse_field_or_zero),
        };
        table.insert(normalize(name), nutrition);
    }

    if table.is_empty() {
        return Err(anyhow::anyhow!("No valid nutrition rows loaded from {:?}", csv_path));
    }

    Ok(table)
}

/// Fills in per-100 nutrition for ingredients that lack inline values, looking
/// them up in the table by normalized name. Unmatched ingredients keep `None`
/// and contribute zero to aggregation.
pub fn resolve_ingredient_nutrition(recipes: &mut [Recipe], table: &HashMap<String, NutritionPer100>) {
    for recipe in recipes.iter_mut() {
        for ingredient in recipe.ingredients.iter_mut() {
            if ingredient.nutrition.is_none() {
                if let Some(per_100) = table.get(&normalize(&ingredient.name)) {
                    ingredient.nutrition = Some(per_100.clone());
                } else {
                    warn!(
                        "no nutrition data for ingredient '{}' in recipe '{}'",
                        ingredient.name, recipe.name
                    );
                }
            }
        }
    }
}
