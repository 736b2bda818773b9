use serde::{Deserialize, Serialize};

use crate::catalog::Recipe;
use crate::menu::grid::{MenuGrid, MenuItem, WEEK_DAYS};

/// Tolerance under which two aggregated values are considered equal. The sums
/// are plain f64 additions; reordering items can shift the last bits, but at
/// weekly-menu magnitudes those stay far below this bound.
pub const AGGREGATION_TOLERANCE: f64 = 1e-6;

/// Macro values normalized to 100 grams/milliliters, as stored on ingredient
/// rows and returned by the product search. Absent fields deserialize to zero:
/// partial nutrition data is a normal state, not an error.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct NutritionPer100 {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub proteins: f64,
    #[serde(default)]
    pub carbohydrates: f64,
    #[serde(default)]
    pub fats: f64,
    #[serde(default)]
    pub fiber: f64,
    #[serde(default)]
    pub sodium: f64,
}

impl NutritionPer100 {
    /// Scales the per-100 values to an actual quantity of grams/milliliters.
    pub fn scaled(&self, quantity: f64) -> NutritionTotals {
        let ratio = quantity / 100.0;
        NutritionTotals {
            calories: self.calories * ratio,
            proteins: self.proteins * ratio,
            carbohydrates: self.carbohydrates * ratio,
            fats: self.fats * ratio,
            fiber: self.fiber * ratio,
            sodium: self.sodium * ratio,
        }
    }
}

/// Already-scaled nutrition totals attached to menu items and produced by the
/// slot/day/week sums. All-zero totals mean "no nutrition data" and callers
/// suppress display in that case.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct NutritionTotals {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub proteins: f64,
    #[serde(default)]
    pub carbohydrates: f64,
    #[serde(default)]
    pub fats: f64,
    #[serde(default)]
    pub fiber: f64,
    #[serde(default)]
    pub sodium: f64,
}

impl NutritionTotals {
    pub fn add(&mut self, other: &NutritionTotals) {
        self.calories += other.calories;
        self.proteins += other.proteins;
        self.carbohydrates += other.carbohydrates;
        self.fats += other.fats;
        self.fiber += other.fiber;
        self.sodium += other.sodium;
    }

    /// True when every field is zero, i.e. no nutrition data contributed.
    pub fn is_empty(&self) -> bool {
        self.calories == 0.0
            && self.proteins == 0.0
            && self.carbohydrates == 0.0
            && self.fats == 0.0
            && self.fiber == 0.0
            && self.sodium == 0.0
    }

    pub fn approx_eq(&self, other: &NutritionTotals, tolerance: f64) -> bool {
        (self.calories - other.calories).abs() <= tolerance
            && (self.proteins - other.proteins).abs() <= tolerance
            && (self.carbohydrates - other.carbohydrates).abs() <= tolerance
            && (self.fats - other.fats).abs() <= tolerance
            && (self.fiber - other.fiber).abs() <= tolerance
            && (self.sodium - other.sodium).abs() <= tolerance
    }
}

/// Sums the nutrition a recipe provides per serving: each ingredient with
/// known per-100 values contributes `quantity / 100` times those values;
/// ingredients without nutrition data contribute nothing.
pub fn recipe_nutrition(recipe: &Recipe) -> NutritionTotals {
    let mut totals = NutritionTotals::default();
    for ingredient in &recipe.ingredients {
        if let Some(per_100) = &ingredient.nutrition {
            totals.add(&per_100.scaled(ingredient.quantity));
        }
    }
    totals
}

/// Field-wise sum over the already-scaled nutrition of the items in one slot.
/// Items without nutrition data are skipped, no further ratio is applied.
pub fn slot_nutrition(items: &[MenuItem]) -> NutritionTotals {
    let mut totals = NutritionTotals::default();
    for item in items {
        if let Some(nutrition) = &item.nutrition {
            totals.add(nutrition);
        }
    }
    totals
}

/// Sum over every meal slot of one day. `day` is the 0-based Monday-first
/// grid index.
pub fn day_nutrition(grid: &MenuGrid, day: usize) -> NutritionTotals {
    let mut totals = NutritionTotals::default();
    for meal in 0..grid.meal_count() {
        totals.add(&slot_nutrition(grid.slot(day, meal)));
    }
    totals
}

/// Sum over the whole week.
pub fn week_nutrition(grid: &MenuGrid) -> NutritionTotals {
    let mut totals = NutritionTotals::default();
    for day in 0..WEEK_DAYS {
        totals.add(&day_nutrition(grid, day));
    }
    totals
}
