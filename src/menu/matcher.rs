use log::debug;
use std::collections::HashSet;

use crate::catalog::Recipe;
use crate::menu::grid::{MealType, WeekDay};

/// True when the recipe's preferences allow this (meal type, week day) slot.
/// An empty preference set matches anything.
fn matches_slot(recipe: &Recipe, meal_type: MealType, week_day: WeekDay) -> bool {
    let meal_ok = recipe.meal_types.is_empty() || recipe.meal_types.contains(&meal_type);
    let day_ok = recipe.week_days.is_empty() || recipe.week_days.contains(&week_day);
    meal_ok && day_ok
}

/// The recipes eligible for one slot, found by trying relaxation tiers in
/// order until one yields candidates:
///
/// 1. preference match, not yet used this week;
/// 2. recipes with no preferences at all, not yet used this week;
/// 3. preference match, reuse allowed.
///
/// An empty result after tier 3 is a normal outcome (the slot stays empty),
/// never an error.
pub fn eligible_recipes<'a>(
    catalog: &'a [Recipe],
    meal_type: MealType,
    week_day: WeekDay,
    used_names: &HashSet<String>,
) -> Vec<&'a Recipe> {
    let tiers: [&dyn Fn(&Recipe) -> bool; 3] = [
        &|r| matches_slot(r, meal_type, week_day) && !used_names.contains(&r.name),
        &|r| r.meal_types.is_empty() && r.week_days.is_empty() && !used_names.contains(&r.name),
        &|r| matches_slot(r, meal_type, week_day),
    ];

    for (tier, predicate) in tiers.iter().enumerate() {
        let candidates: Vec<&Recipe> = catalog.iter().filter(|r| predicate(r)).collect();
        if !candidates.is_empty() {
            if tier > 0 {
                debug!(
                    "slot {} / {}: tier {} fallback yielded {} candidate(s)",
                    week_day,
                    meal_type,
                    tier + 1,
                    candidates.len()
                );
            }
            return candidates;
        }
    }

    debug!("slot {} / {}: no eligible recipe after all tiers", week_day, meal_type);
    Vec::new()
}
