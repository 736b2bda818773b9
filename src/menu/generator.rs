use log::debug;
use rand::Rng;
use std::collections::HashSet;

use crate::catalog::Recipe;
use crate::menu::grid::{MenuGrid, MenuItem, WeekDay};
use crate::menu::matcher::eligible_recipes;

/// Uniform random source for candidate selection. Injected so tests can drive
/// the generator with a fixed sequence; production callers use
/// [`ThreadRandom`]. No seeding or reproducibility is guaranteed otherwise.
pub trait RandomSource {
    /// A value in `[0, 1)`.
    fn next_f32(&mut self) -> f32;
}

/// `rand::thread_rng`-backed [`RandomSource`].
#[derive(Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f32(&mut self) -> f32 {
        rand::thread_rng().gen::<f32>()
    }
}

fn pick<'a>(candidates: &[&'a Recipe], rng: &mut dyn RandomSource) -> &'a Recipe {
    let index = (rng.next_f32() * candidates.len() as f32) as usize;
    // next_f32 is half-open but a misbehaving source could return 1.0.
    candidates[index.min(candidates.len() - 1)]
}

/// Fills every slot of the grid with one randomly selected eligible recipe,
/// Monday→Sunday, first meal to last. Existing slot contents are discarded.
///
/// Each placement records the recipe name in the weekly `used` set so the
/// matcher discourages repetition; when every fallback tier comes up empty
/// the slot is simply left empty. Runs to completion, no suspension points.
pub fn fill_random(grid: &mut MenuGrid, catalog: &[Recipe], rng: &mut dyn RandomSource) {
    let mut used: HashSet<String> = HashSet::new();

    for week_day in WeekDay::ALL {
        let day = week_day.index();
        for meal in 0..grid.meal_count() {
            let meal_type = grid.meal_types()[meal];
            grid.clear_slot(day, meal);

            let candidates = eligible_recipes(catalog, meal_type, week_day, &used);
            if candidates.is_empty() {
                continue;
            }

            let recipe = pick(&candidates, rng);
            debug!(
                "slot {} / {}: picked '{}' from {} candidate(s)",
                week_day,
                meal_type,
                recipe.name,
                candidates.len()
            );
            used.insert(recipe.name.clone());
            // The slot was just cleared, so a single insert cannot be refused.
            let _ = grid.add_item(day, meal, MenuItem::from_recipe(recipe));
        }
    }
}

/// A fresh random week at the given meal count.
pub fn generate_random_menu(catalog: &[Recipe], meal_count: usize, rng: &mut dyn RandomSource) -> MenuGrid {
    let mut grid = MenuGrid::new(meal_count);
    fill_random(&mut grid, catalog, rng);
    grid
}
