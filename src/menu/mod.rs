pub mod generator;
pub mod grid;
pub mod matcher;
pub mod naming;

pub use generator::{fill_random, generate_random_menu, RandomSource, ThreadRandom};
pub use grid::{meal_types_for, AddItemError, MealType, MenuGrid, MenuItem, MenuSource, WeekDay};
pub use matcher::eligible_recipes;
pub use naming::{default_menu_name, resolve_unique_name, week_of};

use serde::{Deserialize, Serialize};

/// A persisted weekly menu, owned by one user. `meal_plan` is the 7×N grid
/// contents; `meal_types` has length `meal_count`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WeeklyMenu {
    pub id: String,
    pub name: String,
    pub year: i32,
    pub week: u32,
    pub meal_count: usize,
    pub meal_types: Vec<MealType>,
    pub meal_plan: Vec<Vec<Vec<MenuItem>>>,
    pub user_id: String,
}

impl WeeklyMenu {
    /// The editable grid for this menu.
    pub fn grid(&self) -> MenuGrid {
        MenuGrid::from_parts(self.meal_count, self.meal_plan.clone())
    }
}

/// A weekly menu about to be created; the store assigns id and owner, and
/// resolves the name against the user's existing menus before insert.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewWeeklyMenu {
    pub name: String,
    pub year: i32,
    pub week: u32,
    pub meal_count: usize,
    pub meal_types: Vec<MealType>,
    pub meal_plan: Vec<Vec<Vec<MenuItem>>>,
}

impl NewWeeklyMenu {
    /// Bundles a grid with its naming/week metadata for saving.
    pub fn from_grid(name: String, year: i32, week: u32, grid: MenuGrid) -> Self {
        NewWeeklyMenu {
            name,
            year,
            week,
            meal_count: grid.meal_count(),
            meal_types: grid.meal_types().to_vec(),
            meal_plan: grid.into_meal_plan(),
        }
    }
}

/// A partial update for an existing menu; absent fields keep their stored
/// value. When `name` is set the store re-resolves it for uniqueness,
/// excluding the menu being edited from the probe.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct MenuPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_types: Option<Vec<MealType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_plan: Option<Vec<Vec<Vec<MenuItem>>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_weekly_menu_from_grid_carries_shape() {
        let grid = MenuGrid::new(3);
        let menu = NewWeeklyMenu::from_grid("Semana 35".to_string(), 2025, 35, grid);
        assert_eq!(menu.meal_count, 3);
        assert_eq!(menu.meal_types.len(), 3);
        assert_eq!(menu.meal_plan.len(), 7);
        assert!(menu.meal_plan.iter().all(|day| day.len() == 3));
    }

    #[test]
    fn test_menu_patch_serializes_only_set_fields() {
        let patch = MenuPatch { name: Some("Otro nombre".to_string()), ..Default::default() };
        let value = serde_json::to_value(&patch).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert_eq!(object["name"], "Otro nombre");
    }
}
