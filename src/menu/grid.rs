use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::Recipe;
use crate::nutrition::{recipe_nutrition, NutritionTotals};
use crate::products::Product;

/// Days in a menu week, Monday-first.
pub const WEEK_DAYS: usize = 7;

/// Most items one slot can hold.
pub const MAX_ITEMS_PER_SLOT: usize = 4;

/// The fixed meal-type set, in day order. Which subset applies to a menu is
/// derived from its meal count via [`meal_types_for`], never user-defined.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MealType {
    Desayuno,
    #[serde(rename = "Media Mañana")]
    MediaManana,
    Almuerzo,
    Comida,
    Merienda,
    Cena,
}

impl MealType {
    pub fn label(&self) -> &'static str {
        match self {
            MealType::Desayuno => "Desayuno",
            MealType::MediaManana => "Media Mañana",
            MealType::Almuerzo => "Almuerzo",
            MealType::Comida => "Comida",
            MealType::Merienda => "Merienda",
            MealType::Cena => "Cena",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The ordered meal-type labels for a given meal count. Counts outside 1..=6
/// fall back to the 4-meal table.
pub fn meal_types_for(count: usize) -> Vec<MealType> {
    use MealType::*;
    match count {
        1 => vec![Comida],
        2 => vec![Comida, Cena],
        3 => vec![Desayuno, Comida, Cena],
        4 => vec![Desayuno, Comida, Merienda, Cena],
        5 => vec![Desayuno, Almuerzo, Comida, Merienda, Cena],
        6 => vec![Desayuno, MediaManana, Almuerzo, Comida, Merienda, Cena],
        _ => vec![Desayuno, Comida, Merienda, Cena],
    }
}

/// Week days, Monday-first, with fixed grid indices 0..=6.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeekDay {
    Lunes,
    Martes,
    #[serde(rename = "Miércoles")]
    Miercoles,
    Jueves,
    Viernes,
    #[serde(rename = "Sábado")]
    Sabado,
    Domingo,
}

impl WeekDay {
    pub const ALL: [WeekDay; WEEK_DAYS] = [
        WeekDay::Lunes,
        WeekDay::Martes,
        WeekDay::Miercoles,
        WeekDay::Jueves,
        WeekDay::Viernes,
        WeekDay::Sabado,
        WeekDay::Domingo,
    ];

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|d| d == self).unwrap_or(0)
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeekDay::Lunes => "Lunes",
            WeekDay::Martes => "Martes",
            WeekDay::Miercoles => "Miércoles",
            WeekDay::Jueves => "Jueves",
            WeekDay::Viernes => "Viernes",
            WeekDay::Sabado => "Sábado",
            WeekDay::Domingo => "Domingo",
        }
    }
}

impl fmt::Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a slot entry came from: a catalog recipe or an ad-hoc food product.
/// The grid and the aggregator treat both uniformly.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MenuSource {
    Recipe { id: String },
    Product,
}

/// One entry in a meal slot. `nutrition` is already scaled to `quantity`
/// (recipes: one serving; products: the chosen gram/ml amount, scaled once at
/// insertion time), so aggregation is a plain sum.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MenuItem {
    pub name: String,
    pub quantity: f64,
    pub source: MenuSource,
    #[serde(default)]
    pub nutrition: Option<NutritionTotals>,
}

impl MenuItem {
    /// A one-serving entry for a recipe, with nutrition summed from its
    /// ingredient list. All-zero totals are stored as "no data".
    pub fn from_recipe(recipe: &Recipe) -> Self {
        let totals = recipe_nutrition(recipe);
        MenuItem {
            name: recipe.name.clone(),
            quantity: 1.0,
            source: MenuSource::Recipe { id: recipe.id.clone() },
            nutrition: if totals.is_empty() { None } else { Some(totals) },
        }
    }

    /// A product entry for `grams` of the product, with its per-100 nutrition
    /// scaled once here.
    pub fn from_product(product: &Product, grams: f64) -> Self {
        MenuItem {
            name: product.name.clone(),
            quantity: grams,
            source: MenuSource::Product,
            nutrition: product.nutrition.as_ref().map(|per_100| per_100.scaled(grams)),
        }
    }
}

/// Why a manual add was refused. The grid is left untouched in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddItemError {
    SlotFull,
    DuplicateName,
    /// The (day, meal) coordinates name no slot in this grid.
    InvalidSlot,
}

impl fmt::Display for AddItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddItemError::SlotFull => write!(f, "slot already holds {} items", MAX_ITEMS_PER_SLOT),
            AddItemError::DuplicateName => write!(f, "slot already holds an item with that name"),
            AddItemError::InvalidSlot => write!(f, "no such slot in the grid"),
        }
    }
}

impl std::error::Error for AddItemError {}

/// The 7×N week grid of meal slots, N = meal count. Owned by a single editing
/// session; all mutations are synchronous.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MenuGrid {
    meal_types: Vec<MealType>,
    slots: Vec<Vec<Vec<MenuItem>>>,
}

impl MenuGrid {
    /// An empty grid for the given meal count. The meal-type labels come from
    /// the fixed table; an out-of-range count gets the 4-meal default.
    pub fn new(meal_count: usize) -> Self {
        let meal_types = meal_types_for(meal_count);
        let slots = (0..WEEK_DAYS)
            .map(|_| (0..meal_types.len()).map(|_| Vec::new()).collect())
            .collect();
        MenuGrid { meal_types, slots }
    }

    /// Rebuilds a grid from persisted parts. Slot rows beyond the 7×N shape
    /// are discarded, missing ones come back empty.
    pub fn from_parts(meal_count: usize, meal_plan: Vec<Vec<Vec<MenuItem>>>) -> Self {
        let mut grid = MenuGrid::new(meal_count);
        for (day, meals) in meal_plan.into_iter().enumerate().take(WEEK_DAYS) {
            for (meal, items) in meals.into_iter().enumerate().take(grid.meal_types.len()) {
                grid.slots[day][meal] = items;
            }
        }
        grid
    }

    pub fn meal_count(&self) -> usize {
        self.meal_types.len()
    }

    pub fn meal_types(&self) -> &[MealType] {
        &self.meal_types
    }

    /// The items of one slot. `day` is 0..7 Monday-first, `meal` is 0..N.
    pub fn slot(&self, day: usize, meal: usize) -> &[MenuItem] {
        &self.slots[day][meal]
    }

    /// The persisted 7×N×items representation.
    pub fn meal_plan(&self) -> &Vec<Vec<Vec<MenuItem>>> {
        &self.slots
    }

    pub fn into_meal_plan(self) -> Vec<Vec<Vec<MenuItem>>> {
        self.slots
    }

    /// Appends an item to a slot. Refused without mutating when the
    /// coordinates are out of range, the slot is full, or the slot already
    /// holds an item with the same display name.
    pub fn add_item(&mut self, day: usize, meal: usize, item: MenuItem) -> Result<(), AddItemError> {
        let slot = self
            .slots
            .get_mut(day)
            .and_then(|meals| meals.get_mut(meal))
            .ok_or(AddItemError::InvalidSlot)?;
        if slot.len() >= MAX_ITEMS_PER_SLOT {
            return Err(AddItemError::SlotFull);
        }
        if slot.iter().any(|existing| existing.name == item.name) {
            return Err(AddItemError::DuplicateName);
        }
        slot.push(item);
        Ok(())
    }

    /// Removes an item by position. Out-of-range indices are a caller
    /// contract violation and yield `None` without mutating anything.
    pub fn remove_item(&mut self, day: usize, meal: usize, index: usize) -> Option<MenuItem> {
        let slot = self.slots.get_mut(day)?.get_mut(meal)?;
        if index < slot.len() {
            Some(slot.remove(index))
        } else {
            None
        }
    }

    /// Empties one slot.
    pub fn clear_slot(&mut self, day: usize, meal: usize) {
        self.slots[day][meal].clear();
    }

    /// Changes the meal count. This rebuilds the grid empty at the new shape:
    /// every existing item is discarded, including in slots that would still
    /// exist. Deliberate destructive reset, not a migration.
    pub fn resize(&mut self, meal_count: usize) {
        *self = MenuGrid::new(meal_count);
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().flatten().all(|slot| slot.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> MenuItem {
        MenuItem {
            name: name.to_string(),
            quantity: 1.0,
            source: MenuSource::Recipe { id: format!("id-{}", name) },
            nutrition: None,
        }
    }

    #[test]
    fn test_meal_types_table_is_exact() {
        use MealType::*;
        assert_eq!(meal_types_for(1), vec![Comida]);
        assert_eq!(meal_types_for(2), vec![Comida, Cena]);
        assert_eq!(meal_types_for(3), vec![Desayuno, Comida, Cena]);
        assert_eq!(meal_types_for(4), vec![Desayuno, Comida, Merienda, Cena]);
        assert_eq!(meal_types_for(5), vec![Desayuno, Almuerzo, Comida, Merienda, Cena]);
        assert_eq!(
            meal_types_for(6),
            vec![Desayuno, MediaManana, Almuerzo, Comida, Merienda, Cena]
        );
        // Out of range falls back to the 4-meal table.
        assert_eq!(meal_types_for(0), meal_types_for(4));
        assert_eq!(meal_types_for(7), meal_types_for(4));
    }

    #[test]
    fn test_new_grid_shape() {
        let grid = MenuGrid::new(3);
        assert_eq!(grid.meal_count(), 3);
        for day in 0..WEEK_DAYS {
            for meal in 0..3 {
                assert!(grid.slot(day, meal).is_empty());
            }
        }
    }

    #[test]
    fn test_add_item_enforces_capacity_and_unique_names() {
        let mut grid = MenuGrid::new(2);
        // 10 attempted adds cycling through 3 distinct names.
        let names = ["Lentejas", "Tortilla", "Gazpacho"];
        let mut accepted = 0;
        for attempt in 0..10 {
            if grid.add_item(0, 0, item(names[attempt % 3])).is_ok() {
                accepted += 1;
            }
        }
        let slot = grid.slot(0, 0);
        assert!(slot.len() <= MAX_ITEMS_PER_SLOT);
        assert_eq!(accepted, slot.len());
        // Only the 3 distinct names can be present.
        assert_eq!(slot.len(), 3);
        let mut seen: Vec<&str> = slot.iter().map(|i| i.name.as_str()).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), slot.len());
    }

    #[test]
    fn test_add_item_rejects_fifth_item() {
        let mut grid = MenuGrid::new(1);
        for name in ["a", "b", "c", "d"] {
            grid.add_item(0, 0, item(name)).unwrap();
        }
        assert_eq!(grid.add_item(0, 0, item("e")), Err(AddItemError::SlotFull));
        assert_eq!(grid.slot(0, 0).len(), 4);
    }

    #[test]
    fn test_add_item_rejects_out_of_range_coordinates() {
        let mut grid = MenuGrid::new(2);
        assert_eq!(grid.add_item(7, 0, item("a")), Err(AddItemError::InvalidSlot));
        assert_eq!(grid.add_item(0, 2, item("a")), Err(AddItemError::InvalidSlot));
        assert!(grid.is_empty());
    }

    #[test]
    fn test_duplicate_rejection_is_a_no_op() {
        let mut grid = MenuGrid::new(1);
        grid.add_item(2, 0, item("Paella")).unwrap();
        assert_eq!(grid.add_item(2, 0, item("Paella")), Err(AddItemError::DuplicateName));
        assert_eq!(grid.slot(2, 0).len(), 1);
    }

    #[test]
    fn test_remove_item_by_position() {
        let mut grid = MenuGrid::new(2);
        grid.add_item(1, 1, item("a")).unwrap();
        grid.add_item(1, 1, item("b")).unwrap();
        let removed = grid.remove_item(1, 1, 0).unwrap();
        assert_eq!(removed.name, "a");
        assert_eq!(grid.slot(1, 1).len(), 1);
        assert_eq!(grid.slot(1, 1)[0].name, "b");
        // Out of range: guarded, nothing happens.
        assert!(grid.remove_item(1, 1, 5).is_none());
        assert!(grid.remove_item(9, 0, 0).is_none());
    }

    #[test]
    fn test_resize_is_a_destructive_reset() {
        let mut grid = MenuGrid::new(4);
        grid.add_item(0, 0, item("Lentejas")).unwrap();
        grid.add_item(6, 3, item("Cena ligera")).unwrap();

        grid.resize(2);

        assert_eq!(grid.meal_count(), 2);
        assert_eq!(grid.meal_types(), &[MealType::Comida, MealType::Cena]);
        // Not a truncation: even slots that still exist are empty.
        assert!(grid.is_empty());
    }

    #[test]
    fn test_from_parts_round_trip() {
        let mut grid = MenuGrid::new(2);
        grid.add_item(3, 1, item("Crema de calabaza")).unwrap();
        let plan = grid.clone().into_meal_plan();
        let rebuilt = MenuGrid::from_parts(2, plan);
        assert_eq!(rebuilt.slot(3, 1)[0].name, "Crema de calabaza");
    }

    #[test]
    fn test_from_product_scales_nutrition_once() {
        use crate::nutrition::NutritionPer100;
        use crate::products::Product;

        let product = Product {
            code: "8400000000000".to_string(),
            name: "Yogur natural".to_string(),
            brand: None,
            quantity_label: Some("4 x 125 g".to_string()),
            nutrition: Some(NutritionPer100 { calories: 60.0, proteins: 4.0, ..Default::default() }),
        };
        let item = MenuItem::from_product(&product, 125.0);
        assert_eq!(item.quantity, 125.0);
        assert_eq!(item.source, MenuSource::Product);
        let totals = item.nutrition.unwrap();
        // 60 * 1.25 = 75, 4 * 1.25 = 5
        assert_eq!(totals.calories, 75.0);
        assert_eq!(totals.proteins, 5.0);
    }

    #[test]
    fn test_week_day_indices_are_monday_first() {
        assert_eq!(WeekDay::Lunes.index(), 0);
        assert_eq!(WeekDay::Domingo.index(), 6);
        assert_eq!(WeekDay::ALL.len(), WEEK_DAYS);
    }
}
