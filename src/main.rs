use anyhow::{Context, Result};
use chrono::Local;
use std::path::Path;
use tokio::fs;

use planifica_menu::catalog::{load_nutrition_table, parse_catalog, resolve_ingredient_nutrition};
use planifica_menu::cli::parse_args;
use planifica_menu::menu::{
    default_menu_name, generate_random_menu, week_of, NewWeeklyMenu, ThreadRandom, WeekDay,
};
use planifica_menu::nutrition::{day_nutrition, week_nutrition, NutritionTotals};

fn print_totals(label: &str, totals: &NutritionTotals) {
    if totals.is_empty() {
        println!("{}: sin datos nutricionales", label);
        return;
    }
    println!(
        "{}: {:.0} kcal | P {:.1} g | HC {:.1} g | G {:.1} g | Fibra {:.1} g | Sodio {:.2} g",
        label, totals.calories, totals.proteins, totals.carbohydrates, totals.fats, totals.fiber,
        totals.sodium
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    let cli_args = parse_args();

    let catalog_content = fs::read_to_string(&cli_args.catalog)
        .await
        .with_context(|| format!("Failed to read catalog file '{}'", cli_args.catalog))?;
    let mut catalog = parse_catalog(&catalog_content)
        .with_context(|| format!("Invalid catalog in '{}'", cli_args.catalog))?;
    println!("Loaded {} recipes from {}", catalog.len(), cli_args.catalog);

    if let Some(csv_path) = &cli_args.nutrition_csv {
        let table = load_nutrition_table(Path::new(csv_path))
            .with_context(|| format!("Failed to load nutrition table '{}'", csv_path))?;
        println!("Loaded nutrition data for {} ingredients from {}", table.len(), csv_path);
        resolve_ingredient_nutrition(&mut catalog, &table);
    }

    let mut rng = ThreadRandom;
    let grid = generate_random_menu(&catalog, cli_args.meals, &mut rng);

    let today = Local::now().date_naive();
    let (year, week) = week_of(today);
    let name = cli_args.name.unwrap_or_else(|| default_menu_name(today));

    println!("\n{} (semana {} de {})\n", name, week, year);
    for week_day in WeekDay::ALL {
        let day = week_day.index();
        println!("{}:", week_day);
        for (meal, meal_type) in grid.meal_types().iter().enumerate() {
            let items = grid.slot(day, meal);
            if items.is_empty() {
                println!("  {:<14} -", meal_type.label());
            } else {
                let names: Vec<&str> = items.iter().map(|item| item.name.as_str()).collect();
                println!("  {:<14} {}", meal_type.label(), names.join(", "));
            }
        }
        print_totals("  Total día", &day_nutrition(&grid, day));
    }

    println!();
    print_totals("Total semana", &week_nutrition(&grid));

    // The saved aggregate, printed instead of persisted: storing it needs a
    // signed-in RestStore session.
    let menu = NewWeeklyMenu::from_grid(name, year, week, grid);
    println!(
        "\nMenú listo para guardar: {} ({} comidas/día)",
        menu.name, menu.meal_count
    );

    Ok(())
}
