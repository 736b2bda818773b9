use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the recipe catalog JSON file
    #[arg(short, long)]
    pub catalog: String,

    /// Optional CSV with per-100g nutrition for ingredients that lack inline values
    #[arg(short, long)]
    pub nutrition_csv: Option<String>,

    /// Meals per day (1-6; anything else falls back to 4)
    #[arg(short, long, default_value_t = 4)]
    pub meals: usize,

    /// Menu name; defaults to the current week's standard name
    #[arg(long)]
    pub name: Option<String>,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
