use std::env;
use std::process::ExitCode;

use dessert_browser::{
    reduce, Action, AppConfig, CoreError, IngredientFetchState, RecipeBrowser,
};
use log::error;

/// Headless driver: load the bundle, apply a query, and show the ingredients
/// of the first match.
///
/// Usage: dessert-browser [QUERY] [--ingredients]
#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let with_ingredients = args.iter().any(|a| a == "--ingredients");
    let query = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .cloned()
        .unwrap_or_default();

    let browser = match AppConfig::load()
        .map_err(CoreError::from)
        .and_then(RecipeBrowser::new)
    {
        Ok(browser) => browser,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = browser.start().await {
        error!("Error loading recipes: {}", e);
        return ExitCode::FAILURE;
    }

    let recipes = browser.recipes();
    let vm = reduce(&browser.view_model(), &recipes, Action::QueryChanged(query));

    for recipe in &vm.search.filtered {
        let video = if recipe.has_video() { " [video]" } else { "" };
        println!("{} ({}){}", recipe.name, recipe.cuisine, video);
    }
    if !vm.search.suggestions.is_empty() {
        println!("\nSuggestions: {}", vm.search.suggestions.join(", "));
    }

    if with_ingredients {
        let Some(recipe) = vm.search.filtered.first() else {
            return ExitCode::SUCCESS;
        };
        match browser.open_detail(recipe) {
            Some(mut task) => match task.settled().await {
                IngredientFetchState::Loaded(text) => println!("\nIngredients:\n{}", text),
                state => {
                    error!("Ingredients unavailable for {}: {:?}", recipe.name, state);
                    return ExitCode::FAILURE;
                }
            },
            None => println!("\n{} has no source to fetch ingredients from", recipe.name),
        }
    }

    ExitCode::SUCCESS
}
