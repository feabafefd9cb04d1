mod cook;
mod parse;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sous_core::{AgentRegistry, AiConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "sous")]
#[command(about = "Generate recipes from the ingredients you have", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the two-stage workflow and print the recipe as JSON
    Cook {
        /// Ingredient on hand (repeatable)
        #[arg(short, long = "ingredient")]
        ingredients: Vec<String>,
        /// Desired taste, e.g. "微辣"
        #[arg(short, long)]
        taste: Option<String>,
        /// Number of servings (1-12)
        #[arg(short, long)]
        servings: Option<u32>,
        /// Dietary restrictions or preferences
        #[arg(long)]
        dietary_notes: Option<String>,
        /// Read the request from a JSON file instead of flags
        #[arg(long, conflicts_with_all = ["ingredients", "taste", "servings", "dietary_notes"])]
        request: Option<PathBuf>,
        /// Agent for ingredient analysis (overrides SOUS_INGREDIENT_AGENT)
        #[arg(long)]
        ingredient_agent: Option<String>,
        /// Agent for recipe crafting (overrides SOUS_RECIPE_AGENT)
        #[arg(long)]
        recipe_agent: Option<String>,
        /// Per-stage timeout in seconds (overrides SOUS_STAGE_TIMEOUT_SECS)
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Print the ingredient plan and stage timings along with the recipe
        #[arg(long)]
        show_plan: bool,
    },
    /// Extract and parse JSON from saved model output
    Parse {
        /// File containing the model's raw response
        file: PathBuf,
        /// Also validate against a schema
        #[arg(long, value_enum)]
        schema: Option<parse::Schema>,
    },
    /// List the configured agents and their models
    Agents,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Cook {
            ingredients,
            taste,
            servings,
            dietary_notes,
            request,
            ingredient_agent,
            recipe_agent,
            timeout_secs,
            show_plan,
        } => {
            let request = match request {
                Some(path) => cook::RequestSource::File(path),
                None => cook::RequestSource::Flags {
                    ingredients,
                    taste,
                    servings,
                    dietary_notes,
                },
            };
            let overrides = cook::Overrides {
                ingredient_agent,
                recipe_agent,
                timeout_secs,
            };
            cook::cook(request, overrides, show_plan).await?;
        }
        Commands::Parse { file, schema } => {
            parse::parse(&file, schema)?;
        }
        Commands::Agents => {
            list_agents()?;
        }
    }

    Ok(())
}

fn list_agents() -> Result<()> {
    let config = AiConfig::from_env()?;
    let registry = AgentRegistry::from_config(&config)?;

    for agent in registry.agents() {
        println!(
            "{}\t{}\t{}/{}",
            agent.name(),
            agent.display_name(),
            agent.provider_name(),
            agent.model_name()
        );
    }

    Ok(())
}
