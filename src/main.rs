use clap::Parser;
use std::io::{self, BufRead, Write};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tripflow::{config::Config, pipeline::TripPlanner};

/// AI trip-planning assistant.
#[derive(Parser, Debug)]
#[command(name = "tripflow", version, about)]
struct Cli {
    /// Trip query; when omitted the query is prompted for interactively
    #[arg(short, long)]
    query: Option<String>,

    /// Directory for the generated artifacts (overrides TRIPFLOW_OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tripflow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_env()?;
    if let Some(dir) = cli.output_dir {
        config.output.dir = dir;
    }
    info!(provider = %config.llm.default_provider, model = %config.llm.default_model, "Configuration loaded");

    println!("\n=== Welcome to AI Trip Planner ===\n");

    let query = match cli.query {
        Some(query) => query,
        None => prompt_for_query()?,
    };
    if query.trim().is_empty() {
        anyhow::bail!("No trip query provided");
    }

    println!("\nProcessing your trip request: {}\n", query);

    let mut planner = TripPlanner::from_config(&config)?;
    planner.run(query.trim()).await?;

    println!("\n=== Flow Complete ===");
    println!("Your personalized trip plan is ready!");
    println!("Check the {} directory for all generated files.", config.output.dir);

    Ok(())
}

fn prompt_for_query() -> anyhow::Result<String> {
    print!("Enter your trip query (destination, dates, budget, interests, etc.): ");
    io::stdout().flush()?;

    let mut query = String::new();
    io::stdin().lock().read_line(&mut query)?;
    Ok(query.trim().to_string())
}
