// ABOUTME: Entry point for the surgesense binary.
// ABOUTME: Parses CLI arguments, initializes tracing, and runs the server or the generator.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use surge_agent::{
    CalendarClient, EnvironmentClient, LanguageModel, OpenAiCompatModel, SurgeAgent,
    build_registry,
};
use surge_server::{AppState, SurgeConfig, create_router};
use surge_store::{SnapshotGenerator, SnapshotStore};

#[derive(Parser)]
#[command(name = "surgesense", about = "Hospital surge-risk assessment agent")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API with the synthetic generator in-process (default).
    Serve,
    /// Run only the synthetic snapshot generator.
    Generate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "surgesense=debug,tower_http=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Generate => generate().await,
    }
}

async fn serve() -> anyhow::Result<()> {
    let config = SurgeConfig::from_env().context("loading server configuration")?;
    let model = OpenAiCompatModel::from_env().context("configuring language model")?;

    tracing::info!(model = model.model_name(), "surgesense starting up");

    let store = SnapshotStore::new(config.data_file.clone());
    let environment = Arc::new(EnvironmentClient::new(config.aqicn_token.clone()));
    let calendar = Arc::new(CalendarClient::new(
        config.calendarific_api_key.clone(),
        config.country_code.as_str(),
    ));

    let registry = build_registry(store.clone(), environment, calendar);
    let agent = SurgeAgent::new(Arc::new(model), registry).with_max_steps(config.max_steps);

    // The generator ticks on its own timer, outside the request path.
    let generator = SnapshotGenerator::new(store);
    tokio::spawn(generator.run(Duration::from_secs(config.generator_interval_secs)));

    let state = Arc::new(AppState::new(Arc::new(agent)));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    tracing::info!(addr = %config.bind, "listening");

    axum::serve(listener, app).await.context("serving HTTP")?;

    Ok(())
}

async fn generate() -> anyhow::Result<()> {
    let config = SurgeConfig::from_env().context("loading configuration")?;
    tracing::info!(data_file = %config.data_file.display(), "running generator only");

    let generator = SnapshotGenerator::new(SnapshotStore::new(config.data_file));
    generator
        .run(Duration::from_secs(config.generator_interval_secs))
        .await;
    Ok(())
}
