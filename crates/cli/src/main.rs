mod config;
mod wiring;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use orchestrator::{RunReport, StartupReport, TriggerOutcome};
use server::{create_router, state::AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{AppConfig, CONFIG_DIR, CONFIG_FILE};

#[derive(Parser)]
#[command(name = "geopush")]
#[command(about = "Locate, store, push and summarize", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Overrides `firebase.api_key` from the config file
    #[arg(long, env = "GEOPUSH_FIREBASE_API_KEY", global = true, hide_env_values = true)]
    firebase_api_key: Option<String>,

    /// Overrides `push.access_token` from the config file
    #[arg(long, env = "GEOPUSH_PUSH_ACCESS_TOKEN", global = true, hide_env_values = true)]
    push_access_token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default .geopush/config.toml
    Init,
    /// Register for push, then run the workflow
    Run {
        #[arg(short = 'n', long, default_value_t = 1)]
        times: u32,
    },
    /// Serve the HTTP API
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show the configuration in effect
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let overrides = (cli.firebase_api_key, cli.push_access_token);

    match cli.command {
        Some(Commands::Init) => init_project().await,
        Some(Commands::Run { times }) => run(times, overrides).await,
        Some(Commands::Serve { port }) => serve(port, overrides).await,
        Some(Commands::Status) => status(overrides).await,
        None => run(1, overrides).await,
    }
}

async fn load_config((api_key, access_token): (Option<String>, Option<String>)) -> Result<AppConfig> {
    let cwd = std::env::current_dir()?;
    let config = match AppConfig::read(&cwd).await? {
        Some(config) => config,
        None => {
            println!("No {}/{} found.", CONFIG_DIR, CONFIG_FILE);
            println!("Run 'geopush init' first, or using default configuration.");
            println!();
            AppConfig::default()
        }
    };
    Ok(config.with_overrides(api_key, access_token))
}

async fn init_project() -> Result<()> {
    let cwd = std::env::current_dir()?;
    let path = AppConfig::path(&cwd);

    if path.exists() {
        println!("Project already initialized at {}", path.display());
        return Ok(());
    }

    let path = AppConfig::default().write(&cwd).await?;

    println!();
    println!("Initialized geopush in {}", cwd.display());
    println!();
    println!("Created:");
    println!("  {}/", CONFIG_DIR);
    println!("  └── {}", CONFIG_FILE);
    println!();
    println!("Next steps:");
    println!("  1. Set firebase.project_id and push.project_id in {}", path.display());
    println!("  2. Set device.native_token to the FCM/APNs token of the device");
    println!("  3. Run 'geopush run'");

    Ok(())
}

async fn run(times: u32, overrides: (Option<String>, Option<String>)) -> Result<()> {
    let config = load_config(overrides).await?;
    init_tracing();

    let app = wiring::build(&config)?;

    print_startup(&app.orchestrator.register_push().await);

    for i in 1..=times {
        if times > 1 {
            println!("{}", format!("Run {}/{}", i, times).dimmed());
        }
        match app.orchestrator.trigger().await {
            TriggerOutcome::Completed(report) => print_report(&report),
            TriggerOutcome::Ignored => println!("{}", "Run ignored, another run is in progress".yellow()),
        }
    }

    Ok(())
}

async fn serve(port: Option<u16>, overrides: (Option<String>, Option<String>)) -> Result<()> {
    let config = load_config(overrides).await?;
    init_tracing();

    let port = port.unwrap_or(config.server.port);
    let app = wiring::build(&config)?;

    print_startup(&app.orchestrator.register_push().await);

    let state = AppState::new(app.orchestrator.clone(), app.event_bus.clone())
        .with_notifier(app.notifier.clone());
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    println!();
    println!("geopush");
    println!("════════════════════════════════════════");
    println!();
    println!("  API Server:  http://localhost:{}", port);
    println!("  Swagger UI:  http://localhost:{}/swagger-ui", port);
    println!("  Trigger:     POST http://localhost:{}/api/workflow/run", port);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    axum::serve(listener, router).await?;

    Ok(())
}

async fn status(overrides: (Option<String>, Option<String>)) -> Result<()> {
    let config = load_config(overrides).await?;
    let cwd = std::env::current_dir()?;

    println!();
    println!("Path:       {}", cwd.display());
    println!("Firebase:   {} ({})", config.firebase.project_id, config.firebase.collection);
    println!(
        "API key:    {}",
        if config.firebase.api_key.is_some() { "set" } else { "not set" }
    );
    println!(
        "Push:       {} (project {})",
        config.push.relay_url,
        config.push.project_id.as_deref().unwrap_or("missing")
    );
    println!(
        "Device:     {} ({})",
        config.device.platform.as_str(),
        if config.device.is_physical { "physical" } else { "simulator" }
    );
    println!("Location:   {:?}", config.location.provider);
    println!("Triggers:   {:?}", config.workflow.trigger_policy);
    println!("Port:       {}", config.server.port);
    println!();

    Ok(())
}

fn print_startup(report: &StartupReport) {
    match report {
        StartupReport::Registered { token } => {
            println!("{} {}", "Push token:".green(), token);
        }
        StartupReport::Failed { .. } => {
            if let Some((title, message)) = report.alert() {
                println!("{} {}", format!("{}:", title).red().bold(), message);
            }
        }
    }
}

fn print_report(report: &RunReport) {
    match &report.location {
        Some(c) => println!("  location   {}", c),
        None => println!(
            "  location   {} ({})",
            "fallback".yellow(),
            report.location_error.as_deref().unwrap_or("unavailable")
        ),
    }
    match (&report.document_id, &report.store_error) {
        (Some(id), _) => println!("  firestore  {} {}", "ok".green(), id),
        (None, Some(e)) => println!("  firestore  {} {}", "failed".red(), e),
        (None, None) => println!("  firestore  {}", "failed".red()),
    }
    match &report.relay_error {
        None => println!("  push       {}", "ok".green()),
        Some(e) => println!("  push       {} {}", "failed".red(), e),
    }
    if !report.summary_shown {
        println!("{}", report.summary_text);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "geopush=info,orchestrator=info,server=info,tower_http=info".into()
            }),
        )
        .init();
}
