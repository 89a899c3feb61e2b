//! # tryon
//!
//! Command-line driver for the try-on session engine. Runs one session
//! against the simulated platform, prints the status and view the web page
//! would render, then tears the session down.
//!
//! ## Usage
//! ```text
//! tryon run --product featured
//! tryon run --product p1 --catalog products.json --scenario camera-denied
//! tryon scenarios
//! tryon init-config
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tryon_core::{Locale, Product, SessionState, TryOnTarget, TryOnView};
use tryon_session::{
    resolve_target, MemoryStore, RenderSurface, SessionStatus, SimPlatform, SimScenario,
    TryOnConfig, TryOnController,
};

#[derive(Debug, Parser)]
#[command(name = "tryon", version, about = "AR try-on session driver")]
struct Cli {
    /// Config file (defaults to the platform config dir's tryon.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one session lifecycle and print the result
    Run(RunArgs),
    /// List the simulated platform scenarios
    Scenarios,
    /// Write the default configuration file
    InitConfig,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Product id, or "featured" for generic try-on
    #[arg(long, default_value = "featured")]
    product: String,

    /// Scripted platform behavior
    #[arg(long, default_value = "ok")]
    scenario: SimScenario,

    /// JSON file holding an array of products
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Message language (es, en)
    #[arg(long)]
    locale: Option<Locale>,

    /// AR runtime API token
    #[arg(long)]
    api_token: Option<String>,

    /// Keep the session streaming this long before teardown
    #[arg(long, default_value_t = 0)]
    hold_ms: u64,
}

/// What a run prints.
#[derive(Serialize)]
struct RunReport {
    status: SessionStatus,
    view: TryOnView,
    platform_calls: Vec<&'static str>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(cli.config, args).await,
        Command::Scenarios => {
            for scenario in SimScenario::ALL {
                println!("{}", scenario);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::InitConfig => init_config(cli.config),
    }
}

/// Initializes the tracing subscriber.
///
/// Uses `RUST_LOG` when set, otherwise info with debug for the engine.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tryon=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(config_path: Option<PathBuf>, args: RunArgs) -> Result<ExitCode> {
    let mut config = TryOnConfig::load(config_path).context("Failed to load configuration")?;
    if let Some(token) = args.api_token {
        config.runtime.api_token = token;
    }
    if let Some(locale) = args.locale {
        config.session.locale = locale;
    }
    config.validate()?;

    let store = match &args.catalog {
        Some(path) => load_catalog(path)?,
        None => MemoryStore::new(),
    };

    let target = resolve_target(&store, TryOnTarget::from_route(Some(&args.product))).await;
    let surface = RenderSurface::new(
        "ar-canvas",
        config.camera.ideal_width,
        config.camera.ideal_height,
    );

    let sim = SimPlatform::new(args.scenario);
    let mut controller =
        TryOnController::new(Arc::new(config), sim.platform(), target, surface);

    info!(
        session_id = %controller.id(),
        target = %controller.target().target,
        scenario = %args.scenario,
        "Running try-on session"
    );

    let state = controller.initialize().await;

    let report = RunReport {
        status: controller.status(),
        view: controller.view(),
        platform_calls: sim.calls().events,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    // Leaving the view: fire the unmount signal once the hold elapses.
    let unmount = controller.cancel_handle();
    let hold = Duration::from_millis(args.hold_ms);
    tokio::spawn(async move {
        tokio::time::sleep(hold).await;
        unmount.cancel();
    });
    controller.dispose_on_cancel().await;

    let calls = sim.calls();
    if calls.streams_live() > 0 || calls.sessions_live() > 0 {
        bail!(
            "teardown leaked handles: {} stream(s), {} render session(s)",
            calls.streams_live(),
            calls.sessions_live()
        );
    }
    info!(state = %controller.state(), "Session torn down");

    Ok(match state {
        SessionState::Streaming => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

fn load_catalog(path: &Path) -> Result<MemoryStore> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let products: Vec<Product> = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid catalog {}", path.display()))?;

    let unnamed = products.iter().filter(|p| p.id.is_empty()).count();
    if unnamed > 0 {
        warn!(count = unnamed, "Catalog entries without an id will never resolve");
    }
    info!(products = products.len(), "Loaded product catalog");

    Ok(MemoryStore::from_products(&products)?)
}

fn init_config(config_path: Option<PathBuf>) -> Result<ExitCode> {
    let path = config_path
        .or_else(TryOnConfig::default_config_path)
        .context("No config directory available on this platform")?;

    TryOnConfig::default().save(Some(path.clone()))?;
    println!("{}", path.display());
    Ok(ExitCode::SUCCESS)
}
