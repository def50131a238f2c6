use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use navtree_engine::{NavigationTreeBuilder, Sidebar};
use navtree_util::preferences::SidebarPreferences;
use tracing::warn;

mod fixture;
mod render;

use fixture::{Fixture, FixtureSources};

#[derive(Parser, Debug)]
#[command(name = "navtree", version, about = "Compose and inspect the cluster sidebar navigation tree")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the navigation tree described by a fixture file
    Build {
        /// YAML or JSON fixture listing permissions, menus, pages and CRDs
        fixture: PathBuf,
        /// Location path; overrides the fixture's location
        #[arg(long)]
        location: Option<String>,
        /// Selected namespace; may be repeated
        #[arg(long = "namespace")]
        namespaces: Vec<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Outline)]
        format: OutputFormat,
        /// Wait for the custom resource catalog before printing
        #[arg(long)]
        wait_crds: bool,
    },
    /// Pin or unpin the sidebar and print the new state
    Toggle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Outline,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Build {
            fixture,
            location,
            namespaces,
            format,
            wait_crds,
        } => run_build(fixture, location, namespaces, format, wait_crds).await,
        Command::Toggle => run_toggle(),
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_preferences() -> Arc<SidebarPreferences> {
    match SidebarPreferences::new() {
        Ok(preferences) => Arc::new(preferences),
        Err(error) => {
            warn!(error = %error, "sidebar preferences unavailable; using defaults");
            Arc::new(SidebarPreferences::ephemeral())
        }
    }
}

async fn run_build(
    path: PathBuf,
    location: Option<String>,
    namespaces: Vec<String>,
    format: OutputFormat,
    wait_crds: bool,
) -> Result<()> {
    let fixture = Fixture::load(&path)?;
    let location = location.or_else(|| fixture.location.clone()).unwrap_or_else(|| "/".to_string());
    let namespaces = if namespaces.is_empty() {
        fixture.namespaces.clone()
    } else {
        namespaces
    };
    let FixtureSources { sources, crds } = fixture.into_sources()?;

    let mut sidebar = Sidebar::new(NavigationTreeBuilder::new(sources), load_preferences());
    sidebar.set_namespaces(namespaces);
    let mut items = sidebar.set_location(location);
    if wait_crds {
        crds.settled().await;
        items = sidebar.rebuild();
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items.as_ref()).context("serializing navigation tree")?);
        }
        OutputFormat::Outline => print!("{}", render::outline(&items, sidebar.is_pinned())),
    }
    Ok(())
}

fn run_toggle() -> Result<()> {
    let preferences = SidebarPreferences::new().context("opening sidebar preferences")?;
    let pinned = preferences.toggle_pinned().context("saving sidebar preferences")?;
    println!("sidebar {}", if pinned { "pinned" } else { "unpinned" });
    Ok(())
}
