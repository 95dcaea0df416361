//! Kindling CLI
//!
//! Render the todo app headlessly, replay scripted interactions against the
//! in-memory tree, and print the resulting markup.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kindling_core::prelude::*;
use kindling_todo::{mount_todo_app, MemoryTodoStore};
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

use config::KindlingConfig;

#[derive(Parser)]
#[command(name = "kindling")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Kindling todo app renderer", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file
    #[arg(short, long, global = true, default_value = "kindling.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mount the todo app and print the rendered markup
    Render {
        /// Mount target id (defaults to the configured one)
        #[arg(short, long)]
        target: Option<String>,

        /// Type TEXT into the item creator and press Enter (repeatable)
        #[arg(long, value_name = "TEXT")]
        add: Vec<String>,

        /// Click the item at INDEX, after all additions (repeatable)
        #[arg(long, value_name = "INDEX")]
        toggle: Vec<usize>,

        /// Print runtime statistics after rendering
        #[arg(long)]
        stats: bool,
    },

    /// Print the resolved configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = KindlingConfig::load(&cli.config)?;

    match cli.command {
        Commands::Render {
            target,
            add,
            toggle,
            stats,
        } => cmd_render(&config, target, &add, &toggle, stats),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn cmd_render(
    config: &KindlingConfig,
    target: Option<String>,
    add: &[String],
    toggle: &[usize],
    stats: bool,
) -> Result<()> {
    let store = MemoryTodoStore::with_items(config.seed_items());
    let runtime = RenderRuntime::new(config.runtime_config());

    let mut document = MemoryDocument::new();
    let root = document.insert(config.app.mount_target.as_str());
    let target = target.unwrap_or_else(|| config.app.mount_target.clone());

    mount_todo_app(&runtime, &document, &target, Rc::new(store.clone()))
        .context("Initial render failed")?;

    if !runtime.is_mounted() {
        warn!(mount_target = %target, "nothing rendered");
        return Ok(());
    }
    info!(items = store.len(), "todo app mounted");

    for text in add {
        let event = Event::key_up("Enter", text.as_str());
        if !root.dispatch("TodoListItemCreator", 0, &event) {
            warn!("item creator not found");
        }
    }
    for &index in toggle {
        if !root.dispatch("TodoListItem", index, &Event::click()) {
            warn!(index, "no todo item at index");
        }
    }

    println!("{}", root.markup());

    if stats {
        let stats = runtime.stats();
        println!();
        println!("passes:          {}", stats.passes);
        println!("state cells:     {}", stats.state_cells);
        println!("effect records:  {}", stats.effect_records);
        println!("phase:           {:?}", stats.phase);
    }

    Ok(())
}
