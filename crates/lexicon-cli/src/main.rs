mod serve;
mod tui;

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lexicon_core::config::LoggingConfig;
use lexicon_core::llm::{Provider, LLM};
use lexicon_core::{
    normalize_label, AdminError, CacheLoader, Classifier, Config, FileSnapshotStore, GraphStore,
    HttpGraphSource, LlmClassifier, LoadReport, Provenance, RootOnly, TermAdmin, View,
};

#[derive(Parser)]
#[command(name = "lexicon")]
#[command(about = "Browse, serve and edit a taxonomy of knowledge terms", long_about = None)]
struct Cli {
    /// Base URL of the taxonomy server (overrides config)
    #[arg(long, global = true)]
    remote: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the taxonomy API from a local catalog
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Path to the catalog document
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Print the parent, siblings and children of a term
    Show {
        /// Term to show (defaults to the root)
        label: Option<String>,
    },
    /// Add a term; the server chooses its parent
    Add {
        #[arg(required = true)]
        label: Vec<String>,
    },
    /// Delete a term and everything under it
    Delete {
        #[arg(required = true)]
        label: Vec<String>,
    },
    /// Browse the taxonomy in the terminal
    Browse {
        /// Term to start from (defaults to the root)
        label: Option<String>,
    },
    /// Print the default configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(url) = cli.remote {
        config.remote.base_url = url;
    }

    // The browser owns the terminal, so its logs go to a file.
    let log_file = matches!(cli.command, Commands::Browse { .. })
        .then(|| PathBuf::from(&config.cache.data_dir).join("lexicon.log"));
    init_tracing(&config.logging, log_file)?;

    match cli.command {
        Commands::Serve { port, catalog } => {
            let mut serve_config = serve::ServeConfig::from_config(&config);
            if let Some(port) = port {
                serve_config.port = port;
            }
            if let Some(path) = catalog {
                serve_config.catalog_path = path;
            }
            serve::start_server(serve_config, build_classifier(&config)).await?;
        }
        Commands::Show { label } => {
            let loader = open_loader(&config, label.as_deref());
            let report = loader.ensure_loaded().await;
            let store = loader.store();

            if let Some(label) = &label {
                if store.find_by_label(label).is_none() && !store.is_empty() {
                    eprintln!("Unknown term: {}", normalize_label(label));
                    std::process::exit(1);
                }
            }

            match store.view() {
                Some(view) => print_view(&view, &report),
                None => {
                    eprintln!("No taxonomy available: the server is unreachable and there is no local snapshot.");
                    std::process::exit(1);
                }
            }
        }
        Commands::Add { label } => {
            let label = label.join(" ");
            let loader = open_loader(&config, None);
            loader.ensure_loaded().await;

            match TermAdmin::new(loader).add(&label).await {
                Ok(added) => {
                    let how = match added.provenance {
                        Provenance::Llm => "chosen by classifier",
                        Provenance::Default => "default placement",
                    };
                    println!("Added {} under {} ({})", added.term.label, added.parent, how);
                }
                Err(AdminError::Conflict(existing)) => {
                    eprintln!("{} already exists", existing);
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Failed to add {}: {}", normalize_label(&label), e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Delete { label } => {
            let label = label.join(" ");
            let loader = open_loader(&config, None);
            loader.ensure_loaded().await;

            match TermAdmin::new(loader).delete_label(&label).await {
                Ok(()) => println!("Deleted {} and its subtree", normalize_label(&label)),
                Err(e) => {
                    eprintln!("Failed to delete {}: {}", normalize_label(&label), e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Browse { label } => {
            let loader = open_loader(&config, label.as_deref());
            tui::run(loader, config.navigation.clone()).await?;
        }
        Commands::Config => {
            print!("{}", Config::default_config_string());
        }
    }

    Ok(())
}

/// Wires a cache loader to the configured server and snapshot file.
fn open_loader(config: &Config, initial_label: Option<&str>) -> Arc<CacheLoader> {
    let store = Arc::new(GraphStore::new());
    let source = Arc::new(HttpGraphSource::with_config(config.remote.clone()));
    let snapshots = Box::new(FileSnapshotStore::with_config(&config.cache));

    let mut loader = CacheLoader::new(store, source, snapshots);
    if let Some(label) = initial_label {
        loader = loader.with_initial_label(label);
    }
    Arc::new(loader)
}

/// The configured LLM classifier, or root-only placement when no model is
/// usable.
fn build_classifier(config: &Config) -> Box<dyn Classifier> {
    let llm = &config.llm;
    match Provider::from_config(llm).and_then(|provider| provider.build(llm.max_tokens)) {
        Ok(client) => {
            tracing::info!(provider = %llm.provider, model = client.model(), "term placement via LLM");
            Box::new(LlmClassifier::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "no LLM available, new terms go under the root");
            Box::new(RootOnly)
        }
    }
}

fn print_view(view: &View, report: &LoadReport) {
    let join = |terms: &[lexicon_core::Term]| {
        terms
            .iter()
            .map(|t| {
                if t.id == view.selected.id {
                    format!("[{}]", t.label)
                } else {
                    t.label.clone()
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("{}", view.selected.label);
    println!(
        "  Parent:   {}",
        view.parent.as_ref().map_or("-", |p| p.label.as_str())
    );
    println!("  Siblings: {}", join(&view.siblings));
    if view.children.is_empty() {
        println!("  Children: -");
    } else {
        println!("  Children: {}", join(&view.children));
    }

    if report.from_snapshot && !report.refreshed {
        println!("\n(cached copy; the server could not be reached)");
    }
}

fn init_tracing(
    logging: &LoggingConfig,
    log_file: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            let writer = Mutex::new(file);
            if logging.json {
                registry.with(fmt::layer().json().with_writer(writer)).init();
            } else {
                registry
                    .with(fmt::layer().with_ansi(false).with_writer(writer))
                    .init();
            }
        }
        None if logging.json => {
            registry
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        None => {
            registry.with(fmt::layer().with_writer(std::io::stderr)).init();
        }
    }

    Ok(())
}
