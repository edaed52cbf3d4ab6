//! Config Editor CLI
//!
//! Command-line interface over the configuration editor core.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use config_editor::{
    load_config, Config, ConfigEditor, ConfigEditorError, LinkBuilder, RowAction, SchemaRegistry,
    TableMaterializer, TextTable, ViewRouter,
};
use tracing::Level;

#[derive(Parser)]
#[command(name = "config-editor")]
#[command(about = "Schema-driven editor for monitoring configuration")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API base URL (overrides config file)
    #[arg(long)]
    base_url: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the registered kinds
    Kinds,
    /// Print the descriptor of a kind
    Describe { kind: String },
    /// Resolve a navigation token to a view
    Resolve { token: String },
    /// Print the action links of a row, given as a JSON object
    Links { token: String, row: String },
    /// Fetch and print the table of a view
    List { token: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, base_url={:?}, log_level={:?}",
        args.config,
        args.base_url,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(base_url) = args.base_url {
        config.api.base_url = base_url;
    }

    match args.command {
        Command::Kinds => {
            let registry = SchemaRegistry::from_config(&config.schema)?;
            for descriptor in registry.descriptors() {
                println!("{:<16} {}", descriptor.id, descriptor.plural_display_name);
            }
        }
        Command::Describe { kind } => {
            let registry = SchemaRegistry::from_config(&config.schema)?;
            let descriptor = registry.describe(&kind)?;
            println!("{}", serde_json::to_string_pretty(descriptor.as_ref())?);
        }
        Command::Resolve { token } => {
            let router = ViewRouter::new(Arc::new(SchemaRegistry::from_config(&config.schema)?));
            let target = router.resolve(&token)?;
            println!("{}", serde_json::to_string_pretty(&target)?);
        }
        Command::Links { token, row } => {
            let registry = Arc::new(SchemaRegistry::from_config(&config.schema)?);
            let target = ViewRouter::new(Arc::clone(&registry)).resolve(&token)?;
            let materializer =
                TableMaterializer::new(registry, LinkBuilder::new(&config.api.base_url));
            let view = materializer.build_view(&target.kind, target.is_template)?;

            let row: serde_json::Value = serde_json::from_str(&row)?;
            let row = row.as_object().ok_or_else(|| {
                ConfigEditorError::InvalidRecord("row is not a JSON object".to_string())
            })?;
            let links = materializer.row_links(&view, row).ok_or_else(|| {
                ConfigEditorError::InvalidRecord(format!(
                    "row has no '{}' value",
                    view.identity_column()
                ))
            })?;

            println!("{:<9} {}", "Create", view.create_url);
            for action in [RowAction::Edit, RowAction::AdvancedEdit, RowAction::Delete] {
                println!("{:<9} {}", action.label(), links.get(action));
            }
        }
        Command::List { token } => {
            let mut editor = ConfigEditor::from_config(&config, TextTable::default())?;
            editor.on_navigate(&token).await?;
            print!("{}", editor.widget());
        }
    }

    Ok(())
}
