//! `stocktake` command-line binary.
//!
//! Reads `stocktake.toml` (or the path specified with `--config`), opens the
//! SQLite store and runs one ledger operation per invocation. Logs go to
//! stderr; results go to stdout, as JSON when `--json` is given.

mod output;
mod settings;

use std::{path::PathBuf, process::ExitCode};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use stocktake_core::{
  component::{ComponentId, NewComponent},
  history,
  quantity::Quantity,
  search::{self, SearchField, SearchPlan},
  store::InventoryStore,
};
use stocktake_import::import_file;
use stocktake_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{
  output::Output,
  settings::{Settings, expand_tilde},
};

#[derive(Parser)]
#[command(author, version, about = "Inventory ledger for electronic components")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, global = true, default_value = "stocktake.toml")]
  config: PathBuf,

  /// SQLite database to use instead of the configured `store_path`.
  #[arg(long, global = true)]
  store: Option<PathBuf>,

  /// Print results as JSON.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Add a new component.
  Add(AddArgs),

  /// Remove every component with the given name, or one by id.
  Remove {
    #[command(flatten)]
    target: Target,
  },

  /// Set the quantity of every component with the given name, or one by id.
  Update {
    #[command(flatten)]
    target:   Target,
    /// New stock count.
    #[arg(short, long, allow_negative_numbers = true)]
    quantity: Quantity,
  },

  /// List all components in id order.
  List,

  /// Show the history of a component, most recent first.
  History { id: i64 },

  /// Find components by keyword.
  Search {
    keyword: String,
    /// Query only this field instead of falling back across fields.
    #[arg(long)]
    field:   Option<SearchField>,
    /// Try an exact id match before the other fields.
    #[arg(long, conflicts_with = "field")]
    with_id: bool,
  },

  /// Reconcile a CSV batch into the store. Writes a template if the file
  /// does not exist.
  Import {
    /// Defaults to the configured `import_path`.
    path: Option<PathBuf>,
  },

  /// Replay a component's history and compare it with its stored quantity.
  Audit { id: i64 },
}

#[derive(Args)]
struct AddArgs {
  name:     String,
  #[arg(allow_negative_numbers = true)]
  quantity: Quantity,
  #[arg(short, long)]
  location: Option<String>,
  #[arg(short = 'k', long)]
  category: Option<String>,
  #[arg(short, long)]
  value:    Option<String>,
}

/// Which components a by-name or by-id command affects.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct Target {
  /// Exact component name. Every component with this name is affected.
  name: Option<String>,
  /// A single component id.
  #[arg(long)]
  id:   Option<i64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  let store_path = cli
    .store
    .as_deref()
    .map_or_else(|| settings.store_path.clone(), expand_tilde);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  run(&store, &settings, cli.command, Output { json: cli.json }).await
}

async fn run(
  store: &SqliteStore,
  settings: &Settings,
  command: Command,
  out: Output,
) -> anyhow::Result<ExitCode> {
  match command {
    Command::Add(args) => {
      let input = NewComponent {
        name:     args.name,
        quantity: args.quantity,
        location: args.location,
        category: args.category,
        value:    args.value,
      };
      let component = store
        .add_component(input)
        .await
        .context("failed to add component")?;
      out.emit(&component, || output::added(&component))?;
    }

    Command::Remove { target } => {
      let removed: Vec<_> = match target.id {
        Some(id) => store
          .remove_by_id(ComponentId(id))
          .await?
          .into_iter()
          .collect(),
        None => store.remove_by_name(target.name_or_empty()).await?,
      };
      out.emit(&removed, || output::removed(&target.label(), &removed))?;
    }

    Command::Update { target, quantity } => {
      let changes: Vec<_> = match target.id {
        Some(id) => store
          .update_quantity_by_id(ComponentId(id), quantity)
          .await?
          .into_iter()
          .collect(),
        None => {
          store
            .update_quantity_by_name(target.name_or_empty(), quantity)
            .await?
        }
      };
      out.emit(&changes, || output::updated(&target.label(), &changes))?;
    }

    Command::List => {
      let all = store.list_components().await?;
      out.emit(&all, || output::components(&all))?;
    }

    Command::History { id } => {
      let entries = store.history(ComponentId(id)).await?;
      out.emit(&entries, || output::history(&entries))?;
    }

    Command::Search { keyword, field, with_id } => {
      let plan = match (field, with_id) {
        (Some(field), _) => SearchPlan::only(field),
        (None, true) => SearchPlan::fallback_with_id(),
        (None, false) => SearchPlan::fallback(),
      };
      let outcome = search::resolve(store, &keyword, &plan).await?;
      out.emit(&outcome, || output::search(&keyword, &outcome))?;
    }

    Command::Import { path } => {
      let path = path.unwrap_or_else(|| settings.import_path.clone());
      let status = import_file(store, &path)
        .await
        .with_context(|| format!("import from {path:?} failed"))?;
      out.emit(&output::import_json(&status), || output::import(&status))?;
    }

    Command::Audit { id } => {
      let report = history::audit(store, ComponentId(id)).await?;
      out.emit(&report, || output::audit(&report))?;
      if !report.is_consistent() {
        return Ok(ExitCode::FAILURE);
      }
    }
  }

  Ok(ExitCode::SUCCESS)
}

impl Target {
  fn name_or_empty(&self) -> String { self.name.clone().unwrap_or_default() }

  fn label(&self) -> String {
    match (&self.name, self.id) {
      (_, Some(id)) => format!("#{id}"),
      (Some(name), None) => format!("`{name}`"),
      (None, None) => String::new(),
    }
  }
}
