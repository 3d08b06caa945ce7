pub mod cli;
pub mod config;
pub mod display;
pub mod export;
pub mod filter;
pub mod logging;
pub mod parser;
pub mod selection;
pub mod store;

use crate::config::HarpicConfig;
use crate::display::{StoreSummary, display_entries, display_summary, entries_json};
use crate::export::{DirectoryTarget, ExportOutcome, export_selection};
use anyhow::{Context, Result, bail};
pub use cli::{ColorMode, Commands, OutputFormat, cli_parse};
pub use export::{DuplicateStrategy, ExportError, ExportOptions, PathDeriver, plan_export};
pub use filter::{Criteria, filter_entries, from_query_string, share_link, to_query_string};
pub use parser::{Entry, EntryId, ParseError, parse_har_bytes, parse_har_file};
pub use selection::Selection;
pub use store::EntryStore;
use std::path::PathBuf;

fn apply_color_mode(mode: ColorMode) {
    match mode {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }
}

fn load_store(files: &[PathBuf]) -> Result<EntryStore> {
    let mut store = EntryStore::new();
    store
        .ingest_paths(files)
        .context("Failed to load HAR files")?;
    Ok(store)
}

fn build_selection(
    store: &EntryStore,
    view: &[&Entry],
    export: &cli::ExportArgs,
) -> Result<Selection> {
    if export.all {
        let mut selection = Selection::new();
        selection.select_all(store);
        return Ok(selection);
    }
    if export.id.is_empty() {
        return Ok(view.iter().map(|entry| entry.id.clone()).collect());
    }

    let selection: Selection = export.id.iter().map(|id| EntryId::from(id.as_str())).collect();
    for id in &export.id {
        if store.get(&EntryId::from(id.as_str())).is_none() {
            bail!("Unknown entry id '{id}'");
        }
    }
    Ok(selection)
}

fn export_options(config: &HarpicConfig, export: &cli::ExportArgs) -> ExportOptions {
    let mut options = config.export_options();
    if export.hierarchy {
        options.preserve_hierarchy = true;
    }
    if let Some(strategy) = export.strategy {
        options.strategy = strategy.into();
    }
    if let Some(padding) = export.padding {
        options.padding = padding;
    }
    options
}

pub fn run() -> Result<()> {
    let cli = cli_parse();
    logging::init_logging(cli.verbose, cli.quiet);
    apply_color_mode(cli.color);

    let config = crate::config::load_config(cli.config.as_deref())
        .context("Failed to load config")?;
    tracing::debug!(profile = %config.profile_name, "using config profile");
    let defaults = &config.filter.default_statuses;

    match &cli.command {
        Commands::List {
            files,
            filter,
            limit,
        } => {
            let store = load_store(files)?;
            let criteria = filter
                .to_criteria(&store.available_statuses(defaults))
                .context("Invalid filter")?;
            let view = filter_entries(&store, &criteria);

            match cli.format {
                OutputFormat::Text => {
                    display_entries(&view, store.first_entry_time(), store.len(), *limit);
                    if !criteria.is_empty() {
                        println!("Filter: {}", to_query_string(&criteria));
                    }
                }
                OutputFormat::Json => {
                    println!("{}", entries_json(&view, store.first_entry_time(), *limit));
                }
            }
        }
        Commands::Info { files } => {
            let store = load_store(files)?;
            let summary = StoreSummary::from_store(&store);
            match cli.format {
                OutputFormat::Text => display_summary(&summary),
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&summary)
                        .context("Failed to serialize summary")?
                ),
            }
        }
        Commands::Query { filter, base } => {
            let criteria = filter.to_criteria(defaults).context("Invalid filter")?;
            match base {
                Some(base) => println!("{}", share_link(base, &criteria)),
                None => println!("{}", to_query_string(&criteria)),
            }
        }
        Commands::Export {
            files,
            filter,
            export,
        } => {
            let store = load_store(files)?;
            let criteria = filter
                .to_criteria(&store.available_statuses(defaults))
                .context("Invalid filter")?;
            let view = filter_entries(&store, &criteria);
            let selection = build_selection(&store, &view, export)?;

            let options = export_options(&config, export);
            let mut target = DirectoryTarget::new(&export.output);
            let outcome = export_selection(
                &store,
                &selection,
                &options,
                &config.path_deriver(),
                &config.packager(),
                &mut target,
                chrono::Local::now(),
            )
            .context("Export failed")?;

            match outcome {
                ExportOutcome::Empty => println!("Nothing selected; no files written."),
                ExportOutcome::Single(path) => println!("Saved {}", path.display()),
                ExportOutcome::Archive { path, members } => {
                    println!("Saved {} ({members} files)", path.display())
                }
            }
        }
    }

    Ok(())
}
