//! Tally - list views over exported backend collections.
//!
//! The binary reads a JSON export of one entity (invoices, projects, tasks,
//! employees or customers), applies the status/search/date filters, sorts,
//! and prints a single page. Loading problems are reported as notifications
//! rather than failures, so a broken export still prints an (empty) list.

pub mod cli;
pub mod config;
pub mod output;

use std::io::Write;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tally_query::{Condition, Pipeline, Timestamp};
use tally_store::{CollectionStore, JsonFileSource, RefreshOutcome};
use tracing::{debug, info};

use crate::cli::{Command, ListArgs};
use crate::config::Config;
use crate::output::{render_entities, render_page};

/// Runs one command, writing the listing to `out` and, for structured
/// formats, notifications to `err`.
pub fn run(
    command: Command,
    config: &Config,
    styled: bool,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::List(args) => list(args, config, styled, out, err),
        Command::Entities => {
            out.write_all(render_entities(styled).as_bytes())?;
            Ok(())
        }
    }
}

fn list(
    args: ListArgs,
    config: &Config,
    styled: bool,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<()> {
    let entity = args.entity;
    let path = args
        .file
        .clone()
        .unwrap_or_else(|| config.data_dir().join(format!("{entity}.json")));
    let source: JsonFileSource<Value> = JsonFileSource::new(&path);

    let mut store = CollectionStore::new(entity.plural());
    match store.refresh(&source) {
        RefreshOutcome::Loaded(count) => {
            info!(entity = %entity, path = %path.display(), count, "loaded export")
        }
        outcome => debug!(entity = %entity, ?outcome, "listing without fresh data"),
    }

    let page_size = args
        .page_size
        .and_then(|size| usize::try_from(size).ok())
        .unwrap_or_else(|| config.page_size());
    let mut state = entity.list_state(page_size);

    if let Some(raw) = args.status.as_deref() {
        let value = entity
            .parse_status(raw)
            .with_context(|| format!("cannot filter {} by status", entity.plural()))?;
        match entity.status_field() {
            Some(field) => state.set_status(field, value),
            None if value.is_all() => {}
            None => bail!("{} have no status", entity.plural()),
        }
    }
    if let Some(query) = args.search.as_deref() {
        state.set_search(entity.search_fields().iter().copied(), query);
    }
    if args.from.is_some() || args.to.is_some() {
        state.set_range(entity.range_field(), args.from, args.to);
    }
    if let Some(project) = args.project.as_deref() {
        let Some(field) = entity.project_field() else {
            bail!("{} cannot be listed per project", entity.plural());
        };
        state.require(Condition::equals(field, project));
    }
    if let Some(customer) = args.customer.as_deref() {
        let Some(field) = entity.customer_field() else {
            bail!("{} cannot be listed per customer", entity.plural());
        };
        state.require(Condition::equals(field, customer));
    }
    if args.overdue {
        let Some(conditions) = entity.overdue(Timestamp::today()) else {
            bail!("only tasks have an overdue view");
        };
        for condition in conditions {
            state.require(condition);
        }
    }
    if !args.sort.is_empty() {
        state.set_sort(args.sort.iter().cloned().collect());
    }
    state.set_page(args.page_index());

    let aliases = entity.aliases();
    let pipeline = Pipeline::new(aliases.clone());
    let notifications = store.take_notifications();
    let result = store.query(&pipeline, &state);
    debug!(
        entity = %entity,
        matched = result.total_matched,
        pages = result.page_count,
        page = result.page_index,
        "ran list query"
    );

    let format = args.output.unwrap_or_else(|| config.output());
    let rendered = render_page(entity, &aliases, &result, &notifications, format, styled)
        .context("failed to render output")?;
    out.write_all(rendered.as_bytes())?;

    if format.is_structured() {
        for notification in &notifications {
            writeln!(err, "{notification}")?;
        }
    }
    Ok(())
}

