//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tally_query::{SortKey, Timestamp};
use tally_store::EntityKind;

use crate::output::OutputFormat;

/// List, filter, sort and page through exported backend collections.
#[derive(Debug, Parser)]
#[command(name = "tally")]
#[command(version)]
#[command(about = "List, filter, sort and page through exported backend collections")]
pub struct Cli {
    /// Config file to use instead of ./tally.yaml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show one page of an entity's list
    List(ListArgs),
    /// Describe the entities that can be listed
    Entities,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// invoice, project, task, employee or customer
    pub entity: EntityKind,

    /// JSON export to read [default: <data_dir>/<entity>.json]
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Only records with this status ("all" disables the filter)
    #[arg(long)]
    pub status: Option<String>,

    /// Case-insensitive text to look for in the entity's search fields
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Earliest date to include (inclusive)
    #[arg(long, value_name = "DATE")]
    pub from: Option<Timestamp>,

    /// Latest date to include (inclusive)
    #[arg(long, value_name = "DATE")]
    pub to: Option<Timestamp>,

    /// Only records belonging to this project id (invoices, tasks)
    #[arg(long, value_name = "ID")]
    pub project: Option<String>,

    /// Only records belonging to this customer id (invoices)
    #[arg(long, value_name = "ID")]
    pub customer: Option<String>,

    /// Only tasks due before today that are not done
    #[arg(long)]
    pub overdue: bool,

    /// Sort key as FIELD[:asc|desc]; repeat for tie-breakers
    #[arg(long, value_name = "FIELD[:DIR]")]
    pub sort: Vec<SortKey>,

    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub page: u64,

    /// Records per page [default: from config, or 10]
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub page_size: Option<u64>,

    /// Output format [default: from config, or text]
    #[arg(long, short)]
    pub output: Option<OutputFormat>,
}

impl ListArgs {
    /// Zero-based page index.
    pub fn page_index(&self) -> usize {
        usize::try_from(self.page.saturating_sub(1)).unwrap_or(usize::MAX)
    }
}
