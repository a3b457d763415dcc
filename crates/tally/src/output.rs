//! Rendering list pages as text tables or structured data.
//!
//! Text output is an aligned table of the entity's columns followed by a
//! pagination footer and any notifications. JSON and YAML serialize the
//! query result itself; CSV writes one row per record using the entity's
//! columns.

use clap::ValueEnum;
use console::{measure_text_width, pad_str, Alignment, Style};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tally_query::{AliasTable, QueryResult};
use tally_store::{EntityKind, Notification};
use thiserror::Error;

/// Errors that can occur while rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(String),
}

/// How a page is written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned table with a pagination footer
    #[default]
    Text,
    /// The query result as JSON
    Json,
    /// The query result as YAML
    Yaml,
    /// One CSV row per record
    Csv,
}

impl OutputFormat {
    /// Returns true for the machine-readable formats.
    pub fn is_structured(&self) -> bool {
        !matches!(self, OutputFormat::Text)
    }
}

/// Renders one page of `entity` records.
///
/// `styled` turns on bold table headers. Notifications are only included in
/// text output; callers print them separately for structured formats.
pub fn render_page(
    entity: EntityKind,
    aliases: &AliasTable,
    result: &QueryResult<'_, Value>,
    notifications: &[Notification],
    format: OutputFormat,
    styled: bool,
) -> Result<String, RenderError> {
    match format {
        OutputFormat::Text => Ok(render_text(entity, aliases, result, notifications, styled)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)? + "\n"),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(result)?),
        OutputFormat::Csv => render_csv(entity, aliases, result),
    }
}

fn render_text(
    entity: EntityKind,
    aliases: &AliasTable,
    result: &QueryResult<'_, Value>,
    notifications: &[Notification],
    styled: bool,
) -> String {
    let mut out = String::new();

    if result.total_matched == 0 {
        out.push_str(&format!("No {} found.\n", entity.plural()));
    } else {
        let header: Vec<String> = entity.columns().iter().map(|c| c.to_string()).collect();
        let rows: Vec<Vec<String>> = result
            .items
            .iter()
            .map(|item| row_cells(entity, aliases, item))
            .collect();
        out.push_str(&table(&header, &rows, styled));
        out.push_str(&format!(
            "page {} of {} ({} matched)\n",
            result.page_index + 1,
            result.page_count,
            result.total_matched
        ));
    }

    for notification in notifications {
        out.push_str(&format!("{notification}\n"));
    }
    out
}

fn render_csv(
    entity: EntityKind,
    aliases: &AliasTable,
    result: &QueryResult<'_, Value>,
) -> Result<String, RenderError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(entity.columns())
        .map_err(|e| RenderError::Csv(e.to_string()))?;
    for item in &result.items {
        wtr.write_record(row_cells(entity, aliases, item))
            .map_err(|e| RenderError::Csv(e.to_string()))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| RenderError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| RenderError::Csv(e.to_string()))
}

/// Cell text for each column, resolved through the alias table.
fn row_cells(entity: EntityKind, aliases: &AliasTable, item: &Value) -> Vec<String> {
    entity
        .columns()
        .iter()
        .map(|column| aliases.resolve(item, column).to_text().into_owned())
        .collect()
}

fn table(header: &[String], rows: &[Vec<String>], styled: bool) -> String {
    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(i, title)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| measure_text_width(cell))
                .chain(std::iter::once(measure_text_width(title)))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header_style = Style::new().bold();
    let mut out = String::new();

    let titles: Vec<String> = header
        .iter()
        .zip(&widths)
        .map(|(title, width)| {
            let padded = pad_str(title, *width, Alignment::Left, None);
            if styled {
                header_style.apply_to(padded).force_styling(true).to_string()
            } else {
                padded.into_owned()
            }
        })
        .collect();
    out.push_str(titles.join("  ").trim_end());
    out.push('\n');

    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad_str(cell, *width, Alignment::Left, None).into_owned())
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// Renders the entity catalog as a text table.
pub fn render_entities(styled: bool) -> String {
    let header: Vec<String> = ["entity", "path", "status", "statuses", "date", "default sort"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows: Vec<Vec<String>> = EntityKind::ALL
        .iter()
        .map(|entity| {
            let statuses = if entity.status_field().is_none() {
                "-".to_string()
            } else if entity.statuses().is_empty() {
                "(any)".to_string()
            } else {
                entity.statuses().join(", ")
            };
            let sort = entity
                .default_sort()
                .keys()
                .iter()
                .map(|key| key.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            vec![
                entity.name().to_string(),
                entity.api_path().to_string(),
                entity.status_field().unwrap_or("-").to_string(),
                statuses,
                entity.range_field().to_string(),
                sort,
            ]
        })
        .collect();
    table(&header, &rows, styled)
}
