//! Rendering of aggregation results. Knows nothing about commits.

use crate::hotspot::HotspotReport;
use crate::model::{
    ExtensionOutput, ExtensionStats, FileStat, HotspotOutput, MonthBucket, TrendOutput,
    SCHEMA_VERSION,
};
use anyhow::Result;
use chrono::Utc;
use console::style;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Table,
    Json,
    Ndjson,
    Csv,
}

impl Format {
    pub fn is_machine_readable(self) -> bool {
        self != Format::Table
    }
}

/// Run parameters echoed into JSON envelopes.
#[derive(Debug, Clone, Default)]
pub struct ReportMeta {
    pub repository_path: String,
    pub since: Option<String>,
    pub until: Option<String>,
    pub extension: Option<String>,
    pub keywords: Vec<String>,
}

pub fn write_hotspots(
    out: &mut dyn Write,
    format: Format,
    meta: &ReportMeta,
    report: &HotspotReport,
    styled: bool,
) -> Result<()> {
    match format {
        Format::Json => {
            let output = HotspotOutput {
                version: SCHEMA_VERSION,
                generated_at: Utc::now(),
                repository_path: meta.repository_path.clone(),
                since: meta.since.clone(),
                until: meta.until.clone(),
                extension: meta.extension.clone(),
                keywords: meta.keywords.clone(),
                total_files: report.total_files,
                entries: report.entries.clone(),
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
        }
        Format::Ndjson => write_ndjson(out, &report.entries)?,
        Format::Csv => {
            writeln!(out, "path,modifications,bugfixes")?;
            for e in &report.entries {
                writeln!(out, "{},{},{}", csv_field(&e.path), e.modifications, e.bugfixes)?;
            }
        }
        Format::Table => hotspot_table(out, &report.entries, report.total_files, styled)?,
    }
    Ok(())
}

pub fn write_trend(
    out: &mut dyn Write,
    format: Format,
    meta: &ReportMeta,
    buckets: &[MonthBucket],
    styled: bool,
) -> Result<()> {
    match format {
        Format::Json => {
            let output = TrendOutput {
                version: SCHEMA_VERSION,
                generated_at: Utc::now(),
                repository_path: meta.repository_path.clone(),
                since: meta.since.clone(),
                until: meta.until.clone(),
                buckets: buckets.to_vec(),
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
        }
        Format::Ndjson => write_ndjson(out, buckets)?,
        Format::Csv => {
            writeln!(out, "month,events,bugfix_events")?;
            for b in buckets {
                writeln!(out, "{},{},{}", b.month, b.events, b.bugfix_events)?;
            }
        }
        Format::Table => trend_chart(out, buckets, styled)?,
    }
    Ok(())
}

pub fn write_extensions(
    out: &mut dyn Write,
    format: Format,
    meta: &ReportMeta,
    extensions: &[ExtensionStats],
    styled: bool,
) -> Result<()> {
    match format {
        Format::Json => {
            let output = ExtensionOutput {
                version: SCHEMA_VERSION,
                generated_at: Utc::now(),
                repository_path: meta.repository_path.clone(),
                since: meta.since.clone(),
                until: meta.until.clone(),
                extensions: extensions.to_vec(),
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
        }
        Format::Ndjson => write_ndjson(out, extensions)?,
        Format::Csv => {
            writeln!(out, "extension,files,modifications,bugfixes")?;
            for e in extensions {
                writeln!(
                    out,
                    "{},{},{},{}",
                    csv_field(&e.extension),
                    e.files,
                    e.modifications,
                    e.bugfixes
                )?;
            }
        }
        Format::Table => extension_table(out, extensions, styled)?,
    }
    Ok(())
}

fn write_ndjson<T: serde::Serialize>(out: &mut dyn Write, rows: &[T]) -> Result<()> {
    for row in rows {
        writeln!(out, "{}", serde_json::to_string(row)?)?;
    }
    Ok(())
}

fn hotspot_table(out: &mut dyn Write, entries: &[FileStat], total: usize, styled: bool) -> Result<()> {
    writeln!(
        out,
        "{:<4} {:<60} {:>8} {:>8} {:>7}",
        style("#").bold().force_styling(styled),
        style("Path").bold().force_styling(styled),
        style("Changes").bold().force_styling(styled),
        style("Bugfixes").bold().force_styling(styled),
        style("Ratio").bold().force_styling(styled),
    )?;
    writeln!(out, "{}", "─".repeat(90))?;
    for (rank, e) in entries.iter().enumerate() {
        let ratio = e.bugfixes as f64 / e.modifications.max(1) as f64 * 100.0;
        let ratio = format!("{ratio:.0}%");
        let ratio = if e.bugfixes > 0 {
            style(ratio).red().force_styling(styled)
        } else {
            style(ratio).dim().force_styling(styled)
        };
        writeln!(
            out,
            "{:<4} {:<60} {:>8} {:>8} {:>7}",
            rank + 1,
            e.path,
            e.modifications,
            e.bugfixes,
            ratio
        )?;
    }
    if total > entries.len() {
        writeln!(out, "\n... and {} more files", total - entries.len())?;
    }
    Ok(())
}

fn trend_chart(out: &mut dyn Write, buckets: &[MonthBucket], styled: bool) -> Result<()> {
    let max_events = buckets.iter().map(|b| b.events).max().unwrap_or(1).max(1);

    writeln!(out, "{}", style("Monthly Change Activity").bold().force_styling(styled))?;
    writeln!(out, "{}", "─".repeat(60))?;

    for bucket in buckets {
        let width = ((bucket.events as f64 / max_events as f64) * 30.0).ceil() as usize;
        let fix_width = ((bucket.bugfix_events as f64 / max_events as f64) * 30.0).ceil() as usize;
        let bar = format!(
            "{}{}",
            style("█".repeat(fix_width)).red().force_styling(styled),
            style("█".repeat(width.saturating_sub(fix_width))).green().force_styling(styled),
        );
        writeln!(
            out,
            "{} {:<30} changes: {:>5}, bugfixes: {:>5}",
            bucket.month,
            bar,
            bucket.events,
            bucket.bugfix_events
        )?;
    }

    writeln!(out, "\n{}", style("Legend").bold().force_styling(styled))?;
    writeln!(out, "  {} bugfix changes", style("█").red().force_styling(styled))?;
    writeln!(out, "  {} other changes", style("█").green().force_styling(styled))?;
    Ok(())
}

fn extension_table(out: &mut dyn Write, extensions: &[ExtensionStats], styled: bool) -> Result<()> {
    writeln!(
        out,
        "{:<16} {:>8} {:>8} {:>8}",
        style("Extension").bold().force_styling(styled),
        style("Files").bold().force_styling(styled),
        style("Changes").bold().force_styling(styled),
        style("Bugfixes").bold().force_styling(styled),
    )?;
    writeln!(out, "{}", "─".repeat(44))?;
    for e in extensions {
        writeln!(
            out,
            "{:<16} {:>8} {:>8} {:>8}",
            e.extension, e.files, e.modifications, e.bugfixes
        )?;
    }
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
