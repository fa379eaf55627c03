//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use quarry_domain::ScoredChunk;
use quarry_extractor::AnalysisReport;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format an analysis report.
    pub fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_report_json(report),
            OutputFormat::Table => Ok(self.format_report_table(report)),
            OutputFormat::Csv => Ok(format_report_csv(report)),
        }
    }

    fn format_report_json(&self, report: &AnalysisReport) -> Result<String> {
        let json_rows: Vec<serde_json::Value> = report
            .rows
            .iter()
            .map(|row| {
                let mut object = serde_json::Map::new();
                object.insert("entity".to_string(), row.entity.clone().into());
                for (field, value) in row.record.iter() {
                    object.insert(field.to_string(), value.into());
                }
                serde_json::Value::Object(object)
            })
            .collect();

        Ok(serde_json::to_string_pretty(&json_rows)?)
    }

    fn format_report_table(&self, report: &AnalysisReport) -> String {
        if report.is_empty() {
            return self.colorize("No results.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(report.header());
        for row in &report.rows {
            let mut cells = vec![row.entity.clone()];
            cells.extend(row.record.values().map(str::to_string));
            builder.push_record(cells);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format raw search results.
    pub fn format_search(&self, results: &[ScoredChunk]) -> Result<String> {
        if results.is_empty() {
            return Ok(self.colorize("No matching chunks.", "yellow"));
        }

        match self.format {
            OutputFormat::Json => {
                let json_rows: Vec<serde_json::Value> = results
                    .iter()
                    .map(|r| {
                        serde_json::json!({
                            "score": r.score,
                            "entity": r.chunk.metadata.entity,
                            "source": r.chunk.metadata.source,
                            "text": r.chunk.text,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json_rows)?)
            }
            _ => {
                let mut builder = Builder::default();
                builder.push_record(["Score", "Entity", "Source", "Text"]);
                for result in results {
                    builder.push_record([
                        format!("{:.3}", result.score),
                        result.chunk.metadata.entity.clone(),
                        result.chunk.metadata.source.clone(),
                        truncate(&result.chunk.text, 60),
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Render a report as CSV with RFC-4180-style quoting.
pub fn format_report_csv(report: &AnalysisReport) -> String {
    let mut out = String::new();

    let header: Vec<String> = report.header().iter().map(|h| escape_csv(h)).collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for row in &report.rows {
        let mut cells = vec![escape_csv(&row.entity)];
        cells.extend(row.record.values().map(escape_csv));
        out.push_str(&cells.join(","));
        out.push('\n');
    }

    out
}

fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}
