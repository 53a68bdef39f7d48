//! Serializes the rendered result (or the raw query) to downloadable files.
//!
//! Exports are fire-and-forget: a timestamped file is written to the export
//! directory and the returned message names it. CSV quotes every field and
//! serializes the rendered cell text, not the raw engine values, so what lands
//! in the file is exactly what the table showed.

use crate::data::result_set::ResultSet;
use anyhow::{anyhow, Result};
use chrono::Local;
use csv::{QuoteStyle, WriterBuilder};
use serde_json::Value;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Handles exporting the current result and query text
pub struct Exporter;

impl Exporter {
    fn timestamped(dir: &Path, stem: &str, extension: &str) -> PathBuf {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        dir.join(format!("{}_{}.{}", stem, timestamp, extension))
    }

    /// Export the rendered result to CSV, quoting every field
    pub fn export_csv(result: &ResultSet, dir: &Path, stem: &str) -> Result<String> {
        if result.row_count() == 0 {
            return Err(anyhow!("No data to export"));
        }

        let filename = Self::timestamped(dir, stem, "csv");
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_path(&filename)?;

        writer.write_record(&result.columns)?;
        for row in result.to_text_rows() {
            writer.write_record(&row)?;
        }
        writer.flush()?;

        Ok(format!(
            "✓ Exported {} rows to CSV file: {}",
            result.row_count(),
            filename.display()
        ))
    }

    /// Export the rendered result as a JSON array of objects keyed by column
    pub fn export_json(result: &ResultSet, dir: &Path, stem: &str) -> Result<String> {
        if result.row_count() == 0 {
            return Err(anyhow!("No data to export"));
        }

        let mut json_array = Vec::with_capacity(result.row_count());
        for row in result.to_text_rows() {
            let mut obj = serde_json::Map::new();
            for (i, column) in result.columns.iter().enumerate() {
                if let Some(value) = row.get(i) {
                    obj.insert(column.clone(), Value::String(value.clone()));
                }
            }
            json_array.push(Value::Object(obj));
        }

        let filename = Self::timestamped(dir, stem, "json");
        let file = File::create(&filename)?;
        serde_json::to_writer_pretty(file, &json_array)?;

        Ok(format!(
            "✓ Exported {} rows to JSON file: {}",
            result.row_count(),
            filename.display()
        ))
    }

    /// Export raw query text (not its result) as a plain-text file
    pub fn export_query(query: &str, dir: &Path, stem: &str) -> Result<String> {
        if query.trim().is_empty() {
            return Err(anyhow!("No query to export"));
        }

        let filename = Self::timestamped(dir, stem, "txt");
        std::fs::write(&filename, query)?;

        Ok(format!("✓ Exported query to: {}", filename.display()))
    }
}
