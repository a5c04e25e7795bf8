//! CSV and JSON export of workbooks.
//!
//! A workbook exported as CSV becomes a directory with one file per sheet; as
//! JSON it is a single document holding every sheet, with formulas and their
//! cached values side by side.

use crate::workbook::{Sheet, Workbook};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Output that is not valid UTF-8.
    #[error("Invalid UTF-8 output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Sheet {
    /// Rows padded to the sheet width, rendered as CSV fields.
    fn csv_records(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        let width = self.width();
        self.rows().iter().map(move |row| {
            let mut record: Vec<String> = row.iter().map(|c| c.to_csv_field()).collect();
            record.resize(width, String::new());
            record
        })
    }

    /// File name used when the sheet is exported to a CSV directory.
    pub fn file_stem(&self) -> String {
        self.name()
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl Exporter for Sheet {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for record in self.csv_records() {
                    wtr.write_record(&record)?;
                }
                let data = String::from_utf8(wtr.into_inner().map_err(|e| e.into_error())?)?;
                Ok(data)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for Workbook {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut output = String::new();
                for sheet in self.sheets() {
                    // Each sheet is introduced by a comment line
                    output.push_str(&format!("# Sheet: {}\n", sheet.name()));
                    output.push_str(&sheet.export_to_string(ExportFormat::Csv)?);
                    output.push('\n');
                }
                Ok(output)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    /// CSV goes to a directory at `path` with one file per sheet; JSON goes to
    /// the file at `path`.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        match format {
            ExportFormat::Csv => {
                fs::create_dir_all(path)?;
                for sheet in self.sheets() {
                    let file = sheet_path(path, sheet);
                    sheet.export_to_file(&file, format)?;
                    info!(path = %file.display(), "wrote sheet");
                }
            }
            ExportFormat::Json | ExportFormat::PrettyJson => {
                let content = self.export_to_string(format)?;
                let mut file = File::create(path)?;
                file.write_all(content.as_bytes())?;
                info!(path = %path.display(), sheets = self.len(), "wrote workbook");
            }
        }
        Ok(())
    }
}

/// Path of one sheet's CSV file inside an export directory.
pub fn sheet_path(dir: &Path, sheet: &Sheet) -> PathBuf {
    dir.join(format!(
        "{}.{}",
        sheet.file_stem(),
        ExportFormat::Csv.extension()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::Cell;

    fn sheet() -> Sheet {
        let mut sheet = Sheet::new("Income Statement");
        sheet.set_row(0, 0, ["Item", "TTM"]);
        sheet.set(1, 0, "Total Revenue");
        sheet.set(1, 1, 1000.0);
        sheet.set(2, 0, "Margin");
        sheet.set(2, 2, Cell::formula("=B2*0.2", Some(200.0)));
        sheet
    }

    #[test]
    fn test_sheet_csv_is_rectangular() {
        let csv = sheet().export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Item,TTM,");
        assert_eq!(lines[1], "Total Revenue,1000,");
        assert_eq!(lines[2], "Margin,,=B2*0.2");
    }

    #[test]
    fn test_sheet_json_keeps_formula_value() {
        let json = sheet().export_to_string(ExportFormat::Json).unwrap();
        assert!(json.contains("\"name\":\"Income Statement\""));
        assert!(json.contains("\"formula\":\"=B2*0.2\""));
        assert!(json.contains("\"value\":200.0"));
        assert!(json.contains("{\"type\":\"empty\"}"));
    }

    #[test]
    fn test_workbook_csv_string_lists_sheets() {
        let mut book = Workbook::new();
        book.add_sheet(sheet());
        book.add_sheet(Sheet::new("DCF"));
        let csv = book.export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.contains("# Sheet: Income Statement"));
        assert!(csv.contains("# Sheet: DCF"));
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!(
            "pretty-json".parse::<ExportFormat>().unwrap(),
            ExportFormat::PrettyJson
        );
        assert!(matches!(
            "xlsx".parse::<ExportFormat>(),
            Err(ExportError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(sheet().file_stem(), "income-statement");
        assert_eq!(Sheet::new("Peer Summaries").file_stem(), "peer-summaries");
    }
}
