//! CSV extractor.

use async_trait::async_trait;
use docrag_core::{DocumentFormat, ExtractError, TextExtractor};
use std::path::Path;
use tokio::fs;

/// Extractor for CSV files.
///
/// Every row is rendered as its cells joined with `", "`, rows joined by
/// newlines. The reader runs in flexible mode so ragged rows (a common
/// artifact of hand-edited files) still extract.
pub struct CsvExtractor;

impl CsvExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextExtractor for CsvExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Csv
    }

    async fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let bytes = fs::read(path).await?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes.as_slice());

        let mut lines = Vec::new();
        for record in reader.records() {
            let record =
                record.map_err(|e| ExtractError::Corrupt(format!("csv parse: {e}")))?;
            let row: Vec<&str> = record.iter().map(str::trim).collect();
            lines.push(row.join(", "));
        }

        Ok(lines.join("\n"))
    }
}
